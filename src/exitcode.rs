//! Process exit codes, values from BSD `sysexits.h`.
//!
//! Success exits with 0 through the normal return from `main`.

/// Bad flags or arguments
pub const USAGE: i32 = 64;

/// Malformed record, wrong arity or invalid schedule in an input file
pub const DATAERR: i32 = 65;

/// Input file missing or unreadable
pub const NOINPUT: i32 = 66;

/// Anything not covered below
pub const SOFTWARE: i32 = 70;

/// Snapshot output file could not be created
pub const CANTCREAT: i32 = 73;

/// Writing snapshots or terminal output failed
pub const IOERR: i32 = 74;

/// Invalid settings file or `DYNSKY_*` variable
pub const CONFIG: i32 = 78;
