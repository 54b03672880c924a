//! dynsky: dynamic skyline tracking
//!
//! Points carry a lifetime `[insertion_time, ejection_time)`. A
//! [`domain::DominanceTree`] keeps every live point in a hierarchy where each
//! node is dominated by its parent, so the skyline is always the set of root
//! children. [`domain::EventScheduler`] replays lifetimes tick by tick and
//! yields one [`domain::Snapshot`] per tick.
//!
//! Layers, innermost first:
//! - `domain`: points, dominance tree, cache, scheduler (no I/O)
//! - `application`: record parsing, reporting, the replay service
//! - `infrastructure`: filesystem boundary and service wiring
//! - `cli`: argument parsing, dispatch, terminal output

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
