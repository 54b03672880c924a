//! Snapshot rendering
//!
//! One line per tick: ascending zero-based identifiers separated by single
//! spaces. An empty skyline renders as an empty line.

use std::io::{self, Write};

use itertools::Itertools;

use crate::domain::{Point, Snapshot};

pub fn format_snapshot(snapshot: &Snapshot) -> String {
    snapshot.skyline.iter().map(|id| id.ordinal()).join(" ")
}

/// Stream snapshots to `writer`, one line each. Returns the number of lines.
pub fn write_snapshots<W, I>(writer: &mut W, snapshots: I) -> io::Result<usize>
where
    W: Write + ?Sized,
    I: IntoIterator<Item = Snapshot>,
{
    let mut written = 0;
    for snapshot in snapshots {
        writeln!(writer, "{}", format_snapshot(&snapshot))?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}

/// Coordinates of a point, space separated.
pub fn format_coords(point: &Point) -> String {
    point.coords().iter().join(" ")
}
