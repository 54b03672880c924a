//! Coordinate and lifetime record parsing
//!
//! Both inputs are line oriented. Blank lines are skipped, every other line
//! is one record, and record `i` of the coordinate input pairs with record
//! `i` of the lifetime input. Point identifiers are assigned from 1 in
//! coordinate record order.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, warn};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{DomainError, EventScheduler, Point, PointId};

/// How to treat a record that fails to parse or validate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordPolicy {
    /// Abort on the first bad record.
    #[default]
    Strict,
    /// Log and skip bad records, keeping positional pairing intact.
    Lenient,
}

impl RecordPolicy {
    pub fn from_lenient(lenient: bool) -> Self {
        if lenient {
            RecordPolicy::Lenient
        } else {
            RecordPolicy::Strict
        }
    }

    /// Either propagate `err` or log it and yield None.
    fn handle<T>(self, err: ApplicationError) -> ApplicationResult<Option<T>> {
        match self {
            RecordPolicy::Strict => Err(err),
            RecordPolicy::Lenient => {
                warn!("skipping record: {}", err);
                Ok(None)
            }
        }
    }
}

/// One non-blank coordinate line.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateRecord {
    pub line: usize,
    /// None when the record was skipped
    pub point: Option<Point>,
}

/// One non-blank lifetime line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifetimeRecord {
    pub line: usize,
    /// `(insertion_time, ejection_time)`, None when the record was skipped
    pub span: Option<(i64, i64)>,
}

/// Counters describing one load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub records: usize,
    pub scheduled: usize,
    pub skipped: usize,
    pub unscheduled: usize,
}

/// A validated schedule ready to replay.
#[derive(Debug)]
pub struct Dataset {
    pub dimension: usize,
    pub scheduler: EventScheduler,
    pub stats: LoadStats,
}

/// Non-blank lines with their 1-based physical line numbers.
fn records(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

fn parse_token<T: FromStr>(token: &str, path: &Path, line: usize) -> ApplicationResult<T> {
    token.parse().map_err(|_| ApplicationError::MalformedRecord {
        path: path.to_path_buf(),
        line,
        reason: format!("invalid number '{}'", token),
    })
}

fn parse_coords(text: &str, path: &Path, line: usize) -> ApplicationResult<Vec<f64>> {
    text.split_whitespace()
        .map(|token| {
            let value: f64 = parse_token(token, path, line)?;
            if value.is_finite() {
                Ok(value)
            } else {
                Err(ApplicationError::MalformedRecord {
                    path: path.to_path_buf(),
                    line,
                    reason: format!("non-finite value '{}'", token),
                })
            }
        })
        .collect()
}

fn make_point(
    id: PointId,
    coords: Vec<f64>,
    dimension: usize,
    path: &Path,
    line: usize,
) -> ApplicationResult<Point> {
    Point::new(id, coords, dimension).map_err(|e| match e {
        DomainError::DimensionMismatch { expected, found } => ApplicationError::DimensionMismatch {
            path: path.to_path_buf(),
            line,
            expected,
            found,
        },
        other => ApplicationError::Domain(other),
    })
}

/// Parse coordinate records of exactly `dimension` values each.
pub fn parse_coordinates(
    content: &str,
    path: &Path,
    dimension: usize,
    policy: RecordPolicy,
) -> ApplicationResult<Vec<CoordinateRecord>> {
    if dimension == 0 {
        return Err(DomainError::InvalidDimension(dimension).into());
    }

    let mut out = Vec::new();
    for (index, (line, text)) in records(content).enumerate() {
        let id = PointId(index as u64 + 1);
        let parsed = parse_coords(text, path, line)
            .and_then(|coords| make_point(id, coords, dimension, path, line));
        let point = match parsed {
            Ok(point) => Some(point),
            Err(e) => policy.handle(e)?,
        };
        out.push(CoordinateRecord { line, point });
    }
    debug!(path = %path.display(), records = out.len(), "parsed coordinates");
    Ok(out)
}

fn parse_span(text: &str, path: &Path, line: usize) -> ApplicationResult<(i64, i64)> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let [insert, eject] = tokens.as_slice() else {
        return Err(ApplicationError::MalformedRecord {
            path: path.to_path_buf(),
            line,
            reason: format!("expected 'insertion_time ejection_time', found {} values", tokens.len()),
        });
    };
    let insert: i64 = parse_token(insert, path, line)?;
    let eject: i64 = parse_token(eject, path, line)?;
    if insert >= eject {
        return Err(ApplicationError::InvalidSchedule {
            path: path.to_path_buf(),
            line,
            reason: format!("insertion time {} is not before ejection time {}", insert, eject),
        });
    }
    Ok((insert, eject))
}

/// Parse `insertion_time ejection_time` records.
pub fn parse_lifetimes(
    content: &str,
    path: &Path,
    policy: RecordPolicy,
) -> ApplicationResult<Vec<LifetimeRecord>> {
    let mut out = Vec::new();
    for (line, text) in records(content) {
        let span = match parse_span(text, path, line) {
            Ok(span) => Some(span),
            Err(e) => policy.handle(e)?,
        };
        out.push(LifetimeRecord { line, span });
    }
    debug!(path = %path.display(), records = out.len(), "parsed lifetimes");
    Ok(out)
}

/// Pair coordinate and lifetime records positionally into a schedule.
///
/// More lifetimes than coordinates is an invalid schedule; fewer leaves
/// the trailing points unscheduled.
pub fn assemble(
    dimension: usize,
    coordinates: Vec<CoordinateRecord>,
    lifetimes: Vec<LifetimeRecord>,
    lifetimes_path: &Path,
    policy: RecordPolicy,
) -> ApplicationResult<Dataset> {
    let mut stats = LoadStats {
        records: coordinates.len(),
        ..LoadStats::default()
    };

    if let Some(extra) = lifetimes.get(coordinates.len()) {
        let err = ApplicationError::InvalidSchedule {
            path: lifetimes_path.to_path_buf(),
            line: extra.line,
            reason: format!(
                "{} lifetime records for {} coordinate records",
                lifetimes.len(),
                coordinates.len()
            ),
        };
        policy.handle::<()>(err)?;
    }

    let mut scheduler = EventScheduler::with_dimension(dimension)?;
    for (coordinate, lifetime) in coordinates.into_iter().zip(lifetimes.iter()) {
        let (Some(point), Some((insert, eject))) = (coordinate.point, lifetime.span) else {
            stats.skipped += 1;
            continue;
        };
        scheduler
            .ingest(point, insert, eject)
            .map_err(|e| ApplicationError::InvalidSchedule {
                path: lifetimes_path.to_path_buf(),
                line: lifetime.line,
                reason: e.to_string(),
            })?;
        stats.scheduled += 1;
    }

    stats.unscheduled = stats.records.saturating_sub(lifetimes.len());
    if stats.unscheduled > 0 {
        warn!(
            count = stats.unscheduled,
            "points without a lifetime record are never scheduled"
        );
    }

    Ok(Dataset {
        dimension,
        scheduler,
        stats,
    })
}

/// Parse both inputs and build the schedule.
pub fn load_dataset(
    coordinates: (&str, &Path),
    lifetimes: (&str, &Path),
    dimension: usize,
    policy: RecordPolicy,
) -> ApplicationResult<Dataset> {
    let (coords_content, coords_path) = coordinates;
    let (times_content, times_path) = lifetimes;
    let points = parse_coordinates(coords_content, coords_path, dimension, policy)?;
    let spans = parse_lifetimes(times_content, times_path, policy)?;
    assemble(dimension, points, spans, times_path, policy)
}

/// Parse a standalone point file for the insertion-only frontier.
///
/// Without an explicit dimension the arity of the first record is used.
pub fn parse_points(
    content: &str,
    path: &Path,
    dimension: Option<usize>,
    policy: RecordPolicy,
) -> ApplicationResult<(usize, Vec<Point>)> {
    let dimension = match dimension {
        Some(d) => d,
        None => match records(content).next() {
            Some((_, first)) => first.split_whitespace().count(),
            None => return Ok((0, Vec::new())),
        },
    };
    let points = parse_coordinates(content, path, dimension, policy)?
        .into_iter()
        .filter_map(|record| record.point)
        .collect();
    Ok((dimension, points))
}

/// Label used for in-memory inputs in error messages.
pub fn inline_path(label: &str) -> PathBuf {
    PathBuf::from(format!("<{}>", label))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> PathBuf {
        inline_path("test")
    }

    #[test]
    fn test_blank_lines_are_skipped_but_counted() {
        let records = parse_coordinates("1 2\n\n3 4\n", &path(), 2, RecordPolicy::Strict).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].line, 3);
        assert_eq!(records[1].point.as_ref().unwrap().id(), PointId(2));
    }

    #[test]
    fn test_bad_token_reports_line() {
        let err = parse_coordinates("1 2\n3 x\n", &path(), 2, RecordPolicy::Strict).unwrap_err();
        assert!(matches!(err, ApplicationError::MalformedRecord { line: 2, .. }));
    }

    #[test]
    fn test_lenient_keeps_slot_of_skipped_record() {
        let records = parse_coordinates("1 2\n3\n5 6\n", &path(), 2, RecordPolicy::Lenient).unwrap();

        assert_eq!(records.len(), 3);
        assert!(records[1].point.is_none());
        assert_eq!(records[2].point.as_ref().unwrap().id(), PointId(3));
    }

    #[test]
    fn test_lifetime_needs_two_tokens() {
        let err = parse_lifetimes("1 2 3\n", &path(), RecordPolicy::Strict).unwrap_err();
        assert!(matches!(err, ApplicationError::MalformedRecord { line: 1, .. }));
    }

    #[test]
    fn test_parse_points_infers_dimension() {
        let (dimension, points) =
            parse_points("\n1 2 3\n4 5 6\n", &path(), None, RecordPolicy::Strict).unwrap();
        assert_eq!(dimension, 3);
        assert_eq!(points.len(), 2);
    }
}
