//! Integration tests for record parsing and schedule assembly

use std::path::PathBuf;

use rstest::rstest;

use dynsky::application::dataset::{inline_path, load_dataset};
use dynsky::application::{ApplicationError, RecordPolicy};
use dynsky::domain::{DominanceTree, DomainError};

fn paths() -> (PathBuf, PathBuf) {
    (inline_path("coords"), inline_path("times"))
}

// ============================================================
// Pairing
// ============================================================

#[test]
fn given_more_lifetimes_than_points_when_strict_then_invalid_schedule() {
    let (c, t) = paths();

    let err = load_dataset(("1 1\n", &c), ("0 1\n\n1 2\n", &t), 2, RecordPolicy::Strict).unwrap_err();

    match err {
        ApplicationError::InvalidSchedule { path, line, .. } => {
            assert_eq!(path, t);
            assert_eq!(line, 3);
        }
        other => panic!("expected InvalidSchedule, got {:?}", other),
    }
}

#[test]
fn given_more_lifetimes_than_points_when_lenient_then_extra_lifetimes_are_ignored() {
    let (c, t) = paths();

    let dataset = load_dataset(("1 1\n", &c), ("0 1\n1 2\n", &t), 2, RecordPolicy::Lenient).unwrap();

    assert_eq!(dataset.scheduler.len(), 1);
    assert_eq!(dataset.scheduler.span(), Some((0, 1)));
}

#[test]
fn given_fewer_lifetimes_than_points_then_trailing_points_are_unscheduled() {
    let (c, t) = paths();

    let dataset = load_dataset(("1 1\n2 2\n3 3\n", &c), ("0 4\n", &t), 2, RecordPolicy::Strict).unwrap();

    assert_eq!(dataset.stats.records, 3);
    assert_eq!(dataset.stats.scheduled, 1);
    assert_eq!(dataset.stats.unscheduled, 2);
}

#[test]
fn given_empty_inputs_then_schedule_is_empty() {
    let (c, t) = paths();

    let dataset = load_dataset(("\n\n", &c), ("", &t), 3, RecordPolicy::Strict).unwrap();

    assert!(dataset.scheduler.is_empty());
    let mut tree = DominanceTree::new();
    assert_eq!(dataset.scheduler.run(&mut tree).count(), 0);
}

// ============================================================
// Record validation
// ============================================================

#[rstest]
#[case("5 5\n", 1)]
#[case("0 1\n3 2\n", 2)]
#[case("0 1\n\n\n7 7\n", 4)]
fn given_non_increasing_lifetime_then_reports_its_line(#[case] times: &str, #[case] line: usize) {
    let (c, t) = paths();

    let err = load_dataset(("1 1\n2 2\n", &c), (times, &t), 2, RecordPolicy::Strict).unwrap_err();

    assert!(matches!(err, ApplicationError::InvalidSchedule { .. }));
    assert_eq!(err.line(), Some(line));
}

#[rstest]
#[case("1 NaN\n")]
#[case("inf 1\n")]
#[case("1 2 x\n")]
fn given_unusable_coordinate_then_malformed_record(#[case] coords: &str) {
    let (c, t) = paths();

    let err = load_dataset((coords, &c), ("0 1\n", &t), 2, RecordPolicy::Strict).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::MalformedRecord { line: 1, .. }
    ));
}

#[rstest]
#[case("0\n")]
#[case("0 1 2\n")]
#[case("a b\n")]
#[case("0.5 1\n")]
fn given_malformed_lifetime_then_malformed_record(#[case] times: &str) {
    let (c, t) = paths();

    let err = load_dataset(("1 1\n", &c), (times, &t), 2, RecordPolicy::Strict).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::MalformedRecord { line: 1, .. }
    ));
}

#[test]
fn given_zero_dimension_then_domain_error() {
    let (c, t) = paths();

    let err = load_dataset(("1\n", &c), ("0 1\n", &t), 0, RecordPolicy::Strict).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::InvalidDimension(0))
    ));
}
