//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::PointId;

/// Domain errors represent violated preconditions of the skyline core.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("dimension mismatch: expected {expected} coordinates, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("invalid dimension: {0} (must be at least 1)")]
    InvalidDimension(usize),

    #[error("invalid schedule for point {id}: insertion time {insert} must precede ejection time {eject}")]
    InvalidSchedule {
        id: PointId,
        insert: i64,
        eject: i64,
    },

    #[error("point {0} is already scheduled")]
    DuplicatePoint(PointId),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// Structural defects reported by `DominanceTree::check_invariants`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("point {child} is not dominated by its parent {parent}")]
    ParentDoesNotDominate { parent: PointId, child: PointId },

    #[error("siblings {a} and {b} are comparable")]
    ComparableSiblings { a: PointId, b: PointId },

    #[error("point {0} does not link back to the level holding it")]
    BrokenParentLink(PointId),

    #[error("child list references a freed node: {0}")]
    DanglingChild(String),

    #[error("point {0} is attached but not indexed")]
    NotIndexed(PointId),

    #[error("{attached} attached nodes, {indexed} indexed ids, {allocated} allocated nodes")]
    CountMismatch {
        attached: usize,
        indexed: usize,
        allocated: usize,
    },
}
