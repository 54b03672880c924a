//! Points and the dominance primitive.

use std::fmt;

use itertools::Itertools;

use crate::domain::error::{DomainError, DomainResult};

/// Stable identity of a point.
///
/// Identifiers are assigned from 1 in declaration order; the external
/// encoding is zero-based (see [`PointId::ordinal`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PointId(pub u64);

impl PointId {
    /// Zero-based position used in rendered output.
    pub fn ordinal(self) -> u64 {
        self.0.saturating_sub(1)
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PointId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Immutable coordinate vector with identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    id: PointId,
    coords: Box<[f64]>,
}

impl Point {
    /// Construct a point, checking its arity against the configured dimension.
    pub fn new(id: impl Into<PointId>, coords: Vec<f64>, dimension: usize) -> DomainResult<Self> {
        if dimension == 0 {
            return Err(DomainError::InvalidDimension(dimension));
        }
        if coords.len() != dimension {
            return Err(DomainError::DimensionMismatch {
                expected: dimension,
                found: coords.len(),
            });
        }
        Ok(Self {
            id: id.into(),
            coords: coords.into_boxed_slice(),
        })
    }

    pub fn id(&self) -> PointId {
        self.id
    }

    pub fn coords(&self) -> &[f64] {
        &self.coords
    }

    pub fn dimension(&self) -> usize {
        self.coords.len()
    }

    /// `self` dominates `other` iff it is no worse in every dimension and
    /// strictly better (smaller) in at least one.
    pub fn dominates(&self, other: &Point) -> bool {
        debug_assert_eq!(self.dimension(), other.dimension());
        let mut strictly_better = false;
        for (a, b) in self.coords.iter().zip(other.coords.iter()) {
            if a > b {
                return false;
            }
            if a < b {
                strictly_better = true;
            }
        }
        strictly_better
    }

    /// Neither point dominates the other.
    pub fn is_incomparable(&self, other: &Point) -> bool {
        !self.dominates(other) && !other.dominates(self)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} ({})", self.id, self.coords.iter().join(", "))
    }
}
