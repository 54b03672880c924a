//! Flat, insertion-only Pareto frontier.

use tracing::trace;

use crate::domain::point::{Point, PointId};

/// Outcome of [`SkylineCache::try_insert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheInsert {
    /// The candidate joined the frontier, evicting the listed points.
    Accepted { evicted: Vec<PointId> },
    /// A cached point dominates the candidate; nothing changed.
    Rejected { by: PointId },
}

impl CacheInsert {
    pub fn is_accepted(&self) -> bool {
        matches!(self, CacheInsert::Accepted { .. })
    }
}

/// Pareto frontier of every point offered so far.
///
/// Costs O(k) per insert for a frontier of size k and never needs a
/// hierarchy, at the price of not supporting removal.
#[derive(Debug, Clone, Default)]
pub struct SkylineCache {
    points: Vec<Point>,
}

impl SkylineCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_insert(&mut self, candidate: Point) -> CacheInsert {
        if let Some(dominator) = self.points.iter().find(|p| p.dominates(&candidate)) {
            trace!(id = %candidate.id(), by = %dominator.id(), "cache rejected point");
            return CacheInsert::Rejected { by: dominator.id() };
        }

        let mut evicted = Vec::new();
        self.points.retain(|p| {
            if candidate.dominates(p) {
                evicted.push(p.id());
                false
            } else {
                true
            }
        });
        trace!(id = %candidate.id(), evicted = evicted.len(), "cache accepted point");
        self.points.push(candidate);

        CacheInsert::Accepted { evicted }
    }

    /// Frontier in acceptance order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn ids(&self) -> Vec<PointId> {
        let mut ids: Vec<PointId> = self.points.iter().map(Point::id).collect();
        ids.sort_unstable();
        ids
    }
}

impl Extend<Point> for SkylineCache {
    fn extend<T: IntoIterator<Item = Point>>(&mut self, iter: T) {
        for point in iter {
            self.try_insert(point);
        }
    }
}
