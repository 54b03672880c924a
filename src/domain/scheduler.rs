//! Time-ordered injection/ejection batches and the tick-by-tick replay.

use std::collections::{BTreeMap, HashSet};
use std::iter::FusedIterator;

use tracing::{debug, instrument, trace};

use crate::domain::arena::DominanceTree;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::point::{Point, PointId};

/// Kind of scheduled event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Inject,
    Eject,
}

/// Skyline identifiers observed at the end of one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub tick: i64,
    /// Ascending skyline identifiers
    pub skyline: Vec<PointId>,
}

/// Collects point lifetimes and replays them against a [`DominanceTree`].
#[derive(Debug, Default)]
pub struct EventScheduler {
    injections: BTreeMap<i64, Vec<Point>>,
    ejections: BTreeMap<i64, Vec<PointId>>,
    scheduled: HashSet<PointId>,
    dimension: Option<usize>,
}

impl EventScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scheduler that additionally checks every point against `dimension`.
    pub fn with_dimension(dimension: usize) -> DomainResult<Self> {
        if dimension == 0 {
            return Err(DomainError::InvalidDimension(dimension));
        }
        Ok(Self {
            dimension: Some(dimension),
            ..Self::default()
        })
    }

    /// Schedule `point` to be live during `[t_insert, t_eject)`.
    ///
    /// The point becomes visible in the snapshot of `t_insert` and is gone
    /// from the snapshot of `t_eject`.
    #[instrument(level = "trace", skip(self, point), fields(id = %point.id()))]
    pub fn ingest(&mut self, point: Point, t_insert: i64, t_eject: i64) -> DomainResult<()> {
        let id = point.id();
        if t_insert >= t_eject {
            return Err(DomainError::InvalidSchedule {
                id,
                insert: t_insert,
                eject: t_eject,
            });
        }
        if let Some(expected) = self.dimension {
            if point.dimension() != expected {
                return Err(DomainError::DimensionMismatch {
                    expected,
                    found: point.dimension(),
                });
            }
        }
        if !self.scheduled.insert(id) {
            return Err(DomainError::DuplicatePoint(id));
        }

        self.injections.entry(t_insert).or_default().push(point);
        self.ejections.entry(t_eject).or_default().push(id);
        trace!(%id, t_insert, t_eject, "scheduled");
        Ok(())
    }

    /// Number of ingested points.
    pub fn len(&self) -> usize {
        self.scheduled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scheduled.is_empty()
    }

    /// Inclusive tick range covered by a replay, None if nothing is scheduled.
    pub fn span(&self) -> Option<(i64, i64)> {
        let (&first, _) = self.injections.first_key_value()?;
        let (&last, _) = self.ejections.last_key_value()?;
        Some((first, last))
    }

    /// Latest tick with a scheduled injection.
    pub fn last_injection(&self) -> Option<i64> {
        self.injections.last_key_value().map(|(&tick, _)| tick)
    }

    /// Events in replay order: per tick, injections then ejections.
    pub fn events(&self) -> Vec<(i64, EventKind, PointId)> {
        let mut events = Vec::with_capacity(self.scheduled.len() * 2);
        for (&tick, batch) in &self.injections {
            events.extend(batch.iter().map(|p| (tick, EventKind::Inject, p.id())));
        }
        for (&tick, batch) in &self.ejections {
            events.extend(batch.iter().map(|&id| (tick, EventKind::Eject, id)));
        }
        // Stable sort keeps declaration order within a batch
        events.sort_by_key(|&(tick, kind, _)| (tick, kind == EventKind::Eject));
        events
    }

    /// Consume the schedule and replay it tick by tick against `tree`.
    ///
    /// The returned iterator is lazy: each call to `next` applies one tick.
    pub fn run(self, tree: &mut DominanceTree) -> Replay<'_> {
        let span = self.span();
        debug!(points = self.scheduled.len(), ?span, "starting replay");
        Replay {
            tree,
            injections: self.injections,
            ejections: self.ejections,
            next_tick: span.map(|(first, _)| first),
            last_tick: span.map_or(0, |(_, last)| last),
        }
    }
}

/// One-shot replay of a schedule, yielding one [`Snapshot`] per tick.
///
/// `size_hint` is exact unless the tick span does not fit in `usize`.
pub struct Replay<'t> {
    tree: &'t mut DominanceTree,
    injections: BTreeMap<i64, Vec<Point>>,
    ejections: BTreeMap<i64, Vec<PointId>>,
    next_tick: Option<i64>,
    last_tick: i64,
}

impl Replay<'_> {
    /// Read-only view of the tree between ticks.
    pub fn tree(&self) -> &DominanceTree {
        &*self.tree
    }

    /// Next tick to be applied, None once exhausted.
    pub fn peek_tick(&self) -> Option<i64> {
        self.next_tick
    }

    fn apply(&mut self, tick: i64) {
        if let Some(batch) = self.injections.remove(&tick) {
            for point in batch {
                self.tree.insert(point);
            }
        }
        if let Some(batch) = self.ejections.remove(&tick) {
            for id in batch {
                self.tree.eject(id);
            }
        }
    }
}

impl Iterator for Replay<'_> {
    type Item = Snapshot;

    fn next(&mut self) -> Option<Snapshot> {
        let tick = self.next_tick?;
        self.apply(tick);
        self.next_tick = (tick < self.last_tick).then(|| tick + 1);

        let skyline = self.tree.skyline();
        trace!(tick, skyline = skyline.len(), active = self.tree.len(), "tick complete");
        Some(Snapshot { tick, skyline })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let Some(tick) = self.next_tick else {
            return (0, Some(0));
        };
        // A span wider than usize can only be bounded from below
        let remaining = usize::try_from(self.last_tick.abs_diff(tick))
            .ok()
            .and_then(|n| n.checked_add(1));
        match remaining {
            Some(n) => (n, Some(n)),
            None => (usize::MAX, None),
        }
    }
}

impl FusedIterator for Replay<'_> {}
