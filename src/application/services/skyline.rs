//! Skyline replay service
//!
//! Loads coordinate/lifetime inputs through the filesystem boundary, replays
//! the schedule against a dominance tree and streams per-tick snapshots.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::dataset::{self, Dataset, LoadStats, RecordPolicy};
use crate::application::report::write_snapshots;
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{DominanceTree, PointId, SkylineCache};
use crate::infrastructure::traits::FileSystem;

/// Outcome of a full replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub stats: LoadStats,
    /// Inclusive tick range replayed, None for an empty schedule
    pub span: Option<(i64, i64)>,
    pub ticks: usize,
}

/// Tree state after replaying a prefix of the schedule.
#[derive(Debug)]
pub struct HierarchyView {
    /// Last tick applied, None if no tick was reached
    pub tick: Option<i64>,
    pub tree: DominanceTree,
}

/// Insertion-only frontier of a point file.
#[derive(Debug)]
pub struct FrontierOutput {
    pub dimension: usize,
    pub offered: usize,
    pub cache: SkylineCache,
}

/// Service for replaying point schedules.
pub struct SkylineService {
    fs: Arc<dyn FileSystem>,
}

impl SkylineService {
    /// Create a new skyline service.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Read and validate both inputs into a replayable schedule.
    #[instrument(level = "debug", skip(self))]
    pub fn load(
        &self,
        coords: &Path,
        times: &Path,
        dimension: usize,
        policy: RecordPolicy,
    ) -> ApplicationResult<Dataset> {
        let coords_content = self.fs.read_to_string(coords).or_missing(coords)?;
        let times_content = self.fs.read_to_string(times).or_missing(times)?;

        let dataset = dataset::load_dataset(
            (&coords_content, coords),
            (&times_content, times),
            dimension,
            policy,
        )?;
        info!(
            dimension,
            records = dataset.stats.records,
            scheduled = dataset.stats.scheduled,
            skipped = dataset.stats.skipped,
            "loaded dataset"
        );
        Ok(dataset)
    }

    /// Replay every tick and stream the snapshots into `sink`.
    #[instrument(level = "debug", skip_all)]
    pub fn replay(&self, dataset: Dataset, sink: &mut dyn Write) -> ApplicationResult<RunSummary> {
        let span = dataset.scheduler.span();
        let mut tree = DominanceTree::new();
        let ticks = write_snapshots(sink, dataset.scheduler.run(&mut tree)).map_err(|source| {
            ApplicationError::WriteFailed {
                context: "write snapshots".to_string(),
                source,
            }
        })?;

        info!(ticks, ?span, remaining = tree.len(), "replay complete");
        Ok(RunSummary {
            stats: dataset.stats,
            span,
            ticks,
        })
    }

    /// Replay into a file created through the filesystem boundary.
    #[instrument(level = "debug", skip(self, dataset))]
    pub fn replay_to_file(&self, dataset: Dataset, output: &Path) -> ApplicationResult<RunSummary> {
        let mut writer = self
            .fs
            .create(output)
            .with_path_context("create output", output)?;
        self.replay(dataset, &mut *writer)
    }

    /// Replay up to and including tick `at`.
    ///
    /// Without `at` the replay stops after the last injection tick, which is
    /// the point where the hierarchy holds the most recently added points.
    #[instrument(level = "debug", skip(self, dataset))]
    pub fn hierarchy(&self, dataset: Dataset, at: Option<i64>) -> HierarchyView {
        let mut tree = DominanceTree::new();
        let Some(target) = at.or_else(|| dataset.scheduler.last_injection()) else {
            return HierarchyView { tick: None, tree };
        };

        let mut reached = None;
        {
            let mut replay = dataset.scheduler.run(&mut tree);
            while replay.peek_tick().is_some_and(|tick| tick <= target) {
                reached = replay.next().map(|snapshot| snapshot.tick);
            }
        }
        debug!(target, ?reached, active = tree.len(), "partial replay");
        HierarchyView { tick: reached, tree }
    }

    /// Stream a point file through a [`SkylineCache`].
    #[instrument(level = "debug", skip(self))]
    pub fn frontier(
        &self,
        path: &Path,
        dimension: Option<usize>,
        policy: RecordPolicy,
    ) -> ApplicationResult<FrontierOutput> {
        let content = self.fs.read_to_string(path).or_missing(path)?;
        let (dimension, points) = dataset::parse_points(&content, path, dimension, policy)?;

        let offered = points.len();
        let mut cache = SkylineCache::new();
        cache.extend(points);
        info!(dimension, offered, frontier = cache.len(), "frontier computed");

        Ok(FrontierOutput {
            dimension,
            offered,
            cache,
        })
    }

    /// Final skyline identifiers of a replay, without writing snapshots.
    pub fn final_skyline(&self, dataset: Dataset) -> Vec<PointId> {
        let mut tree = DominanceTree::new();
        dataset
            .scheduler
            .run(&mut tree)
            .last()
            .map(|snapshot| snapshot.skyline)
            .unwrap_or_default()
    }
}
