//! Domain layer: points, dominance hierarchy, frontier cache and scheduler
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod cache;
pub mod error;
pub mod point;
pub mod scheduler;

pub use arena::{Anchor, DominanceNode, DominanceTree, NodeHandle, RENDER_DEPTH};
pub use cache::{CacheInsert, SkylineCache};
pub use error::{DomainError, DomainResult, InvariantViolation};
pub use point::{Point, PointId};
pub use scheduler::{EventKind, EventScheduler, Replay, Snapshot};
