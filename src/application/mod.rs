//! Application layer: record parsing, reporting and services
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod dataset;
pub mod error;
pub mod error_ext;
pub mod report;
pub mod services;

pub use dataset::{Dataset, LoadStats, RecordPolicy};
pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
