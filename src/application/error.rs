//! Application-level errors (wraps domain errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;
use crate::exitcode;

/// Application errors wrap domain errors and add input context.
///
/// Record errors carry the originating file and the 1-based physical line.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{path}:{line}: malformed record: {reason}")]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("{path}:{line}: expected {expected} coordinates, found {found}")]
    DimensionMismatch {
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("{path}:{line}: invalid schedule: {reason}")]
    InvalidSchedule {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("cannot read {path}")]
    MissingResource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("write failed: {context}")]
    WriteFailed {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApplicationError {
    /// True for errors caused by the content of an input file.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            ApplicationError::Domain(_)
                | ApplicationError::MalformedRecord { .. }
                | ApplicationError::DimensionMismatch { .. }
                | ApplicationError::InvalidSchedule { .. }
        )
    }

    /// sysexits code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            ApplicationError::MissingResource { .. } => exitcode::NOINPUT,
            ApplicationError::Config { .. } => exitcode::CONFIG,
            ApplicationError::WriteFailed { .. } => exitcode::IOERR,
            ApplicationError::OperationFailed { .. } => exitcode::CANTCREAT,
            _ if self.is_data_error() => exitcode::DATAERR,
            _ => exitcode::SOFTWARE,
        }
    }

    /// Line number for record-level errors.
    pub fn line(&self) -> Option<usize> {
        match self {
            ApplicationError::MalformedRecord { line, .. }
            | ApplicationError::DimensionMismatch { line, .. }
            | ApplicationError::InvalidSchedule { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
