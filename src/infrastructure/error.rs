//! Infrastructure errors
//!
//! I/O that happens outside any application service (working directory
//! lookup, help output) lands here; everything else arrives wrapped.

use std::io;

use thiserror::Error;

use crate::application::ApplicationError;
use crate::exitcode;

#[derive(Error, Debug)]
pub enum InfraError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("cannot {context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl InfraError {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            InfraError::Application(e) => e.exit_code(),
            InfraError::Io { .. } => exitcode::IOERR,
        }
    }
}

pub type InfraResult<T> = Result<T, InfraError>;
