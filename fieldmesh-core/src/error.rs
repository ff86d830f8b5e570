//! Error types for fieldmesh

use thiserror::Error;

/// Main error type for fieldmesh operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("oracle query failed: {0}")]
    Oracle(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("attribute oracle returned {actual} values for chunk {chunk} of length {expected}")]
    AttributeShapeMismatch {
        chunk: usize,
        expected: usize,
        actual: usize,
    },

    #[error("{stage} stage failed")]
    Stage {
        stage: &'static str,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Tag this error with the pipeline stage it was raised in.
    pub fn at_stage(self, stage: &'static str) -> Self {
        Error::Stage {
            stage,
            source: Box::new(self),
        }
    }
}

/// Result type alias for fieldmesh operations
pub type Result<T> = std::result::Result<T, Error>;
