//! Error types for the engine
//!
//! Covers engine initialization parameter validation and position wire
//! format parsing. Running out of arena or move-pool space is not an
//! error: it ends the session early and is reported through the normal
//! output path.

use thiserror::Error;

/// Errors that can occur in the engine
#[derive(Error, Debug)]
pub enum EngineError {
    /// An `init` parameter is outside its accepted range
    #[error("invalid init parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: i64 },

    /// A position string ended before all fields were read
    #[error("position input ended after {count} of {expected} fields")]
    PositionTruncated { count: usize, expected: usize },

    /// A position token is not an integer
    #[error("position field {index} is not an integer: {token:?}")]
    PositionToken { index: usize, token: String },

    /// A position field holds an out-of-range value
    #[error("position field {field} holds out-of-range value {value}")]
    PositionValue { field: &'static str, value: i64 },

    /// The OS refused to start a worker thread
    #[error("failed to spawn worker thread {id}: {source}")]
    WorkerSpawn {
        id: u32,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
