//! Error types for the node layer.

use ezhdf5_io::EngineError;

/// Errors returned by node lookups, writes and reads.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The storage engine rejected the operation.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Access flags other than the four recognised values.
    #[error("unrecognised file access flags: {0:#x}")]
    InvalidMode(u32),

    /// A sequence with no elements was assigned.
    #[error("cannot store an empty sequence at {0}")]
    EmptySequence(String),

    /// An array view was not laid out contiguously in standard order.
    #[error("value for {0} is not contiguous in memory")]
    NonContiguous(String),

    /// The requested element type differs from the stored one.
    #[error("type mismatch at {path}: stored {stored}, requested {requested}")]
    TypeMismatch {
        path: String,
        stored: String,
        requested: String,
    },

    /// The stored extent differs from the buffer or block shape.
    #[error("extent mismatch at {path}: stored {stored:?}, requested {requested:?}")]
    ExtentMismatch {
        path: String,
        stored: Vec<u64>,
        requested: Vec<u64>,
    },

    /// A text read hit a dataset that does not hold a string.
    #[error("dataset at {0} does not hold text")]
    NotText(String),
}

pub type Result<T> = std::result::Result<T, Error>;
