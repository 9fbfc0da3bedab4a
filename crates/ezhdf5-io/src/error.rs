//! Errors reported by the storage engine.

use std::path::PathBuf;

use ezhdf5_format::FormatError;

use crate::hid::{Hid, ObjectKind};

/// Errors returned by [`Engine`](crate::Engine) calls.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Reading, writing or creating the container file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file on disk is not a valid container.
    #[error("container format error: {0}")]
    Format(#[from] FormatError),

    /// The handle was never issued or has already been closed.
    #[error("invalid or closed handle {0}")]
    InvalidHandle(Hid),

    /// A handle or name refers to an object of a different kind.
    #[error("{name} is a {actual}, expected a {expected}")]
    WrongKind {
        name: String,
        expected: ObjectKind,
        actual: ObjectKind,
    },

    /// Nothing is linked at the name, or an intermediate group is missing.
    #[error("object not found: {0}")]
    NotFound(String),

    /// A link with this name already exists.
    #[error("object already exists: {0}")]
    AlreadyExists(String),

    /// A write was attempted on a container opened read-only.
    #[error("container opened read-only: {0}")]
    ReadOnly(PathBuf),

    /// The container is open in a way that conflicts with the request.
    #[error("container already open: {0}")]
    FileAlreadyOpen(PathBuf),

    /// The name is empty, contains a `.` segment, or is too long to store.
    #[error("invalid object name: {0:?}")]
    InvalidName(String),

    /// The memory type does not match the dataset's stored type.
    #[error("type mismatch: dataset holds {stored}, got {given}")]
    TypeMismatch { stored: String, given: String },

    /// The buffer does not hold exactly the dataset's element count.
    #[error("extent mismatch: dataset holds {stored:?}, got {given:?}")]
    ExtentMismatch { stored: Vec<u64>, given: Vec<u64> },
}

pub type Result<T> = std::result::Result<T, EngineError>;
