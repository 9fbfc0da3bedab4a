//! Handle-based storage engine for ezhdf5 containers.
//!
//! A single process-wide [`Engine`], reached through [`engine()`], owns every
//! open container and issues [`Hid`] handles for files, groups and datasets.
//! Callers create and open objects by name relative to a file or group
//! handle, move element bytes in and out with a memory-side type descriptor,
//! and release each handle through the close call matching its role.
//!
//! ```no_run
//! use ezhdf5_io::{engine, Dataspace};
//! use ezhdf5_io::ezhdf5_format::type_builders::NATIVE_INT32;
//!
//! let file = engine().create_file("data.ezh5".as_ref(), false)?;
//! let ds = engine().create_dataset(file, "x", &NATIVE_INT32, &Dataspace::scalar())?;
//! engine().write_raw(ds, &NATIVE_INT32, &42i32.to_ne_bytes())?;
//! engine().close_dataset(ds)?;
//! engine().close_file(file)?;
//! # Ok::<(), ezhdf5_io::EngineError>(())
//! ```

pub use ezhdf5_format;

pub mod engine;
pub mod error;
pub mod hid;
mod storage;

pub use engine::{engine, Engine};
pub use error::{EngineError, Result};
pub use ezhdf5_format::{Dataspace, Datatype};
pub use hid::{Hid, ObjectKind, OpenMode};
