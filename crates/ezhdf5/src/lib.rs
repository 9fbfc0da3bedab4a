//! Lazy path-addressed nodes and typed assignment over hierarchical
//! containers.
//!
//! Chained lookups address nested locations; intermediate groups are opened
//! or created only when a lookup passes through them, and leaf datasets are
//! created, written and closed in a single call.
//!
//! # Writing
//!
//! ```no_run
//! use ezhdf5::File;
//! use num_complex::Complex;
//!
//! let file = File::create("data.ezh5")?;
//! file.lookup("a").lookup("b")?.lookup("x")?.assign(&42i32)?;
//! file.lookup("a").lookup("b")?.lookup("y")?.assign(&vec![1.0f64, 2.0, 3.0])?;
//! file.lookup("a").lookup("c")?.assign(&Complex::new(3.0f64, -4.0))?;
//! file.lookup("note").assign("hello")?;
//! file.close()?;
//! # Ok::<(), ezhdf5::Error>(())
//! ```
//!
//! # Reading
//!
//! ```no_run
//! use ezhdf5::{File, OpenMode};
//!
//! let file = File::open("data.ezh5", OpenMode::ReadOnly)?;
//! let x: i32 = file.lookup("a").lookup("b")?.lookup("x")?.read()?;
//! let y: Vec<f64> = file.lookup("a/b/y").read_vec()?;
//! let note = file.lookup("note").read_string()?;
//! # Ok::<(), ezhdf5::Error>(())
//! ```

pub mod error;
pub mod file;
pub mod handle;
pub mod node;
pub mod reader;
pub mod registry;
pub mod value;
pub mod writer;

pub use error::{Error, Result};
pub use file::File;
pub use handle::Handle;
pub use node::{Dataset, Group, Location, Node};
pub use reader::read_into;
pub use registry::{descriptor_of, init_type_registry, H5Type};
pub use value::{Block, Shape, Storable};
pub use writer::write;

pub use ezhdf5_io::{Hid, ObjectKind, OpenMode};
