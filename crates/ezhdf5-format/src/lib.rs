//! Descriptor, dataspace and container encoding for ezhdf5.
//!
//! This crate holds the data model shared by the engine and the node layer:
//! storage type descriptors ([`datatype::Datatype`]), extents
//! ([`dataspace::Dataspace`]), the predefined native descriptors, and the
//! object tree of a container together with its file encoding. It keeps no
//! engine state.

pub mod container;
pub mod dataspace;
pub mod datatype;
pub mod error;
pub mod signature;
pub mod type_builders;

pub use container::{Container, DatasetObject, Object, ObjectId, RawData};
pub use dataspace::{Dataspace, DataspaceType};
pub use datatype::{CharacterSet, CompoundMember, Datatype, DatatypeByteOrder, StringPadding};
pub use error::FormatError;
