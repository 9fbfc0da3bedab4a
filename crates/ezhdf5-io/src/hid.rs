//! Handle identifiers, object kinds and file access modes.

use std::fmt;

/// Opaque identifier of an open engine object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hid(pub i64);

impl Hid {
    /// The "unset" sentinel. Closing it is a no-op.
    pub const INVALID: Hid = Hid(-1);

    pub fn is_valid(self) -> bool {
        self.0 >= 0
    }
}

impl Default for Hid {
    fn default() -> Self {
        Hid::INVALID
    }
}

impl fmt::Display for Hid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hid:{}", self.0)
    }
}

/// Role of an open handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    File,
    Group,
    Dataset,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::File => write!(f, "file"),
            ObjectKind::Group => write!(f, "group"),
            ObjectKind::Dataset => write!(f, "dataset"),
        }
    }
}

/// How a container file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Open an existing file for reading.
    ReadOnly,
    /// Open an existing file for reading and writing.
    ReadWrite,
    /// Create a new file, replacing any existing one.
    Truncate,
    /// Create a new file, failing if it exists.
    Exclusive,
}

impl OpenMode {
    /// Raw access flag: read-only.
    pub const ACC_RDONLY: u32 = 0x0000;
    /// Raw access flag: read-write.
    pub const ACC_RDWR: u32 = 0x0001;
    /// Raw access flag: create, truncating.
    pub const ACC_TRUNC: u32 = 0x0002;
    /// Raw access flag: create exclusively.
    pub const ACC_EXCL: u32 = 0x0004;

    /// Map a raw access flag value. Combinations are not accepted.
    pub fn from_flags(flags: u32) -> Option<OpenMode> {
        match flags {
            Self::ACC_RDONLY => Some(OpenMode::ReadOnly),
            Self::ACC_RDWR => Some(OpenMode::ReadWrite),
            Self::ACC_TRUNC => Some(OpenMode::Truncate),
            Self::ACC_EXCL => Some(OpenMode::Exclusive),
            _ => None,
        }
    }

    pub fn is_create(self) -> bool {
        matches!(self, OpenMode::Truncate | OpenMode::Exclusive)
    }

    pub fn is_writable(self) -> bool {
        !matches!(self, OpenMode::ReadOnly)
    }
}
