//! Error types for container encoding and decoding.

use core::fmt;

/// Errors that can occur when encoding or parsing container structures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The container signature was not found at offset 0.
    SignatureNotFound,
    /// The container format version is not supported.
    UnsupportedVersion(u8),
    /// Unexpected end of data.
    UnexpectedEof {
        /// Number of bytes expected.
        expected: usize,
        /// Number of bytes actually available.
        available: usize,
    },
    /// Invalid length size (must be 2, 4, or 8).
    InvalidLengthSize(u8),
    /// Datatype class id outside the classes this crate understands.
    InvalidDatatypeClass(u8),
    /// Datatype message version not valid for its class.
    InvalidDatatypeVersion {
        /// The datatype class.
        class: u8,
        /// The version found.
        version: u8,
    },
    /// String padding value out of range.
    InvalidStringPadding(u8),
    /// Character set value out of range.
    InvalidCharacterSet(u8),
    /// Dataspace message version not supported.
    InvalidDataspaceVersion(u8),
    /// Dataspace type byte out of range.
    InvalidDataspaceType(u8),
    /// Object kind tag in the container is not a group or dataset.
    InvalidObjectKind(u8),
    /// Raw data storage tag is not recognised.
    InvalidStorageTag(u8),
    /// A link points past the end of the object table.
    DanglingLink {
        /// Link name.
        name: String,
        /// Target object index.
        target: u32,
    },
    /// A compound member does not fit inside the compound, or overlaps another.
    InvalidCompoundMember(String),
    /// A name stored in the container is not valid UTF-8.
    InvalidName,
    /// A numeric descriptor's bit precision is zero or wider than its size.
    InvalidBitPrecision {
        /// The precision found, in bits.
        precision: u16,
        /// The element size, in bytes.
        size: u32,
    },
    /// Descriptors nest deeper than [`MAX_DATATYPE_DEPTH`](crate::datatype::MAX_DATATYPE_DEPTH).
    DatatypeTooDeep(usize),
    /// Stored raw data does not match the dataset's type and extent.
    DataSizeMismatch {
        /// Bytes (or strings) implied by the datatype and dataspace.
        expected: u64,
        /// Bytes (or strings) actually stored.
        actual: u64,
    },
    /// CRC32C checksum mismatch.
    ChecksumMismatch {
        /// The checksum stored in the file.
        expected: u32,
        /// The checksum we computed.
        computed: u32,
    },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::SignatureNotFound => write!(f, "container signature not found"),
            FormatError::UnsupportedVersion(v) => {
                write!(f, "unsupported container version: {v}")
            }
            FormatError::UnexpectedEof {
                expected,
                available,
            } => {
                write!(f, "unexpected EOF: need {expected} bytes, have {available}")
            }
            FormatError::InvalidLengthSize(s) => {
                write!(f, "invalid length size: {s} (must be 2, 4, or 8)")
            }
            FormatError::InvalidDatatypeClass(c) => write!(f, "invalid datatype class: {c}"),
            FormatError::InvalidDatatypeVersion { class, version } => {
                write!(f, "invalid version {version} for datatype class {class}")
            }
            FormatError::InvalidStringPadding(v) => write!(f, "invalid string padding: {v}"),
            FormatError::InvalidCharacterSet(v) => write!(f, "invalid character set: {v}"),
            FormatError::InvalidDataspaceVersion(v) => {
                write!(f, "invalid dataspace version: {v}")
            }
            FormatError::InvalidDataspaceType(t) => write!(f, "invalid dataspace type: {t}"),
            FormatError::InvalidObjectKind(k) => write!(f, "invalid object kind tag: {k}"),
            FormatError::InvalidStorageTag(t) => write!(f, "invalid raw data storage tag: {t}"),
            FormatError::DanglingLink { name, target } => {
                write!(f, "link '{name}' points to missing object {target}")
            }
            FormatError::InvalidCompoundMember(name) => {
                write!(f, "compound member '{name}' is out of bounds or overlaps")
            }
            FormatError::InvalidName => write!(f, "stored name is not valid UTF-8"),
            FormatError::InvalidBitPrecision { precision, size } => {
                write!(f, "bit precision {precision} does not fit a {size}-byte element")
            }
            FormatError::DatatypeTooDeep(depth) => {
                write!(f, "datatype nesting depth {depth} exceeds the limit")
            }
            FormatError::DataSizeMismatch { expected, actual } => {
                write!(f, "dataset holds {actual} units of data, expected {expected}")
            }
            FormatError::ChecksumMismatch { expected, computed } => {
                write!(
                    f,
                    "checksum mismatch: expected {expected:#010x}, computed {computed:#010x}"
                )
            }
        }
    }
}

impl std::error::Error for FormatError {}

/// Fail with [`FormatError::UnexpectedEof`] unless `data` holds `needed`
/// bytes starting at `offset`.
pub(crate) fn ensure_len(data: &[u8], offset: usize, needed: usize) -> Result<(), FormatError> {
    let end = offset.saturating_add(needed);
    if end > data.len() {
        Err(FormatError::UnexpectedEof {
            expected: end,
            available: data.len(),
        })
    } else {
        Ok(())
    }
}
