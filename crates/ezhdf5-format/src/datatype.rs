//! Storage type descriptors and their datatype-message encoding.
//!
//! Supports the HDF5 type classes the node layer stores: fixed-point (0),
//! floating-point (1), fixed string (3), compound (6) and variable-length (9).
//! Encoding follows the HDF5 datatype message layout: one class/version byte,
//! a 24-bit class bit field, a 4-byte element size, then class properties.

use std::fmt;

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{ensure_len, FormatError};

/// Byte order of numeric data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatatypeByteOrder {
    LittleEndian,
    BigEndian,
}

/// Byte order of the running target.
pub const NATIVE_BYTE_ORDER: DatatypeByteOrder = if cfg!(target_endian = "little") {
    DatatypeByteOrder::LittleEndian
} else {
    DatatypeByteOrder::BigEndian
};

/// String padding type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringPadding {
    /// C convention.
    NullTerminate,
    NullPad,
    /// Fortran convention.
    SpacePad,
}

/// Character set encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterSet {
    Ascii,
    Utf8,
}

/// A member of a compound datatype.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundMember {
    /// Member name.
    pub name: String,
    /// Byte offset within the compound.
    pub byte_offset: u64,
    /// Member datatype.
    pub datatype: Datatype,
}

/// A storage type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum Datatype {
    /// Class 0: Fixed-point (integer) types.
    FixedPoint {
        size: u32,
        byte_order: DatatypeByteOrder,
        signed: bool,
        bit_offset: u16,
        bit_precision: u16,
    },
    /// Class 1: Floating-point types.
    FloatingPoint {
        size: u32,
        byte_order: DatatypeByteOrder,
        bit_offset: u16,
        bit_precision: u16,
        exponent_location: u8,
        exponent_size: u8,
        mantissa_location: u8,
        mantissa_size: u8,
        exponent_bias: u32,
    },
    /// Class 3: Fixed-length string.
    String {
        size: u32,
        padding: StringPadding,
        charset: CharacterSet,
    },
    /// Class 6: Compound type.
    Compound {
        size: u32,
        members: Vec<CompoundMember>,
    },
    /// Class 9: Variable-length type.
    VariableLength {
        is_string: bool,
        padding: Option<StringPadding>,
        charset: Option<CharacterSet>,
        base_type: Box<Datatype>,
    },
}

fn parse_string_padding(val: u8) -> Result<StringPadding, FormatError> {
    match val {
        0 => Ok(StringPadding::NullTerminate),
        1 => Ok(StringPadding::NullPad),
        2 => Ok(StringPadding::SpacePad),
        _ => Err(FormatError::InvalidStringPadding(val)),
    }
}

fn padding_bits(padding: StringPadding) -> u8 {
    match padding {
        StringPadding::NullTerminate => 0,
        StringPadding::NullPad => 1,
        StringPadding::SpacePad => 2,
    }
}

fn parse_charset(val: u8) -> Result<CharacterSet, FormatError> {
    match val {
        0 => Ok(CharacterSet::Ascii),
        1 => Ok(CharacterSet::Utf8),
        _ => Err(FormatError::InvalidCharacterSet(val)),
    }
}

fn charset_bits(charset: CharacterSet) -> u8 {
    match charset {
        CharacterSet::Ascii => 0,
        CharacterSet::Utf8 => 1,
    }
}

/// Read a null-terminated string from `data` starting at `offset`.
/// Returns (string, bytes_consumed including the null terminator).
fn read_null_terminated_string(data: &[u8], offset: usize) -> Result<(String, usize), FormatError> {
    ensure_len(data, offset, 1)?;
    let remaining = &data[offset..];
    let null_pos = remaining
        .iter()
        .position(|&b| b == 0)
        .ok_or(FormatError::UnexpectedEof {
            expected: data.len() + 1,
            available: data.len(),
        })?;
    let name = std::str::from_utf8(&remaining[..null_pos])
        .map_err(|_| FormatError::InvalidName)?
        .to_string();
    Ok((name, null_pos + 1))
}

/// Number of bytes used to encode a member offset inside a compound of
/// `compound_size` bytes (version 3 layout).
fn offset_bytes_for_size(compound_size: u32) -> usize {
    if compound_size <= 0xFF {
        1
    } else if compound_size <= 0xFFFF {
        2
    } else {
        4
    }
}

/// Read an unsigned integer of 1, 2, or 4 bytes (LE).
fn read_uint(data: &[u8], offset: usize, nbytes: usize) -> Result<u64, FormatError> {
    ensure_len(data, offset, nbytes)?;
    let slice = &data[offset..offset + nbytes];
    Ok(match nbytes {
        1 => slice[0] as u64,
        2 => LittleEndian::read_u16(slice) as u64,
        _ => LittleEndian::read_u32(slice) as u64,
    })
}

fn write_uint(buf: &mut Vec<u8>, val: u64, nbytes: usize) {
    match nbytes {
        1 => buf.push(val as u8),
        2 => buf.extend_from_slice(&(val as u16).to_le_bytes()),
        _ => buf.extend_from_slice(&(val as u32).to_le_bytes()),
    }
}

/// Deepest nesting of compound members and variable-length base types
/// accepted by [`Datatype::parse`].
pub const MAX_DATATYPE_DEPTH: usize = 32;

/// Fail unless `precision` is between 1 and the element's bit width.
fn check_precision(precision: u16, size: u32) -> Result<(), FormatError> {
    if precision == 0 || u64::from(precision) > u64::from(size) * 8 {
        return Err(FormatError::InvalidBitPrecision { precision, size });
    }
    Ok(())
}

impl Datatype {
    /// Parse a datatype message from raw bytes.
    ///
    /// Returns `(Datatype, bytes_consumed)` for recursive parsing.
    pub fn parse(data: &[u8]) -> Result<(Datatype, usize), FormatError> {
        Datatype::parse_nested(data, 0)
    }

    fn parse_nested(data: &[u8], depth: usize) -> Result<(Datatype, usize), FormatError> {
        if depth > MAX_DATATYPE_DEPTH {
            return Err(FormatError::DatatypeTooDeep(depth));
        }
        ensure_len(data, 0, 8)?;

        let class_and_version = data[0];
        let class_id = class_and_version & 0x0F;
        let version = (class_and_version >> 4) & 0x0F;
        let bf0 = data[1];
        let bf1 = data[2];
        let size = LittleEndian::read_u32(&data[4..8]);
        let mut pos = 8;

        match class_id {
            0 => {
                ensure_len(data, pos, 4)?;
                let byte_order = if bf0 & 0x01 == 0 {
                    DatatypeByteOrder::LittleEndian
                } else {
                    DatatypeByteOrder::BigEndian
                };
                let signed = (bf0 >> 3) & 0x01 == 1;
                let bit_offset = LittleEndian::read_u16(&data[pos..pos + 2]);
                let bit_precision = LittleEndian::read_u16(&data[pos + 2..pos + 4]);
                check_precision(bit_precision, size)?;
                pos += 4;
                Ok((
                    Datatype::FixedPoint {
                        size,
                        byte_order,
                        signed,
                        bit_offset,
                        bit_precision,
                    },
                    pos,
                ))
            }
            1 => {
                ensure_len(data, pos, 12)?;
                let byte_order = if bf0 & 0x01 == 0 {
                    DatatypeByteOrder::LittleEndian
                } else {
                    DatatypeByteOrder::BigEndian
                };
                let bit_offset = LittleEndian::read_u16(&data[pos..pos + 2]);
                let bit_precision = LittleEndian::read_u16(&data[pos + 2..pos + 4]);
                check_precision(bit_precision, size)?;
                let exponent_location = data[pos + 4];
                let exponent_size = data[pos + 5];
                let mantissa_location = data[pos + 6];
                let mantissa_size = data[pos + 7];
                let exponent_bias = LittleEndian::read_u32(&data[pos + 8..pos + 12]);
                pos += 12;
                Ok((
                    Datatype::FloatingPoint {
                        size,
                        byte_order,
                        bit_offset,
                        bit_precision,
                        exponent_location,
                        exponent_size,
                        mantissa_location,
                        mantissa_size,
                        exponent_bias,
                    },
                    pos,
                ))
            }
            3 => {
                let padding = parse_string_padding(bf0 & 0x0F)?;
                let charset = parse_charset((bf0 >> 4) & 0x0F)?;
                Ok((Datatype::String { size, padding, charset }, pos))
            }
            6 => {
                if version != 3 {
                    return Err(FormatError::InvalidDatatypeVersion {
                        class: class_id,
                        version,
                    });
                }
                let num_members = (bf0 as u16) | ((bf1 as u16) << 8);
                let ob = offset_bytes_for_size(size);
                let mut members = Vec::with_capacity(num_members as usize);
                for _ in 0..num_members {
                    let (name, name_len) = read_null_terminated_string(data, pos)?;
                    pos += name_len;
                    let byte_offset = read_uint(data, pos, ob)?;
                    pos += ob;
                    let (member_dt, consumed) = Datatype::parse_nested(&data[pos..], depth + 1)?;
                    pos += consumed;
                    members.push(CompoundMember {
                        name,
                        byte_offset,
                        datatype: member_dt,
                    });
                }
                Ok((Datatype::Compound { size, members }, pos))
            }
            9 => {
                let is_string = bf0 & 0x0F == 1;
                let padding = if is_string {
                    Some(parse_string_padding((bf0 >> 4) & 0x0F)?)
                } else {
                    None
                };
                let charset = if is_string {
                    Some(parse_charset(bf1 & 0x0F)?)
                } else {
                    None
                };
                let (base_type, consumed) = Datatype::parse_nested(&data[pos..], depth + 1)?;
                pos += consumed;
                Ok((
                    Datatype::VariableLength {
                        is_string,
                        padding,
                        charset,
                        base_type: Box::new(base_type),
                    },
                    pos,
                ))
            }
            _ => Err(FormatError::InvalidDatatypeClass(class_id)),
        }
    }

    /// Serialize the datatype to message bytes.
    pub fn serialize(&self) -> Vec<u8> {
        match self {
            Datatype::FixedPoint {
                size,
                byte_order,
                signed,
                bit_offset,
                bit_precision,
            } => {
                let mut bf0 = 0u8;
                if *byte_order == DatatypeByteOrder::BigEndian {
                    bf0 |= 0x01;
                }
                if *signed {
                    bf0 |= 0x08;
                }
                let mut buf = build_header(0, 1, [bf0, 0, 0], *size);
                buf.extend_from_slice(&bit_offset.to_le_bytes());
                buf.extend_from_slice(&bit_precision.to_le_bytes());
                buf
            }
            Datatype::FloatingPoint {
                size,
                byte_order,
                bit_offset,
                bit_precision,
                exponent_location,
                exponent_size,
                mantissa_location,
                mantissa_size,
                exponent_bias,
            } => {
                // implied-msb mantissa normalization
                let mut bf0 = 0x20u8;
                if *byte_order == DatatypeByteOrder::BigEndian {
                    bf0 |= 0x01;
                }
                let bf1 = bit_precision.saturating_sub(1) as u8;
                let mut buf = build_header(1, 1, [bf0, bf1, 0], *size);
                buf.extend_from_slice(&bit_offset.to_le_bytes());
                buf.extend_from_slice(&bit_precision.to_le_bytes());
                buf.push(*exponent_location);
                buf.push(*exponent_size);
                buf.push(*mantissa_location);
                buf.push(*mantissa_size);
                buf.extend_from_slice(&exponent_bias.to_le_bytes());
                buf
            }
            Datatype::String {
                size,
                padding,
                charset,
            } => {
                let bf0 = padding_bits(*padding) | (charset_bits(*charset) << 4);
                build_header(3, 1, [bf0, 0, 0], *size)
            }
            Datatype::Compound { size, members } => {
                let count = members.len() as u16;
                let mut buf = build_header(6, 3, [count as u8, (count >> 8) as u8, 0], *size);
                let ob = offset_bytes_for_size(*size);
                for member in members {
                    buf.extend_from_slice(member.name.as_bytes());
                    buf.push(0);
                    write_uint(&mut buf, member.byte_offset, ob);
                    buf.extend_from_slice(&member.datatype.serialize());
                }
                buf
            }
            Datatype::VariableLength {
                is_string,
                padding,
                charset,
                base_type,
            } => {
                let mut bf0 = if *is_string { 0x01u8 } else { 0x00 };
                let mut bf1 = 0u8;
                if *is_string {
                    if let Some(p) = padding {
                        bf0 |= padding_bits(*p) << 4;
                    }
                    if let Some(c) = charset {
                        bf1 = charset_bits(*c);
                    }
                }
                let mut buf = build_header(9, 1, [bf0, bf1, 0], 16);
                buf.extend_from_slice(&base_type.serialize());
                buf
            }
        }
    }

    /// Return the size in bytes of one element of this type.
    pub fn type_size(&self) -> u32 {
        match self {
            Datatype::FixedPoint { size, .. } => *size,
            Datatype::FloatingPoint { size, .. } => *size,
            Datatype::String { size, .. } => *size,
            Datatype::Compound { size, .. } => *size,
            // pointer + length
            Datatype::VariableLength { .. } => 16,
        }
    }

    /// True for variable-length string descriptors.
    pub fn is_vlen_string(&self) -> bool {
        matches!(self, Datatype::VariableLength { is_string: true, .. })
    }

    /// Whether element bytes laid out as `other` can be copied into `self`
    /// without conversion.
    ///
    /// Padding and character-set differences between variable-length string
    /// descriptors are ignored; strings are exchanged as whole values.
    pub fn is_compatible(&self, other: &Datatype) -> bool {
        match (self, other) {
            (
                Datatype::FixedPoint {
                    size: a,
                    byte_order: ao,
                    signed: asg,
                    ..
                },
                Datatype::FixedPoint {
                    size: b,
                    byte_order: bo,
                    signed: bsg,
                    ..
                },
            ) => a == b && ao == bo && asg == bsg,
            (
                Datatype::FloatingPoint {
                    size: a,
                    byte_order: ao,
                    ..
                },
                Datatype::FloatingPoint {
                    size: b,
                    byte_order: bo,
                    ..
                },
            ) => a == b && ao == bo,
            (Datatype::String { size: a, .. }, Datatype::String { size: b, .. }) => a == b,
            (
                Datatype::Compound {
                    size: a,
                    members: am,
                },
                Datatype::Compound {
                    size: b,
                    members: bm,
                },
            ) => {
                a == b
                    && am.len() == bm.len()
                    && am.iter().zip(bm).all(|(x, y)| {
                        x.name == y.name
                            && x.byte_offset == y.byte_offset
                            && x.datatype.is_compatible(&y.datatype)
                    })
            }
            (
                Datatype::VariableLength {
                    is_string: true, ..
                },
                Datatype::VariableLength {
                    is_string: true, ..
                },
            ) => true,
            (
                Datatype::VariableLength {
                    is_string: false,
                    base_type: a,
                    ..
                },
                Datatype::VariableLength {
                    is_string: false,
                    base_type: b,
                    ..
                },
            ) => a.is_compatible(b),
            _ => false,
        }
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datatype::FixedPoint { size, signed, .. } => {
                let prefix = if *signed { "i" } else { "u" };
                write!(f, "{prefix}{}", size * 8)
            }
            Datatype::FloatingPoint { size, .. } => write!(f, "f{}", size * 8),
            Datatype::String { size, .. } => write!(f, "string[{size}]"),
            Datatype::Compound { members, .. } => {
                write!(f, "compound{{")?;
                for (i, m) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", m.name, m.datatype)?;
                }
                write!(f, "}}")
            }
            Datatype::VariableLength {
                is_string: true, ..
            } => write!(f, "vlen_string"),
            Datatype::VariableLength { base_type, .. } => write!(f, "vlen<{base_type}>"),
        }
    }
}

fn build_header(class: u8, version: u8, bf: [u8; 3], size: u32) -> Vec<u8> {
    let mut buf = vec![0u8; 8];
    buf[0] = (class & 0x0F) | ((version & 0x0F) << 4);
    buf[1] = bf[0];
    buf[2] = bf[1];
    buf[3] = bf[2];
    LittleEndian::write_u32(&mut buf[4..8], size);
    buf
}
