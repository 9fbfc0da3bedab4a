//! Predefined native descriptors and builders for derived datatypes.

use crate::datatype::{
    CharacterSet, CompoundMember, Datatype, DatatypeByteOrder, StringPadding, NATIVE_BYTE_ORDER,
};
use crate::error::FormatError;

// ---- Native scalar descriptors ----

const fn fixed(size: u32, signed: bool) -> Datatype {
    Datatype::FixedPoint {
        size,
        byte_order: NATIVE_BYTE_ORDER,
        signed,
        bit_offset: 0,
        bit_precision: (size * 8) as u16,
    }
}

const fn float(
    size: u32,
    byte_order: DatatypeByteOrder,
    exponent_location: u8,
    exponent_size: u8,
    mantissa_size: u8,
    exponent_bias: u32,
) -> Datatype {
    Datatype::FloatingPoint {
        size,
        byte_order,
        bit_offset: 0,
        bit_precision: (size * 8) as u16,
        exponent_location,
        exponent_size,
        mantissa_location: 0,
        mantissa_size,
        exponent_bias,
    }
}

pub static NATIVE_INT8: Datatype = fixed(1, true);
pub static NATIVE_INT16: Datatype = fixed(2, true);
pub static NATIVE_INT32: Datatype = fixed(4, true);
pub static NATIVE_INT64: Datatype = fixed(8, true);
pub static NATIVE_UINT8: Datatype = fixed(1, false);
pub static NATIVE_UINT16: Datatype = fixed(2, false);
pub static NATIVE_UINT32: Datatype = fixed(4, false);
pub static NATIVE_UINT64: Datatype = fixed(8, false);
/// IEEE 754 binary32.
pub static NATIVE_FLOAT: Datatype = float(4, NATIVE_BYTE_ORDER, 23, 8, 23, 127);
/// IEEE 754 binary64.
pub static NATIVE_DOUBLE: Datatype = float(8, NATIVE_BYTE_ORDER, 52, 11, 52, 1023);

// ---- Compound type builder ----

/// Builder for compound datatypes with caller-chosen member offsets.
///
/// Members keep insertion order. [`build`](Self::build) checks that every
/// member fits inside the compound, that members do not overlap, and that
/// names are unique.
pub struct CompoundTypeBuilder {
    size: u32,
    members: Vec<CompoundMember>,
}

impl CompoundTypeBuilder {
    /// Start a compound of `size` bytes with no members.
    pub fn new(size: u32) -> Self {
        Self {
            size,
            members: Vec::new(),
        }
    }

    /// Insert a named member at `byte_offset`.
    pub fn insert(mut self, name: &str, byte_offset: u64, datatype: Datatype) -> Self {
        self.members.push(CompoundMember {
            name: name.to_string(),
            byte_offset,
            datatype,
        });
        self
    }

    /// Build the compound datatype.
    pub fn build(self) -> Result<Datatype, FormatError> {
        let mut spans: Vec<(u64, u64)> = Vec::with_capacity(self.members.len());
        for (i, member) in self.members.iter().enumerate() {
            let start = member.byte_offset;
            let end = start + member.datatype.type_size() as u64;
            let duplicate = self.members[..i].iter().any(|m| m.name == member.name);
            let overlaps = spans.iter().any(|&(s, e)| start < e && s < end);
            if member.name.is_empty() || duplicate || overlaps || end > self.size as u64 {
                return Err(FormatError::InvalidCompoundMember(member.name.clone()));
            }
            spans.push((start, end));
        }
        Ok(Datatype::Compound {
            size: self.size,
            members: self.members,
        })
    }
}

// ---- Variable-length strings ----

/// A variable-length string descriptor with the given padding and charset.
pub fn vlen_string(padding: StringPadding, charset: CharacterSet) -> Datatype {
    Datatype::VariableLength {
        is_string: true,
        padding: Some(padding),
        charset: Some(charset),
        base_type: Box::new(Datatype::String {
            size: 1,
            padding,
            charset,
        }),
    }
}
