//! Dataspace model and its version-2 dataspace-message encoding.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{ensure_len, FormatError};

/// Width of each stored dimension.
const LENGTH_SIZE: usize = 8;

/// Type of dataspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataspaceType {
    /// Scalar (single element).
    Scalar,
    /// Simple (N-dimensional array).
    Simple,
    /// Null (no data).
    Null,
}

/// The extent of a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataspace {
    /// The type of this dataspace.
    pub space_type: DataspaceType,
    /// Current dimension sizes (empty for scalar and null spaces).
    pub dimensions: Vec<u64>,
}

impl Dataspace {
    /// A zero-dimensional, single-element space.
    pub fn scalar() -> Self {
        Dataspace {
            space_type: DataspaceType::Scalar,
            dimensions: Vec::new(),
        }
    }

    /// A simple space with the given extent.
    pub fn simple(dims: &[u64]) -> Self {
        Dataspace {
            space_type: DataspaceType::Simple,
            dimensions: dims.to_vec(),
        }
    }

    /// Number of dimensions (0 for scalar).
    pub fn rank(&self) -> usize {
        self.dimensions.len()
    }

    /// Parse a dataspace message from raw message bytes.
    pub fn parse(data: &[u8]) -> Result<Dataspace, FormatError> {
        ensure_len(data, 0, 4)?;

        let version = data[0];
        if version != 2 {
            return Err(FormatError::InvalidDataspaceVersion(version));
        }
        let rank = data[1] as usize;
        let type_byte = data[3];
        let space_type = match type_byte {
            0 => DataspaceType::Scalar,
            1 => DataspaceType::Simple,
            2 => DataspaceType::Null,
            _ => return Err(FormatError::InvalidDataspaceType(type_byte)),
        };

        let mut pos = 4;
        ensure_len(data, pos, rank * LENGTH_SIZE)?;
        let mut dimensions = Vec::with_capacity(rank);
        for _ in 0..rank {
            dimensions.push(LittleEndian::read_u64(&data[pos..pos + LENGTH_SIZE]));
            pos += LENGTH_SIZE;
        }

        Ok(Dataspace {
            space_type,
            dimensions,
        })
    }

    /// Serialize dataspace to message bytes (v2 format).
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(4 + self.dimensions.len() * LENGTH_SIZE);
        buf.push(2); // version 2
        buf.push(self.dimensions.len() as u8);
        buf.push(0); // flags: no max dimensions
        buf.push(match self.space_type {
            DataspaceType::Scalar => 0,
            DataspaceType::Simple => 1,
            DataspaceType::Null => 2,
        });
        for &dim in &self.dimensions {
            buf.extend_from_slice(&dim.to_le_bytes());
        }
        buf
    }

    /// Total number of elements. Scalar = 1, Null = 0.
    pub fn num_elements(&self) -> u64 {
        match self.space_type {
            DataspaceType::Null => 0,
            DataspaceType::Scalar => 1,
            DataspaceType::Simple => {
                if self.dimensions.is_empty() {
                    0
                } else {
                    self.dimensions
                        .iter()
                        .fold(1u64, |acc, d| acc.saturating_mul(*d))
                }
            }
        }
    }
}
