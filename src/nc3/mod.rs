//! NetCDF3 classic-format writer.
//!
//! The writer is split into a registry ([`Schema`]) that collects
//! dimensions, variables and global attributes, a header encoder, and a lazy
//! block generator ([`Blocks`]) that turns a flat value stream into the data
//! section. Everything is big-endian and aligned to 4 bytes.

mod blocks;
mod header;
mod schema;

pub use blocks::{Blocks, Scalar};
pub use schema::{Dimension, Schema, Variable};

use crate::error::{NcError, Result};
use std::fmt;

const NC_DIMENSION: u32 = 0x0A;
const NC_VARIABLE: u32 = 0x0B;
const NC_ATTRIBUTE: u32 = 0x0C;

/// On-disk format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatVersion {
    /// `CDF\x01`: 32-bit data offsets.
    #[default]
    Classic,
    /// `CDF\x02`: 64-bit data offsets.
    Offset64,
}

impl FormatVersion {
    /// The version byte following the `CDF` magic.
    pub fn version_byte(self) -> u8 {
        match self {
            FormatVersion::Classic => 1,
            FormatVersion::Offset64 => 2,
        }
    }

    /// Width in bytes of a variable's `begin` field.
    pub fn offset_size(self) -> usize {
        match self {
            FormatVersion::Classic => 4,
            FormatVersion::Offset64 => 8,
        }
    }
}

/// External NetCDF3 data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NcType {
    /// 8-bit signed integer.
    Byte,
    /// 8-bit character.
    Char,
    /// 16-bit signed integer.
    Short,
    /// 32-bit signed integer.
    Int,
    /// 32-bit IEEE float.
    Float,
    /// 64-bit IEEE float.
    Double,
}

impl NcType {
    /// Map a single-character type code onto a NetCDF3 type.
    pub fn from_char(code: char) -> Result<Self> {
        match code {
            'b' => Ok(NcType::Byte),
            'c' => Ok(NcType::Char),
            'h' => Ok(NcType::Short),
            'i' => Ok(NcType::Int),
            'f' => Ok(NcType::Float),
            'd' => Ok(NcType::Double),
            other => Err(NcError::unsupported_type(other)),
        }
    }

    /// Wire code written in the header.
    pub fn code(self) -> u32 {
        match self {
            NcType::Byte => 1,
            NcType::Char => 2,
            NcType::Short => 3,
            NcType::Int => 4,
            NcType::Float => 5,
            NcType::Double => 6,
        }
    }

    /// Size of one element in bytes.
    pub fn size(self) -> usize {
        match self {
            NcType::Byte | NcType::Char => 1,
            NcType::Short => 2,
            NcType::Int | NcType::Float => 4,
            NcType::Double => 8,
        }
    }

    /// Default fill value.
    pub fn fill(self) -> Scalar {
        match self {
            NcType::Byte => Scalar::Int(-127),
            NcType::Char => Scalar::Int(0),
            NcType::Short => Scalar::Int(-32767),
            NcType::Int => Scalar::Int(-2147483647),
            NcType::Float | NcType::Double => Scalar::Float(9.969_209_968_386_869e36),
        }
    }
}

impl fmt::Display for NcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NcType::Byte => "byte",
            NcType::Char => "char",
            NcType::Short => "short",
            NcType::Int => "int",
            NcType::Float => "float",
            NcType::Double => "double",
        };
        f.write_str(name)
    }
}

/// Round `n` up to the next multiple of 4.
pub(crate) fn pad4(n: usize) -> usize {
    (n + 3) & !3
}
