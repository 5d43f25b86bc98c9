//! Constants shared by the encoder and decoder.

/// Record magic.
pub const MAGIC: [u8; 4] = *b"TPW1";

/// Format version written by this crate and the only one it reads.
pub const VERSION: u16 = 1;

/// Header size in bytes
pub const HEADER_SIZE: usize = 24;

/// Deepest list nesting the decoder accepts.
pub const MAX_LIST_DEPTH: usize = 64;

/// Header flags
pub mod flags {
    /// At least one cell in the record is null.
    pub const HAS_NULLS: u8 = 1 << 0;
}

/// Cell tags
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellTag {
    Null = 0,
    Boolean = 1,
    Int64 = 2,
    Float64 = 3,
    String = 4,
    DateTime = 5,
    List = 6,
}

impl CellTag {
    /// Resolves a tag byte. Unknown tags return `None`.
    pub fn from_u8(tag: u8) -> Option<Self> {
        Some(match tag {
            0 => CellTag::Null,
            1 => CellTag::Boolean,
            2 => CellTag::Int64,
            3 => CellTag::Float64,
            4 => CellTag::String,
            5 => CellTag::DateTime,
            6 => CellTag::List,
            _ => return None,
        })
    }
}

// Byte offsets inside the header.
pub(crate) const OFF_VERSION: usize = 4;
pub(crate) const OFF_KIND: usize = 6;
pub(crate) const OFF_FLAGS: usize = 7;
pub(crate) const OFF_FIELD_COUNT: usize = 8;
pub(crate) const OFF_ROW_COUNT: usize = 12;
pub(crate) const OFF_BODY_LEN: usize = 20;
