//! Schema descriptors ("format strings") for DB2 tables.
//!
//! A schema is a table name plus one tag per file column. The tags determine
//! how many bytes each column occupies in the compiled record, which is what
//! the loader checks against `size_of::<T>()` before touching a file.
use core::mem::size_of;

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Reference to a slot in a table's string block.
///
/// Records store strings as slot indices; the owning storage resolves them
/// per locale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct StrRef(pub u32);

impl StrRef {
    pub const fn slot(self) -> usize {
        self.0 as usize
    }
}

/// Column kinds understood by the schema descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// `n`: primary index.
    Index,
    /// `i`: 32-bit integer.
    Int,
    /// `f`: 32-bit float.
    Float,
    /// `s`: string slot.
    String,
    /// `b`: single byte.
    Byte,
    /// `l`: boolean.
    Logic,
    /// `d`: sorted index, present in the record but not in the file.
    Sort,
    /// `x`: column present in the file and dropped from the record.
    Ignored,
    /// `X`: byte column present in the file and dropped from the record.
    IgnoredByte,
}

impl FieldType {
    pub const fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            b'n' => Self::Index,
            b'i' => Self::Int,
            b'f' => Self::Float,
            b's' => Self::String,
            b'b' => Self::Byte,
            b'l' => Self::Logic,
            b'd' => Self::Sort,
            b'x' => Self::Ignored,
            b'X' => Self::IgnoredByte,
            _ => return None,
        })
    }

    /// Bytes this column occupies in the compiled record.
    pub const fn record_size(self) -> usize {
        match self {
            Self::Index | Self::Int | Self::Sort => size_of::<u32>(),
            Self::Float => size_of::<f32>(),
            Self::String => size_of::<StrRef>(),
            Self::Byte => size_of::<u8>(),
            Self::Logic => size_of::<bool>(),
            Self::Ignored | Self::IgnoredByte => 0,
        }
    }
}

/// Error raised when a descriptor contains a tag the loader does not know.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown field tag {tag:?} at column {column} of '{table}' format")]
pub struct SchemaError {
    pub table: &'static str,
    pub tag: char,
    pub column: usize,
}

/// Immutable field layout of one DB2 table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Schema {
    table: &'static str,
    format: &'static str,
}

impl Schema {
    pub const fn new(table: &'static str, format: &'static str) -> Self {
        Self { table, format }
    }

    /// Table name, e.g. `"Item"`.
    pub const fn table(&self) -> &'static str {
        self.table
    }

    /// Raw format string, used verbatim in diagnostics.
    pub const fn format(&self) -> &'static str {
        self.format
    }

    /// Number of columns the file is expected to declare.
    pub const fn field_count(&self) -> usize {
        self.format.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = Result<FieldType, SchemaError>> + '_ {
        self.format
            .bytes()
            .enumerate()
            .map(|(column, tag)| {
                FieldType::from_tag(tag).ok_or(SchemaError {
                    table: self.table,
                    tag: tag as char,
                    column,
                })
            })
    }

    /// Byte size of a record laid out according to this descriptor.
    pub fn record_size(&self) -> Result<usize, SchemaError> {
        self.fields()
            .try_fold(0, |total, field| Ok(total + field?.record_size()))
    }

    /// Number of string columns, i.e. string slots per record.
    pub fn string_columns(&self) -> usize {
        self.format.bytes().filter(|tag| *tag == b's').count()
    }

    /// Stable identifier of this table layout.
    ///
    /// First four bytes (big endian) of SHA-256 over `table NUL format`.
    pub fn hash(&self) -> u32 {
        let mut hasher = Sha256::new();
        hasher.update(self.table.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.format.as_bytes());
        let digest = hasher.finalize();
        u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
    }
}

/// A compiled DB2 record type.
///
/// `SCHEMA` must describe the same byte layout as `Self`; the loader refuses
/// to read a table whose descriptor size differs from `size_of::<Self>()`.
pub trait Record: Send + Sync + 'static {
    const SCHEMA: Schema;

    /// Primary identifier (the `n` column).
    fn id(&self) -> u32;
}
