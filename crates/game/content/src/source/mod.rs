//! Table sources: the seam between the loader and a concrete file format.
//!
//! The loader only needs "decode this path into records plus a string block"
//! and "decode this path into a string block". [`SnapshotSource`] implements
//! that for bincode table snapshots; a native client container reader plugs
//! in through the same trait.
mod snapshot;

pub use snapshot::{SNAPSHOT_MAGIC, SnapshotHeader, SnapshotSource};

use std::path::Path;

use game_core::{Record, Schema};
use serde::de::DeserializeOwned;

use crate::error::TableError;

/// Records and strings decoded from a default-locale table file.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedTable<T> {
    /// Column count declared by the file.
    pub field_count: usize,
    /// Records in file order.
    pub records: Vec<T>,
    /// String block; [`game_core::StrRef`] values index into it.
    pub strings: Vec<String>,
}

/// Decodes table files for a given schema.
pub trait TableSource {
    /// Decode a default-locale table.
    fn read_table<T>(&self, path: &Path, schema: &Schema) -> Result<DecodedTable<T>, TableError>
    where
        T: Record + DeserializeOwned;

    /// Decode the string block of a locale overlay file.
    fn read_strings(&self, path: &Path, schema: &Schema) -> Result<Vec<String>, TableError>;
}
