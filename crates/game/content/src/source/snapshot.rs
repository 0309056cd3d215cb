//! Bincode table snapshots.
//!
//! Layout of a default-locale file:
//!
//! ```text
//! SnapshotHeader { magic: "DB2S", field_count, record_count, table_hash }
//! Vec<T>          records, in file order
//! Vec<String>     string block, record_count * string columns entries
//! ```
//!
//! A locale overlay file carries the same header followed by the string
//! block only.
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use game_core::{Record, Schema};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{DecodedTable, TableSource};
use crate::error::TableError;

/// Magic bytes opening every snapshot file.
pub const SNAPSHOT_MAGIC: [u8; 4] = *b"DB2S";

/// Fixed-size prefix of a snapshot file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: [u8; 4],
    pub field_count: u32,
    pub record_count: u32,
    pub table_hash: u32,
}

impl SnapshotHeader {
    pub fn new(schema: &Schema, record_count: usize) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            field_count: schema.field_count() as u32,
            record_count: record_count as u32,
            table_hash: schema.hash(),
        }
    }
}

/// [`TableSource`] reading bincode snapshots from the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct SnapshotSource;

impl SnapshotSource {
    pub fn new() -> Self {
        Self
    }

    /// Write a default-locale snapshot for `T`.
    pub fn write_table<T>(path: &Path, records: &[T], strings: &[&str]) -> Result<(), TableError>
    where
        T: Record + Serialize,
    {
        Self::write_table_as(path, &T::SCHEMA, records, strings)
    }

    /// Write a default-locale snapshot under an explicit schema.
    ///
    /// Extraction tools use this when the schema is only known at runtime.
    pub fn write_table_as<R: Serialize>(
        path: &Path,
        schema: &Schema,
        records: &[R],
        strings: &[&str],
    ) -> Result<(), TableError> {
        let header = SnapshotHeader::new(schema, records.len());
        write_atomically(path, |writer| {
            bincode::serialize_into(&mut *writer, &header)?;
            bincode::serialize_into(&mut *writer, records)?;
            bincode::serialize_into(&mut *writer, strings)
        })
    }

    /// Write a locale overlay snapshot holding only a string block.
    pub fn write_strings(path: &Path, schema: &Schema, strings: &[&str]) -> Result<(), TableError> {
        let header = SnapshotHeader::new(schema, 0);
        write_atomically(path, |writer| {
            bincode::serialize_into(&mut *writer, &header)?;
            bincode::serialize_into(&mut *writer, strings)
        })
    }

    fn open(path: &Path) -> Result<BufReader<File>, TableError> {
        let file = File::open(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(BufReader::new(file))
    }

    fn read_header<R: Read>(
        reader: &mut R,
        path: &Path,
        schema: &Schema,
    ) -> Result<SnapshotHeader, TableError> {
        let header: SnapshotHeader = decode(reader, path, None)?;

        if header.magic != SNAPSHOT_MAGIC {
            return Err(TableError::BadMagic {
                path: path.to_path_buf(),
            });
        }

        let found = header.field_count as usize;
        if found != schema.field_count() {
            return Err(TableError::FieldCount {
                path: path.to_path_buf(),
                found,
                expected: schema.field_count(),
            });
        }

        if header.table_hash != schema.hash() {
            return Err(TableError::TableHash {
                path: path.to_path_buf(),
                declared_fields: found,
                found: header.table_hash,
                expected: schema.hash(),
            });
        }

        Ok(header)
    }
}

impl TableSource for SnapshotSource {
    fn read_table<T>(&self, path: &Path, schema: &Schema) -> Result<DecodedTable<T>, TableError>
    where
        T: Record + DeserializeOwned,
    {
        let mut reader = Self::open(path)?;
        let header = Self::read_header(&mut reader, path, schema)?;
        let declared_fields = header.field_count as usize;

        let records: Vec<T> = decode(&mut reader, path, Some(declared_fields))?;
        if records.len() != header.record_count as usize {
            return Err(TableError::RecordCount {
                path: path.to_path_buf(),
                declared_fields,
                found: records.len(),
                expected: header.record_count as usize,
            });
        }

        let strings: Vec<String> = decode(&mut reader, path, Some(declared_fields))?;
        let expected = records.len() * schema.string_columns();
        if strings.len() != expected {
            return Err(TableError::StringCount {
                path: path.to_path_buf(),
                declared_fields: Some(declared_fields),
                found: strings.len(),
                expected,
            });
        }

        Ok(DecodedTable {
            field_count: declared_fields,
            records,
            strings,
        })
    }

    fn read_strings(&self, path: &Path, schema: &Schema) -> Result<Vec<String>, TableError> {
        let mut reader = Self::open(path)?;
        let header = Self::read_header(&mut reader, path, schema)?;
        decode(&mut reader, path, Some(header.field_count as usize))
    }
}

/// Decode the next value; `declared_fields` is the header count once read.
fn decode<T: DeserializeOwned, R: Read>(
    reader: &mut R,
    path: &Path,
    declared_fields: Option<usize>,
) -> Result<T, TableError> {
    bincode::deserialize_from(reader).map_err(|source| TableError::Decode {
        path: path.to_path_buf(),
        declared_fields,
        source,
    })
}

/// Write through a temp file and rename, so readers never see a torn table.
fn write_atomically<F>(path: &Path, write: F) -> Result<(), TableError>
where
    F: FnOnce(&mut BufWriter<File>) -> bincode::Result<()>,
{
    let io_err = |source| TableError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let temp_path = path.with_extension("tmp");
    let file = File::create(&temp_path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    write(&mut writer).map_err(|source| TableError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(io_err)?;
    drop(writer);

    fs::rename(&temp_path, path).map_err(io_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::{BroadcastTextEntry, ItemEntry, StrRef};
    use tempfile::TempDir;

    fn item(id: u32) -> ItemEntry {
        ItemEntry {
            id,
            class: 2,
            display_id: 100 + id,
            ..Default::default()
        }
    }

    #[test]
    fn test_read_written_table() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Item.db2");
        SnapshotSource::write_table(&path, &[item(1), item(7)], &[]).unwrap();

        let table: DecodedTable<ItemEntry> = SnapshotSource
            .read_table(&path, &ItemEntry::SCHEMA)
            .unwrap();

        assert_eq!(table.field_count, 8);
        assert_eq!(table.records, vec![item(1), item(7)]);
        assert!(table.strings.is_empty());
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_field_count_mismatch_reports_declared_count() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Item.db2");
        let old_layout = Schema::new("Item", "niiiiii");
        SnapshotSource::write_table_as(&path, &old_layout, &[[1u32; 7]], &[]).unwrap();

        let err = SnapshotSource
            .read_table::<ItemEntry>(&path, &ItemEntry::SCHEMA)
            .unwrap_err();

        assert_eq!(err.declared_fields(), Some(7));
        assert!(matches!(
            err,
            TableError::FieldCount {
                found: 7,
                expected: 8,
                ..
            }
        ));
    }

    #[test]
    fn test_foreign_table_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Item.db2");
        // Same column count as Item, different table.
        let other = Schema::new("Other", "niiiiiii");
        SnapshotSource::write_table_as(&path, &other, &[[0u32; 8]], &[]).unwrap();

        let err = SnapshotSource
            .read_table::<ItemEntry>(&path, &ItemEntry::SCHEMA)
            .unwrap_err();
        assert!(matches!(err, TableError::TableHash { .. }));
        assert_eq!(err.declared_fields(), Some(8));
    }

    #[test]
    fn test_truncated_body_keeps_header_field_count() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Item.db2");
        // Header and an empty record list, no string block.
        SnapshotSource::write_strings(&path, &ItemEntry::SCHEMA, &[]).unwrap();

        let err = SnapshotSource
            .read_table::<ItemEntry>(&path, &ItemEntry::SCHEMA)
            .unwrap_err();
        assert!(matches!(err, TableError::Decode { .. }));
        assert_eq!(err.declared_fields(), Some(8));
    }

    #[test]
    fn test_garbage_file_is_not_a_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Item.db2");
        fs::write(&path, b"WDB2 definitely not bincode").unwrap();

        let err = SnapshotSource
            .read_table::<ItemEntry>(&path, &ItemEntry::SCHEMA)
            .unwrap_err();
        assert!(matches!(err, TableError::BadMagic { .. } | TableError::Decode { .. }));
        assert_eq!(err.declared_fields(), None);
    }

    #[test]
    fn test_string_block_must_cover_every_record() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("BroadcastText.db2");
        let text = BroadcastTextEntry {
            id: 1,
            male_text: StrRef(0),
            female_text: StrRef(1),
            ..Default::default()
        };
        SnapshotSource::write_table(&path, &[text], &["only one"]).unwrap();

        let err = SnapshotSource
            .read_table::<BroadcastTextEntry>(&path, &BroadcastTextEntry::SCHEMA)
            .unwrap_err();
        assert!(matches!(
            err,
            TableError::StringCount {
                found: 1,
                expected: 2,
                ..
            }
        ));
        assert_eq!(err.declared_fields(), Some(13));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = SnapshotSource
            .read_strings(&dir.path().join("frFR/Item.db2"), &ItemEntry::SCHEMA)
            .unwrap_err();
        assert!(matches!(err, TableError::Io { .. }));
    }
}
