//! Fixture data sets written as table snapshots into temp directories.
#![allow(dead_code)]

use std::cell::RefCell;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use game_content::{DecodedTable, SnapshotSource, TableError, TableSource};
use game_core::{
    BroadcastTextEntry, ItemCurrencyCostEntry, ItemEntry, ItemExtendedCostEntry, ItemSparseEntry,
    KeyChainEntry, Locale, QuestPackageItemEntry, Record, Schema, SpellReagentsEntry, StrRef,
};
use serde::de::DeserializeOwned;
use tempfile::TempDir;

/// Every table of the standard list, in load order.
pub const TABLE_FILES: [&str; 8] = [
    "BroadcastText.db2",
    "Item.db2",
    "ItemCurrencyCost.db2",
    "Item-sparse.db2",
    "ItemExtendedCost.db2",
    "KeyChain.db2",
    "QuestPackageItem.db2",
    "SpellReagents.db2",
];

/// Route library logs to the test harness output. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

/// Shared buffer collecting formatted log lines.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("log buffer")).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log buffer").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with `info` and above captured; returns its result and the logs.
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let capture = LogCapture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    (result, capture.contents())
}

/// Data directory laid out as `<root>/dbc/...`.
pub struct Dataset {
    pub dir: TempDir,
}

impl Dataset {
    /// Complete 5.4.8 data set (sentinels included) without locale overlays.
    pub fn complete() -> Self {
        let dataset = Self {
            dir: TempDir::new().expect("temp dir"),
        };
        dataset.write_broadcast_text(&[1, 77161]);
        dataset.write_items(&[25, 112353]);
        dataset.write(&[ItemCurrencyCostEntry { item_id: 25 }], &[]);
        dataset.write_item_sparse(&[25, 112353]);
        dataset.write(
            &[ItemExtendedCostEntry {
                id: 5280,
                required_honor_points: 1750,
                ..Default::default()
            }],
            &[],
        );
        dataset.write(
            &[KeyChainEntry {
                id: 1,
                key: [0xAB; 32],
            }],
            &[],
        );
        dataset.write(
            &[QuestPackageItemEntry {
                id: 2256,
                package_id: 3,
                item_id: 112353,
                count: 1,
                flags: 0,
            }],
            &[],
        );
        dataset.write(
            &[SpellReagentsEntry {
                id: 9,
                reagent: [17056, 0, 0, 0, 0, 0, 0, 0],
                reagent_count: [1, 0, 0, 0, 0, 0, 0, 0],
            }],
            &[],
        );
        dataset
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn db2_path(&self) -> PathBuf {
        self.root().join("dbc")
    }

    pub fn table_path(&self, file_name: &str) -> PathBuf {
        self.db2_path().join(file_name)
    }

    pub fn file_name(schema: &Schema) -> String {
        format!("{}.db2", schema.table())
    }

    pub fn write<T: Record + serde::Serialize>(&self, records: &[T], strings: &[&str]) {
        let path = self.table_path(&Self::file_name(&T::SCHEMA));
        SnapshotSource::write_table(&path, records, strings).expect("write table");
    }

    pub fn write_broadcast_text(&self, ids: &[u32]) {
        let records: Vec<_> = ids
            .iter()
            .enumerate()
            .map(|(row, id)| BroadcastTextEntry {
                id: *id,
                male_text: StrRef(2 * row as u32),
                female_text: StrRef(2 * row as u32 + 1),
                ..Default::default()
            })
            .collect();
        let strings: Vec<String> = ids
            .iter()
            .flat_map(|id| [format!("male {id}"), format!("female {id}")])
            .collect();
        let strings: Vec<&str> = strings.iter().map(String::as_str).collect();
        self.write(&records, &strings);
    }

    pub fn write_items(&self, ids: &[u32]) {
        let records: Vec<_> = ids
            .iter()
            .map(|id| ItemEntry {
                id: *id,
                class: 4,
                display_id: id % 1000,
                ..Default::default()
            })
            .collect();
        self.write(&records, &[]);
    }

    pub fn write_item_sparse(&self, ids: &[u32]) {
        let records: Vec<_> = ids
            .iter()
            .enumerate()
            .map(|(row, id)| {
                let base = 5 * row as u32;
                ItemSparseEntry {
                    id: *id,
                    quality: 3,
                    item_level: 496,
                    name: StrRef(base),
                    name2: StrRef(base + 1),
                    name3: StrRef(base + 2),
                    name4: StrRef(base + 3),
                    description: StrRef(base + 4),
                    ..Default::default()
                }
            })
            .collect();
        let strings: Vec<String> = ids
            .iter()
            .flat_map(|id| {
                [
                    format!("item {id}"),
                    String::new(),
                    String::new(),
                    String::new(),
                    format!("description {id}"),
                ]
            })
            .collect();
        let strings: Vec<&str> = strings.iter().map(String::as_str).collect();
        self.write(&records, &strings);
    }

    /// Write a `locale` overlay for `schema`, with `slots` prefixed strings.
    pub fn write_overlay(&self, locale: Locale, schema: &Schema, slots: usize) {
        let path = self
            .db2_path()
            .join(locale.name())
            .join(Self::file_name(schema));
        let strings: Vec<String> = (0..slots).map(|slot| format!("{locale} {slot}")).collect();
        let strings: Vec<&str> = strings.iter().map(String::as_str).collect();
        SnapshotSource::write_strings(&path, schema, &strings).expect("write overlay");
    }

    /// Overlays for every table, for each of `locales`.
    pub fn write_all_overlays(&self, locales: &[Locale]) {
        for locale in locales {
            self.write_overlay(*locale, &BroadcastTextEntry::SCHEMA, 4);
            self.write_overlay(*locale, &ItemEntry::SCHEMA, 0);
            self.write_overlay(*locale, &ItemCurrencyCostEntry::SCHEMA, 0);
            self.write_overlay(*locale, &ItemSparseEntry::SCHEMA, 10);
            self.write_overlay(*locale, &ItemExtendedCostEntry::SCHEMA, 0);
            self.write_overlay(*locale, &KeyChainEntry::SCHEMA, 0);
            self.write_overlay(*locale, &QuestPackageItemEntry::SCHEMA, 0);
            self.write_overlay(*locale, &SpellReagentsEntry::SCHEMA, 0);
        }
    }

    pub fn remove(&self, file_name: &str) {
        std::fs::remove_file(self.table_path(file_name)).expect("remove table");
    }
}

/// [`SnapshotSource`] that records every path it is asked to read.
#[derive(Default)]
pub struct RecordingSource {
    inner: SnapshotSource,
    pub tables: RefCell<Vec<PathBuf>>,
    pub overlays: RefCell<Vec<PathBuf>>,
}

impl RecordingSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reads(&self) -> usize {
        self.tables.borrow().len() + self.overlays.borrow().len()
    }

    /// Overlay paths attempted for `locale`.
    pub fn overlays_for(&self, locale: Locale) -> Vec<PathBuf> {
        self.overlays
            .borrow()
            .iter()
            .filter(|path| {
                path.parent()
                    .and_then(Path::file_name)
                    .is_some_and(|dir| dir.to_str() == Some(locale.name()))
            })
            .cloned()
            .collect()
    }
}

impl TableSource for RecordingSource {
    fn read_table<T>(&self, path: &Path, schema: &Schema) -> Result<DecodedTable<T>, TableError>
    where
        T: Record + DeserializeOwned,
    {
        self.tables.borrow_mut().push(path.to_path_buf());
        self.inner.read_table(path, schema)
    }

    fn read_strings(&self, path: &Path, schema: &Schema) -> Result<Vec<String>, TableError> {
        self.overlays.borrow_mut().push(path.to_path_buf());
        self.inner.read_strings(path, schema)
    }
}
