//! Typed in-memory store for one DB2 table.
use std::collections::HashMap;
use std::path::Path;

use game_core::{Locale, LocaleMask, Record, Schema, StrRef};
use serde::de::DeserializeOwned;

use crate::error::TableError;
use crate::source::TableSource;

/// Records of one table, indexed by id, plus the table's string block.
///
/// # Lifecycle
///
/// ```text
/// new() ── load() ──► loaded ── load_strings_from() ──► loaded + overlay
///                       (once)     (zero or more, one per locale)
/// ```
///
/// `available_locales` records which locales hold a string column: the
/// default locale after [`load`](Self::load), plus every locale whose
/// overlay succeeded.
pub struct Db2Storage<T: Record> {
    records: Vec<T>,
    index: HashMap<u32, usize>,
    /// One string column per locale id.
    strings: [Option<Vec<Box<str>>>; Locale::TOTAL],
    default_locale: Locale,
    available_locales: LocaleMask,
    field_count: usize,
    loaded: bool,
}

impl<T: Record> Db2Storage<T> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
            strings: std::array::from_fn(|_| None),
            default_locale: Locale::default(),
            available_locales: LocaleMask::empty(),
            field_count: 0,
            loaded: false,
        }
    }

    /// Decode the default-locale table at `path`.
    ///
    /// On failure the store stays empty; [`field_count`](Self::field_count)
    /// then reports the column count the file declared, if its header could
    /// be read.
    pub fn load<S>(&mut self, source: &S, path: &Path, locale: Locale) -> Result<(), TableError>
    where
        S: TableSource,
        T: DeserializeOwned,
    {
        if self.loaded {
            return Err(TableError::AlreadyLoaded {
                table: T::SCHEMA.table(),
            });
        }

        let table = source
            .read_table::<T>(path, &T::SCHEMA)
            .inspect_err(|err| {
                self.field_count = err.declared_fields().unwrap_or(0);
            })?;

        self.field_count = table.field_count;
        self.index = table
            .records
            .iter()
            .enumerate()
            .map(|(position, record)| (record.id(), position))
            .collect();
        self.records = table.records;
        self.strings[locale.id() as usize] = Some(into_column(table.strings));
        self.default_locale = locale;
        self.available_locales = LocaleMask::of(locale);
        self.loaded = true;
        Ok(())
    }

    /// Overlay the string block of `locale` from `path`.
    ///
    /// The overlay must hold exactly as many strings as the default-locale
    /// block; string slots are positional.
    pub fn load_strings_from<S>(
        &mut self,
        source: &S,
        path: &Path,
        locale: Locale,
    ) -> Result<(), TableError>
    where
        S: TableSource,
    {
        let Some(default_column) = self.strings[self.default_locale.id() as usize]
            .as_ref()
            .filter(|_| self.loaded)
        else {
            return Err(TableError::NotLoaded {
                table: T::SCHEMA.table(),
            });
        };

        let strings = source.read_strings(path, &T::SCHEMA)?;
        if strings.len() != default_column.len() {
            return Err(TableError::StringCount {
                path: path.to_path_buf(),
                declared_fields: None,
                found: strings.len(),
                expected: default_column.len(),
            });
        }

        self.strings[locale.id() as usize] = Some(into_column(strings));
        self.available_locales.insert(LocaleMask::of(locale));
        Ok(())
    }

    pub fn lookup(&self, id: u32) -> Option<&T> {
        self.index.get(&id).map(|&position| &self.records[position])
    }

    pub fn contains(&self, id: u32) -> bool {
        self.index.contains_key(&id)
    }

    /// Resolve a string slot, falling back to the default locale when
    /// `locale` has no overlay.
    pub fn string(&self, slot: StrRef, locale: Locale) -> Option<&str> {
        self.column(locale)
            .or_else(|| self.column(self.default_locale))
            .and_then(|column| column.get(slot.slot()))
            .map(|value| &**value)
    }

    fn column(&self, locale: Locale) -> Option<&Vec<Box<str>>> {
        self.strings[locale.id() as usize].as_ref()
    }

    /// Records in file order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn schema(&self) -> Schema {
        T::SCHEMA
    }

    /// Column count declared by the last file read.
    pub fn field_count(&self) -> usize {
        self.field_count
    }

    pub fn format(&self) -> &'static str {
        T::SCHEMA.format()
    }

    pub fn schema_hash(&self) -> u32 {
        T::SCHEMA.hash()
    }

    pub fn default_locale(&self) -> Locale {
        self.default_locale
    }

    pub fn available_locales(&self) -> LocaleMask {
        self.available_locales
    }
}

impl<T: Record> Default for Db2Storage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> std::fmt::Debug for Db2Storage<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db2Storage")
            .field("table", &T::SCHEMA.table())
            .field("records", &self.records.len())
            .field("available_locales", &self.available_locales)
            .field("loaded", &self.loaded)
            .finish()
    }
}

fn into_column(strings: Vec<String>) -> Vec<Box<str>> {
    strings.into_iter().map(String::into_boxed_str).collect()
}
