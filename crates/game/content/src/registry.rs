//! Hash-keyed registry of loaded data stores.
//!
//! Systems that only know a table's schema hash (packet handlers answering
//! client DB2 queries, hotfix tooling) resolve stores here without naming
//! the record type.
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use game_core::{LocaleMask, Record};

use crate::storage::Db2Storage;

/// Type-erased view of a [`Db2Storage`].
pub trait DataStore: Send + Sync + 'static {
    fn schema_hash(&self) -> u32;

    fn table_name(&self) -> &'static str;

    /// Raw format string of the table's schema.
    fn format(&self) -> &'static str;

    fn field_count(&self) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a record with this id was loaded.
    fn contains(&self, id: u32) -> bool;

    fn available_locales(&self) -> LocaleMask;

    fn as_any(&self) -> &dyn Any;
}

impl<T: Record> DataStore for Db2Storage<T> {
    fn schema_hash(&self) -> u32 {
        Db2Storage::schema_hash(self)
    }

    fn table_name(&self) -> &'static str {
        T::SCHEMA.table()
    }

    fn format(&self) -> &'static str {
        Db2Storage::format(self)
    }

    fn field_count(&self) -> usize {
        Db2Storage::field_count(self)
    }

    fn len(&self) -> usize {
        Db2Storage::len(self)
    }

    fn contains(&self, id: u32) -> bool {
        Db2Storage::contains(self, id)
    }

    fn available_locales(&self) -> LocaleMask {
        Db2Storage::available_locales(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Map from schema hash to store.
///
/// Registering a store under a hash that is already present replaces the
/// previous entry.
#[derive(Clone, Default)]
pub struct StoreRegistry {
    stores: HashMap<u32, Arc<dyn DataStore>>,
}

impl StoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `store` under its schema hash, returning any store it replaced.
    pub fn register(&mut self, store: Arc<dyn DataStore>) -> Option<Arc<dyn DataStore>> {
        self.stores.insert(store.schema_hash(), store)
    }

    /// Store registered under `hash`, if any.
    pub fn get(&self, hash: u32) -> Option<&Arc<dyn DataStore>> {
        self.stores.get(&hash)
    }

    /// Typed store for `T`, if one is registered.
    pub fn get_typed<T: Record>(&self) -> Option<&Db2Storage<T>> {
        self.get(T::SCHEMA.hash())?
            .as_any()
            .downcast_ref::<Db2Storage<T>>()
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &Arc<dyn DataStore>)> {
        self.stores.iter().map(|(hash, store)| (*hash, store))
    }
}

impl std::fmt::Debug for StoreRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(
                self.stores
                    .iter()
                    .map(|(hash, store)| (format!("{hash:#010x}"), store.table_name())),
            )
            .finish()
    }
}
