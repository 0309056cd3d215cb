//! Startup loading of every DB2 table the world server needs.
//!
//! [`DataStores::load`] is all-or-nothing: it returns a fully populated set
//! of stores, or an error the caller must treat as fatal. There is no
//! degraded mode with some tables missing.
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use game_core::{
    BroadcastTextEntry, ItemCurrencyCostEntry, ItemEntry, ItemExtendedCostEntry, ItemSparseEntry,
    KeyChainEntry, Locale, LocaleMask, QuestPackageItemEntry, Record, Schema, SpellReagentsEntry,
};

use crate::error::{BootstrapError, MissingSentinel};
use crate::loader::TableLoader;
use crate::registry::{DataStore, StoreRegistry};
use crate::source::TableSource;
use crate::storage::Db2Storage;

/// Subdirectory of the data directory holding DB2 files.
pub const DB2_SUBDIR: &str = "dbc";

/// Client build the tables must be extracted from.
pub const CLIENT_BUILD: &str = "5.4.8 (18414)";

/// A record expected to exist only in data of the right client build.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sentinel {
    pub schema: Schema,
    pub id: u32,
}

impl Sentinel {
    pub const fn new(schema: Schema, id: u32) -> Self {
        Self { schema, id }
    }
}

/// Last records added in 5.4.8 (18414) to each version-critical table.
pub const VERSION_SENTINELS: [Sentinel; 4] = [
    Sentinel::new(BroadcastTextEntry::SCHEMA, 77161),
    Sentinel::new(ItemEntry::SCHEMA, 112353),
    Sentinel::new(ItemExtendedCostEntry::SCHEMA, 5280),
    Sentinel::new(QuestPackageItemEntry::SCHEMA, 2256),
];

/// Where to find the data and which locale the default files carry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BootstrapConfig {
    /// Data directory root; tables live under `<data_dir>/dbc/`.
    pub data_dir: PathBuf,
    pub default_locale: Locale,
}

impl BootstrapConfig {
    pub fn new(data_dir: impl Into<PathBuf>, default_locale: Locale) -> Self {
        Self {
            data_dir: data_dir.into(),
            default_locale,
        }
    }

    pub fn db2_path(&self) -> PathBuf {
        self.data_dir.join(DB2_SUBDIR)
    }
}

/// Check that every sentinel record is present in `registry`.
///
/// Byte-compatible layouts prove the shape of the data, not its vintage: an
/// older extract with the same columns but fewer rows passes the schema
/// check and fails here.
pub fn verify_sentinels(
    registry: &StoreRegistry,
    sentinels: &[Sentinel],
) -> Result<(), BootstrapError> {
    let missing: Vec<MissingSentinel> = sentinels
        .iter()
        .filter(|sentinel| {
            !registry
                .get(sentinel.schema.hash())
                .is_some_and(|store| store.contains(sentinel.id))
        })
        .map(|sentinel| MissingSentinel {
            table: sentinel.schema.table(),
            id: sentinel.id,
        })
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    tracing::error!(
        "Please extract correct db2 files from client {} (missing records: {})",
        CLIENT_BUILD,
        missing
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );
    Err(BootstrapError::WrongDataVersion {
        missing,
        build: CLIENT_BUILD,
    })
}

/// Every DB2 store used by the world server.
#[derive(Clone, Debug)]
pub struct DataStores {
    pub broadcast_text: Arc<Db2Storage<BroadcastTextEntry>>,
    pub item: Arc<Db2Storage<ItemEntry>>,
    pub item_currency_cost: Arc<Db2Storage<ItemCurrencyCostEntry>>,
    pub item_sparse: Arc<Db2Storage<ItemSparseEntry>>,
    pub item_extended_cost: Arc<Db2Storage<ItemExtendedCostEntry>>,
    pub key_chain: Arc<Db2Storage<KeyChainEntry>>,
    pub quest_package_item: Arc<Db2Storage<QuestPackageItemEntry>>,
    pub spell_reagents: Arc<Db2Storage<SpellReagentsEntry>>,
    registry: StoreRegistry,
    available_locales: LocaleMask,
}

impl DataStores {
    /// Load all tables from `config.data_dir`, or fail.
    ///
    /// Tables load in declaration order; schema faults stop the run at the
    /// offending table, read failures are collected and escalated once every
    /// table was attempted, and version sentinels are checked last.
    pub fn load<S: TableSource>(config: &BootstrapConfig, source: &S) -> Result<Self, BootstrapError> {
        let started = Instant::now();
        let mut loader = TableLoader::new(source, config.db2_path(), config.default_locale);

        let broadcast_text = loader.load("BroadcastText.db2")?;
        let item = loader.load("Item.db2")?;
        let item_currency_cost = loader.load("ItemCurrencyCost.db2")?;
        let item_sparse = loader.load("Item-sparse.db2")?;
        let item_extended_cost = loader.load("ItemExtendedCost.db2")?;
        let key_chain = loader.load("KeyChain.db2")?;
        let quest_package_item = loader.load("QuestPackageItem.db2")?;
        let spell_reagents = loader.load("SpellReagents.db2")?;

        let (registry, context) = loader.finish()?;
        verify_sentinels(&registry, &VERSION_SENTINELS)?;

        let available_locales = context.available_locales();
        tracing::info!(
            ">> Initialized {} DB2 data stores in {} ms",
            context.attempted(),
            started.elapsed().as_millis()
        );
        tracing::debug!("DB2 string locales: {}", locale_list(available_locales));

        let unavailable = LocaleMask::all().difference(available_locales);
        if !unavailable.is_empty() {
            tracing::warn!(
                "DB2 string overlays not loaded for: {}",
                locale_list(unavailable)
            );
        }

        Ok(Self {
            broadcast_text,
            item,
            item_currency_cost,
            item_sparse,
            item_extended_cost,
            key_chain,
            quest_package_item,
            spell_reagents,
            registry,
            available_locales,
        })
    }

    /// Store registered under `hash`, if any.
    pub fn storage(&self, hash: u32) -> Option<&Arc<dyn DataStore>> {
        self.registry.get(hash)
    }

    /// Typed store for `T`, if `T` is one of the loaded tables.
    pub fn typed<T: Record>(&self) -> Option<&Db2Storage<T>> {
        self.registry.get_typed::<T>()
    }

    pub fn registry(&self) -> &StoreRegistry {
        &self.registry
    }

    /// Number of loaded tables.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Locales whose string overlays loaded for every table.
    pub fn available_locales(&self) -> LocaleMask {
        self.available_locales
    }
}

fn locale_list(mask: LocaleMask) -> String {
    mask.locales()
        .map(|locale| locale.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
