//! DB2 data stores: loading, validation, and lookup.
//!
//! This crate turns the extracted client tables under `<data_dir>/dbc/` into
//! typed in-memory stores:
//! - [`source`]: the file format seam ([`TableSource`]) and bincode snapshots
//! - [`storage`]: one typed store per table, with per-locale string columns
//! - [`loader`]: per-table loading, locale overlays, failure classification
//! - [`bootstrap`]: the fixed table list, escalation, and version sentinels
//! - [`registry`]: schema-hash lookup for code that does not know record types
//!
//! Record layouts and their format strings live in `game-core`.
pub mod bootstrap;
pub mod error;
pub mod loader;
pub mod registry;
pub mod source;
pub mod storage;

pub use bootstrap::{
    BootstrapConfig, CLIENT_BUILD, DB2_SUBDIR, DataStores, Sentinel, VERSION_SENTINELS,
    verify_sentinels,
};
pub use error::{BootstrapError, MissingSentinel, TableError};
pub use loader::{LoadContext, TableLoader, check_record_layout};
pub use registry::{DataStore, StoreRegistry};
pub use source::{DecodedTable, SnapshotSource, TableSource};
pub use storage::Db2Storage;
