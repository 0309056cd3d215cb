//! Compiled DB2 record layouts shared by the server and offline tools.
//!
//! `game-core` defines the record structs, their schema descriptors, and the
//! client locale list. It performs no I/O: loading tables from disk is the job
//! of `game-content`, which checks every [`Schema`] against the compiled
//! record size before decoding a file.
pub mod locale;
pub mod records;
pub mod schema;

pub use locale::{Locale, LocaleMask};
pub use records::{
    BroadcastTextEntry, ItemCurrencyCostEntry, ItemEntry, ItemExtendedCostEntry,
    ItemSparseEntry, KeyChainEntry, QuestPackageItemEntry, SpellReagentsEntry,
};
pub use schema::{FieldType, Record, Schema, SchemaError, StrRef};
