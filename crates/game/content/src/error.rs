//! Error types raised while reading tables and bootstrapping the data stores.
use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to read a single table or string overlay file.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not a DB2 table snapshot", .path.display())]
    BadMagic { path: PathBuf },

    #[error("{} declares {found} fields, expected {expected}", .path.display())]
    FieldCount {
        path: PathBuf,
        found: usize,
        expected: usize,
    },

    #[error("{} belongs to table {found:#010x}, expected {expected:#010x}", .path.display())]
    TableHash {
        path: PathBuf,
        declared_fields: usize,
        found: u32,
        expected: u32,
    },

    #[error("failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        /// Header field count, when the failure came after the header.
        declared_fields: Option<usize>,
        #[source]
        source: bincode::Error,
    },

    #[error("failed to encode {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },

    #[error("{} holds {found} records, header declares {expected}", .path.display())]
    RecordCount {
        path: PathBuf,
        declared_fields: usize,
        found: usize,
        expected: usize,
    },

    #[error("{} holds {found} strings, expected {expected}", .path.display())]
    StringCount {
        path: PathBuf,
        declared_fields: Option<usize>,
        found: usize,
        expected: usize,
    },

    #[error("table '{table}' is already loaded")]
    AlreadyLoaded { table: &'static str },

    #[error("table '{table}' must be loaded before overlaying strings")]
    NotLoaded { table: &'static str },
}

impl TableError {
    /// Field count read from the file header, if the header was readable.
    pub fn declared_fields(&self) -> Option<usize> {
        match self {
            Self::FieldCount { found, .. } => Some(*found),
            Self::TableHash {
                declared_fields, ..
            }
            | Self::RecordCount {
                declared_fields, ..
            } => Some(*declared_fields),
            Self::Decode {
                declared_fields, ..
            }
            | Self::StringCount {
                declared_fields, ..
            } => *declared_fields,
            _ => None,
        }
    }
}

/// A version-critical record that was not found after loading.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MissingSentinel {
    pub table: &'static str,
    pub id: u32,
}

impl fmt::Display for MissingSentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.table, self.id)
    }
}

/// Fatal bootstrap outcomes. None of these allow the server to start.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(
        "size of '{file}' set by format string ({format_size}) not equal size of record structure ({record_size})"
    )]
    SchemaDrift {
        file: String,
        format_size: usize,
        record_size: usize,
    },

    #[error("format string of '{file}' is invalid: {source}")]
    InvalidSchema {
        file: String,
        #[source]
        source: game_core::SchemaError,
    },

    #[error(
        "incorrect DataDir value or ALL required *.db2 files ({attempted}) not found by path: {}",
        .path.display()
    )]
    DataDirMissing { path: PathBuf, attempted: usize },

    #[error(
        "some required *.db2 files ({missing} from {attempted}) not found or not compatible:\n{}",
        .problems.join("\n")
    )]
    TablesMissing {
        missing: usize,
        attempted: usize,
        problems: Vec<String>,
    },

    #[error(
        "wrong DB2 data version (missing {}); please extract correct db2 files from client {build}",
        join_sentinels(.missing)
    )]
    WrongDataVersion {
        missing: Vec<MissingSentinel>,
        build: &'static str,
    },
}

impl BootstrapError {
    /// Process exit status for this failure.
    ///
    /// Schema faults are build defects (`EX_SOFTWARE`); everything else is a
    /// data problem the operator must fix.
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::SchemaDrift { .. } | Self::InvalidSchema { .. } => 70,
            Self::DataDirMissing { .. }
            | Self::TablesMissing { .. }
            | Self::WrongDataVersion { .. } => 1,
        }
    }
}

fn join_sentinels(missing: &[MissingSentinel]) -> String {
    missing
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
