//! Per-table loading and the escalation policy applied once all tables ran.
use std::fs::File;
use std::mem::size_of;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use game_core::{Locale, LocaleMask, Record};
use serde::de::DeserializeOwned;

use crate::error::BootstrapError;
use crate::registry::StoreRegistry;
use crate::source::TableSource;
use crate::storage::Db2Storage;

/// Mutable state shared by every table load of one bootstrap run.
#[derive(Clone, Debug)]
pub struct LoadContext {
    /// Locales whose overlays are still attempted. Only ever shrinks.
    available_locales: LocaleMask,
    /// One line per table that failed at the default locale.
    problems: Vec<String>,
    /// Tables that passed the schema check and were attempted.
    attempted: usize,
}

impl LoadContext {
    pub fn new() -> Self {
        Self {
            available_locales: LocaleMask::all(),
            problems: Vec::new(),
            attempted: 0,
        }
    }

    pub fn available_locales(&self) -> LocaleMask {
        self.available_locales
    }

    pub fn problems(&self) -> &[String] {
        &self.problems
    }

    pub fn attempted(&self) -> usize {
        self.attempted
    }

    fn disable_locale(&mut self, locale: Locale) {
        self.available_locales.remove(LocaleMask::of(locale));
    }
}

impl Default for LoadContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Compare the size implied by `T`'s format string with `size_of::<T>()`.
///
/// A mismatch means the compiled record and its descriptor disagree; decoding
/// anything with them would misread every column.
pub fn check_record_layout<T: Record>(file_name: &str) -> Result<(), BootstrapError> {
    let format_size =
        T::SCHEMA
            .record_size()
            .map_err(|source| BootstrapError::InvalidSchema {
                file: file_name.to_string(),
                source,
            })?;
    let record_size = size_of::<T>();

    if format_size != record_size {
        tracing::error!(
            "Size of '{}' set by format string ({}) not equal size of record structure ({}).",
            file_name,
            format_size,
            record_size
        );
        return Err(BootstrapError::SchemaDrift {
            file: file_name.to_string(),
            format_size,
            record_size,
        });
    }

    Ok(())
}

/// Loads tables from one DB2 directory, one at a time, in call order.
///
/// ```text
/// db2_path/
/// ├── Item.db2            default locale
/// ├── deDE/Item.db2       string overlay
/// └── frFR/Item.db2       string overlay
/// ```
///
/// Every [`load`](Self::load) call registers its store, whether or not the
/// file could be read. [`finish`](Self::finish) turns the collected problems
/// into the bootstrap verdict.
pub struct TableLoader<'a, S: TableSource> {
    source: &'a S,
    db2_path: PathBuf,
    default_locale: Locale,
    context: LoadContext,
    registry: StoreRegistry,
}

impl<'a, S: TableSource> TableLoader<'a, S> {
    pub fn new(source: &'a S, db2_path: impl Into<PathBuf>, default_locale: Locale) -> Self {
        Self {
            source,
            db2_path: db2_path.into(),
            default_locale,
            context: LoadContext::new(),
            registry: StoreRegistry::new(),
        }
    }

    pub fn db2_path(&self) -> &Path {
        &self.db2_path
    }

    pub fn context(&self) -> &LoadContext {
        &self.context
    }

    pub fn registry(&self) -> &StoreRegistry {
        &self.registry
    }

    /// Load `file_name` into a fresh store for `T` and register it.
    ///
    /// Only a schema fault is returned as an error; read failures are
    /// recorded in the [`LoadContext`] and leave the returned store empty.
    pub fn load<T>(&mut self, file_name: &str) -> Result<Arc<Db2Storage<T>>, BootstrapError>
    where
        T: Record + DeserializeOwned,
    {
        check_record_layout::<T>(file_name)?;

        self.context.attempted += 1;

        let mut storage = Db2Storage::<T>::new();
        let path = self.db2_path.join(file_name);

        match storage.load(self.source, &path, self.default_locale) {
            Ok(()) => {
                tracing::debug!("Loaded {} ({} records)", path.display(), storage.len());
                self.overlay_locales(&mut storage, file_name);
            }
            Err(err) => {
                tracing::debug!("Failed to load {}: {}", path.display(), err);
                let problem = classify_failure(&path, storage.field_count(), T::SCHEMA.format());
                self.context.problems.push(problem);
            }
        }

        let storage = Arc::new(storage);
        self.registry.register(storage.clone());
        Ok(storage)
    }

    fn overlay_locales<T: Record>(&mut self, storage: &mut Db2Storage<T>, file_name: &str) {
        let default_locale = self.default_locale;
        let pending = self.context.available_locales.locales();

        for locale in pending.filter(|locale| *locale != default_locale) {
            let path = self.db2_path.join(locale.name()).join(file_name);

            if let Err(err) = storage.load_strings_from(self.source, &path, locale) {
                tracing::debug!(
                    "Locale {} unavailable ({}); skipping it for remaining tables",
                    locale,
                    err
                );
                self.context.disable_locale(locale);
            }
        }
    }

    /// Apply the escalation policy and hand back the registry.
    ///
    /// Any table failing at the default locale is fatal. When every attempted
    /// table failed the data directory itself is reported as wrong.
    pub fn finish(self) -> Result<(StoreRegistry, LoadContext), BootstrapError> {
        let attempted = self.context.attempted;
        let missing = self.context.problems.len();

        if missing >= attempted {
            tracing::error!(
                "Incorrect DataDir value or ALL required *.db2 files ({}) not found by path: {}",
                attempted,
                self.db2_path.display()
            );
            return Err(BootstrapError::DataDirMissing {
                path: self.db2_path,
                attempted,
            });
        }

        if missing > 0 {
            tracing::error!(
                "Some required *.db2 files ({} from {}) not found or not compatible:\n{}",
                missing,
                attempted,
                self.context.problems.join("\n")
            );
            return Err(BootstrapError::TablesMissing {
                missing,
                attempted,
                problems: self.context.problems,
            });
        }

        Ok((self.registry, self.context))
    }
}

/// Describe why a default-locale load failed.
///
/// A file that opens but did not decode as this table is reported as a
/// wrong build; a missing or unopenable file is reported as the bare path.
fn classify_failure(path: &Path, declared_fields: usize, format: &str) -> String {
    if path.is_file() && File::open(path).is_ok() {
        format!(
            "{} (exist, but have {} fields instead {}) Wrong client version DB2 file?",
            path.display(),
            declared_fields,
            format.len()
        )
    } else {
        path.display().to_string()
    }
}
