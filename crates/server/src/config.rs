//! World server configuration: an optional TOML file plus environment
//! overrides.
use std::env;
use std::path::{Path, PathBuf};

use game_content::BootstrapConfig;
use game_core::Locale;
use serde::Deserialize;

/// Config file read when `WORLDSERVER_CONFIG` is not set.
pub const DEFAULT_CONFIG_FILE: &str = "worldserver.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown locale '{value}' (expected a name like enUS or an id 0-10)")]
    Locale { value: String },

    #[error("invalid value '{value}' for {key}")]
    Invalid { key: &'static str, value: String },
}

/// Settings the world server needs before it can load game data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    /// Data directory root; DB2 files live under `<data_dir>/dbc/`.
    pub data_dir: PathBuf,
    /// Locale of the files directly under `dbc/`.
    pub default_locale: Locale,
    /// Directory for the log file. Enables file logging when set.
    pub log_dir: Option<PathBuf>,
    /// Write a log file even without `log_dir`, into the platform cache dir.
    pub log_to_file: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./"),
            default_locale: Locale::EnUs,
            log_dir: None,
            log_to_file: false,
        }
    }
}

/// On-disk shape of the config file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    locale: Option<LocaleSetting>,
    log_dir: Option<PathBuf>,
    log_to_file: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LocaleSetting {
    Id(u8),
    Name(String),
}

impl ServerConfig {
    /// Build the configuration from the process environment.
    ///
    /// Environment variables:
    /// - `WORLDSERVER_CONFIG` - Config file path (default: `worldserver.toml`, if present)
    /// - `DATA_DIR` - Data directory root (default: `./`)
    /// - `DBC_LOCALE` - Default locale, by name or id (default: `enUS`)
    /// - `LOG_DIR` - Log file directory (default: no log file)
    /// - `LOG_TO_FILE` - Log to the platform cache dir when `LOG_DIR` is unset
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match env::var_os("WORLDSERVER_CONFIG") {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.is_file() {
                    Self::from_file(path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Parse TOML config text; `origin` only labels errors.
    pub fn parse(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;

        let mut config = Self::default();
        if let Some(data_dir) = file.data_dir {
            config.data_dir = data_dir;
        }
        match file.locale {
            Some(LocaleSetting::Name(name)) => config.default_locale = parse_locale(&name)?,
            Some(LocaleSetting::Id(id)) => {
                config.default_locale = Locale::from_id(id).ok_or_else(|| ConfigError::Locale {
                    value: id.to_string(),
                })?;
            }
            None => {}
        }
        config.log_dir = file.log_dir;
        config.log_to_file = file.log_to_file.unwrap_or(false);
        Ok(config)
    }

    /// Override fields from `lookup`, which maps a variable name to its value.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(data_dir) = lookup("DATA_DIR").filter(|value| !value.is_empty()) {
            self.data_dir = PathBuf::from(data_dir);
        }

        if let Some(locale) = lookup("DBC_LOCALE").filter(|value| !value.is_empty()) {
            self.default_locale = parse_locale(&locale)?;
        }

        if let Some(log_dir) = lookup("LOG_DIR").filter(|value| !value.is_empty()) {
            self.log_dir = Some(PathBuf::from(log_dir));
        }

        if let Some(value) = lookup("LOG_TO_FILE") {
            self.log_to_file = parse_flag(&value).ok_or(ConfigError::Invalid {
                key: "LOG_TO_FILE",
                value,
            })?;
        }

        Ok(())
    }

    /// Directory the log file goes to, if file logging is enabled.
    pub fn log_path(&self) -> Option<PathBuf> {
        match &self.log_dir {
            Some(dir) => Some(dir.clone()),
            None if self.log_to_file => Some(crate::logging::default_log_dir()),
            None => None,
        }
    }

    pub fn bootstrap(&self) -> BootstrapConfig {
        BootstrapConfig::new(self.data_dir.clone(), self.default_locale)
    }
}

/// Parse a locale given by name (`deDE`, any case) or numeric client id.
pub fn parse_locale(value: &str) -> Result<Locale, ConfigError> {
    let value = value.trim();
    let parsed = match value.parse::<u8>() {
        Ok(id) => Locale::from_id(id),
        Err(_) => value.parse::<Locale>().ok(),
    };

    parsed.ok_or_else(|| ConfigError::Locale {
        value: value.to_string(),
    })
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
