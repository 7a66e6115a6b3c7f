//! Connection parameters and the INI loader
//!
//! Parameters are read once at startup from a named section of an INI file
//! (the `[mysql]` section of `config.ini` by default). Environment variables
//! of the form `CONNBENCH_<SECTION>__<KEY>` override file values.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use tracing::debug;

use crate::error::{BenchError, BenchResult};

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "config.ini";

/// Default section holding the database credentials
pub const DEFAULT_SECTION: &str = "mysql";

/// Default MySQL port
pub const DEFAULT_PORT: u16 = 3306;

/// Default upper bound on pooled connections
pub const DEFAULT_MAX_SIZE: usize = 10;

const ENV_PREFIX: &str = "CONNBENCH";

const REQUIRED_KEYS: [&str; 4] = ["host", "user", "password", "database"];

/// Immutable key/value mapping of database connection settings
///
/// Recognised keys are `host`, `port`, `user`, `password`, `database`
/// (or its alias `db`), `max_size`, and `charset`. Unknown keys are kept
/// and can be read with [`ConnectionParameters::get`].
#[derive(Clone, PartialEq, Eq, Default)]
pub struct ConnectionParameters {
    values: BTreeMap<String, String>,
}

impl ConnectionParameters {
    /// Loads the named section of an INI file
    ///
    /// # Errors
    ///
    /// Returns `BenchError::Configuration` if the file cannot be read or
    /// the section is absent.
    pub fn load(path: impl AsRef<Path>, section: &str) -> BenchResult<Self> {
        let path = path.as_ref();
        let file_name = path.display().to_string();

        if !path.is_file() {
            return Err(BenchError::configuration(format!(
                "Configuration file {} not found",
                file_name
            )));
        }

        let settings = Config::builder()
            .add_source(File::new(&file_name, FileFormat::Ini).required(true))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let table = settings.get_table(section).map_err(|_| {
            BenchError::configuration(format!(
                "Section {} not found in the {} file",
                section, file_name
            ))
        })?;

        let mut values = BTreeMap::new();
        for (key, value) in table {
            let value = value.into_string().map_err(|e| {
                BenchError::configuration_with(format!("Invalid value for key '{}'", key), e)
            })?;
            values.insert(key.to_lowercase(), value);
        }

        debug!(file = %file_name, section, keys = values.len(), "Loaded connection parameters");
        Ok(Self { values })
    }

    /// Returns a copy with one key replaced
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Returns the raw value of a key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Iterates over all keys and values in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn host(&self) -> BenchResult<&str> {
        self.required("host")
    }

    pub fn user(&self) -> BenchResult<&str> {
        self.required("user")
    }

    pub fn password(&self) -> BenchResult<&str> {
        self.required("password")
    }

    /// Database name, read from `database` or its alias `db`
    pub fn database(&self) -> BenchResult<&str> {
        self.get("database")
            .or_else(|| self.get("db"))
            .ok_or_else(|| BenchError::configuration("Missing required key 'database'"))
    }

    pub fn charset(&self) -> Option<&str> {
        self.get("charset")
    }

    /// Server port, defaulting to 3306
    pub fn port(&self) -> BenchResult<u16> {
        match self.get("port") {
            None => Ok(DEFAULT_PORT),
            Some(raw) => raw.trim().parse().map_err(|e| {
                BenchError::configuration_with(format!("Invalid port '{}'", raw), e)
            }),
        }
    }

    /// Pool size limit, defaulting to 10; must be positive
    pub fn max_size(&self) -> BenchResult<usize> {
        let size = match self.get("max_size") {
            None => DEFAULT_MAX_SIZE,
            Some(raw) => raw.trim().parse().map_err(|e| {
                BenchError::configuration_with(format!("Invalid max_size '{}'", raw), e)
            })?,
        };

        if size == 0 {
            return Err(BenchError::configuration("max_size must be at least 1"));
        }
        Ok(size)
    }

    /// Checks that every required key is present and typed keys parse
    pub fn validate(&self) -> BenchResult<()> {
        for key in REQUIRED_KEYS {
            if key == "database" {
                self.database()?;
            } else {
                self.required(key)?;
            }
        }
        self.port()?;
        self.max_size()?;
        Ok(())
    }

    fn required(&self, key: &str) -> BenchResult<&str> {
        self.get(key)
            .ok_or_else(|| BenchError::configuration(format!("Missing required key '{}'", key)))
    }
}

impl<K, V> FromIterator<(K, V)> for ConnectionParameters
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into().to_lowercase(), v.into()))
                .collect(),
        }
    }
}

// Keeps the password out of logs.
impl fmt::Debug for ConnectionParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (key, value) in self.iter() {
            if key == "password" {
                map.entry(&key, &"***");
            } else {
                map.entry(&key, &value);
            }
        }
        map.finish()
    }
}
