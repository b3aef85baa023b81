//! Configuration for tickmove.
//!
//! Settings are loaded from `config.json`. The master token is not part of
//! the file; it is fetched from the [`SecretStore`] on every load.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::MoverError;
use crate::secrets::{Secret, SecretStore};

/// Value of `first_run_flag` once setup has completed.
pub const INITIALIZED_SENTINEL: &str = "True";

/// Default delay between polling cycles.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// One primary/low priority pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSet {
    /// Title of the list ticked items are moved to.
    pub primary_list: String,
    /// Title of the low priority list ticked items are taken from.
    pub secondary_list: String,
}

impl ListSet {
    #[must_use]
    pub fn new(primary_list: impl Into<String>, secondary_list: impl Into<String>) -> Self {
        Self {
            primary_list: primary_list.into(),
            secondary_list: secondary_list.into(),
        }
    }
}

/// `config.json` as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub first_run_flag: String,
    pub username: String,
    /// Always empty on disk.
    #[serde(default)]
    pub master_token: String,
    pub num_sets: i64,
    pub list_sets: Vec<ListSet>,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default)]
    pub purge_primary_checked: bool,
}

const fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

/// Everything needed to run the sync loop.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub username: String,
    pub secret: Secret,
    pub num_sets: i64,
    pub list_sets: Vec<ListSet>,
    pub is_initialized: bool,
    pub poll_interval: Duration,
    /// Also delete ticked items from primary lists each cycle.
    pub purge_primary_checked: bool,
}

impl Configuration {
    /// Build a configuration for a freshly completed setup.
    #[must_use]
    pub fn new(username: impl Into<String>, secret: Secret, list_sets: Vec<ListSet>) -> Self {
        Self {
            username: username.into(),
            secret,
            num_sets: i64::try_from(list_sets.len()).unwrap_or(i64::MAX),
            list_sets,
            is_initialized: true,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            purge_primary_checked: false,
        }
    }

    /// Load configuration from `path` and fetch the secret for its user.
    ///
    /// The file is checked before the secret store is consulted.
    ///
    /// # Errors
    ///
    /// Returns `MoverError::Config` naming the file if it is missing,
    /// unparsable, not marked initialized or carries a token, and whatever
    /// the secret store reports if the token cannot be fetched.
    pub fn load(path: &Path, secrets: &dyn SecretStore) -> Result<Self, MoverError> {
        let file = Self::read_file(path)?;
        let secret = secrets.get(&file.username)?;
        Ok(Self::from_file(file, secret))
    }

    /// Read and sanity-check `config.json` without touching the secret store.
    ///
    /// # Errors
    ///
    /// See [`Configuration::load`].
    pub fn read_file(path: &Path) -> Result<ConfigFile, MoverError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            MoverError::Config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        let file: ConfigFile = serde_json::from_str(&contents).map_err(|e| {
            MoverError::Config(format!(
                "Failed to parse config file {}: {e}",
                path.display()
            ))
        })?;

        if file.first_run_flag != INITIALIZED_SENTINEL {
            return Err(MoverError::Config(format!(
                "{} may be corrupted: first_run_flag is {:?}",
                path.display(),
                file.first_run_flag
            )));
        }

        if !file.master_token.is_empty() {
            return Err(MoverError::Config(format!(
                "{} contains a master_token; tokens belong in the system keyring",
                path.display()
            )));
        }

        Ok(file)
    }

    fn from_file(file: ConfigFile, secret: Secret) -> Self {
        Self {
            username: file.username,
            secret,
            num_sets: file.num_sets,
            list_sets: file.list_sets,
            is_initialized: file.first_run_flag == INITIALIZED_SENTINEL,
            poll_interval: Duration::from_millis(file.poll_interval_ms),
            purge_primary_checked: file.purge_primary_checked,
        }
    }

    /// On-disk form. The secret is left out.
    #[must_use]
    pub fn to_file(&self) -> ConfigFile {
        ConfigFile {
            first_run_flag: if self.is_initialized {
                INITIALIZED_SENTINEL.to_string()
            } else {
                String::new()
            },
            username: self.username.clone(),
            master_token: String::new(),
            num_sets: self.num_sets,
            list_sets: self.list_sets.clone(),
            poll_interval_ms: u64::try_from(self.poll_interval.as_millis()).unwrap_or(u64::MAX),
            purge_primary_checked: self.purge_primary_checked,
        }
    }

    /// Save configuration to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), MoverError> {
        let contents = serde_json::to_string_pretty(&self.to_file())
            .map_err(|e| MoverError::Config(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, contents).map_err(|e| {
            MoverError::Config(format!(
                "Failed to write config file {}: {e}",
                path.display()
            ))
        })
    }
}
