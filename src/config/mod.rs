//! Configuration management for tickmove.
//!
//! This module handles `config.json`, its validation, and first-run setup.

mod paths;
pub mod settings;
pub mod setup;
pub mod validate;

pub use paths::{Paths, CONFIG_FILE_NAME, SNAPSHOT_FILE_NAME};
pub use settings::{ConfigFile, Configuration, ListSet, DEFAULT_POLL_INTERVAL_MS, INITIALIZED_SENTINEL};
pub use setup::{build_from_interactive_input, DialoguerSetup, SetupProvider};
pub use validate::{MIN_POLL_INTERVAL_MS, MIN_SECRET_LEN};
