//! First-run setup.
//!
//! Answers come from a [`SetupProvider`] so the flow can run against a
//! terminal ([`DialoguerSetup`]) or scripted answers in tests. Nothing is
//! written until the full configuration has validated against the live
//! note store.

use std::io::ErrorKind;

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Password};

use super::paths::Paths;
use super::settings::{Configuration, ListSet};
use super::validate::{check_list_names, check_num_sets, check_secret, check_username};
use crate::error::MoverError;
use crate::secrets::{Secret, SecretStore};
use crate::snapshot;
use crate::store::{Connector, NoteStore};

/// Source of first-run answers.
#[cfg_attr(test, mockall::automock)]
pub trait SetupProvider {
    /// Account email address.
    fn username(&self) -> Result<String, MoverError>;

    /// Master token.
    fn secret(&self) -> Result<Secret, MoverError>;

    /// How many list sets to configure.
    fn num_sets(&self) -> Result<i64, MoverError>;

    /// Names for list set number `number` (1-based).
    fn list_set(&self, number: usize) -> Result<ListSet, MoverError>;
}

/// Interactive prompts on the terminal.
pub struct DialoguerSetup {
    theme: ColorfulTheme,
}

impl DialoguerSetup {
    #[must_use]
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }

    fn ask(&self, prompt: &str) -> Result<String, MoverError> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .interact_text()
            .map(|s| s.trim().to_string())
            .map_err(prompt_error)
    }
}

impl Default for DialoguerSetup {
    fn default() -> Self {
        Self::new()
    }
}

fn prompt_error(err: dialoguer::Error) -> MoverError {
    match err {
        dialoguer::Error::IO(e) if e.kind() == ErrorKind::Interrupted => {
            MoverError::Interrupted("setup".to_string())
        },
        other => MoverError::Config(format!("Setup prompt failed: {other}")),
    }
}

impl SetupProvider for DialoguerSetup {
    fn username(&self) -> Result<String, MoverError> {
        self.ask("Google Keep username")
    }

    fn secret(&self) -> Result<Secret, MoverError> {
        Password::with_theme(&self.theme)
            .with_prompt("Google Keep master token")
            .interact()
            .map(|s| Secret::new(s.trim()))
            .map_err(prompt_error)
    }

    fn num_sets(&self) -> Result<i64, MoverError> {
        Input::<i64>::with_theme(&self.theme)
            .with_prompt("Number of list sets (one set pairs two lists)")
            .default(1)
            .interact_text()
            .map_err(prompt_error)
    }

    fn list_set(&self, number: usize) -> Result<ListSet, MoverError> {
        let primary = self.ask(&format!("Name of primary list {number}"))?;
        let secondary = self.ask(&format!("Name of low priority list {number}"))?;
        Ok(ListSet::new(primary, secondary))
    }
}

/// Run first-time setup.
///
/// Username and token are checked before anything goes over the network.
/// After the configuration validates against the connected store, the token
/// goes to `secrets`, the config file is written without it, and a first
/// snapshot is saved.
///
/// # Errors
///
/// Returns the first validation, authentication, secret-store or I/O
/// failure. Nothing is persisted on error.
pub async fn build_from_interactive_input<C: Connector>(
    provider: &dyn SetupProvider,
    connector: &C,
    secrets: &dyn SecretStore,
    paths: &Paths,
) -> Result<(Configuration, C::Store), MoverError> {
    let username = provider.username()?.trim().to_string();
    check_username(&username)?;
    let secret = provider.secret()?;
    check_secret(&secret)?;

    let mut store = connector.connect(&username, &secret).await?;
    store.refresh().await?;

    let num_sets = provider.num_sets()?;
    check_num_sets(num_sets)?;

    let mut list_sets = Vec::new();
    for number in 1..=usize::try_from(num_sets).unwrap_or(0) {
        let list_set = provider.list_set(number)?;
        check_list_names(number, &list_set)?;
        list_sets.push(list_set);
    }

    let config = Configuration::new(username, secret, list_sets);
    config.validate(&store)?;

    secrets.set(&config.username, &config.secret)?;
    config.save(&paths.config_file)?;
    tracing::info!(path = %paths.config_file.display(), "configuration written");

    match store.serialize_state() {
        Ok(bytes) => {
            if let Err(e) = snapshot::write(&paths.snapshot_file, &bytes) {
                tracing::warn!(error = %e, "could not write initial snapshot");
            }
        },
        Err(e) => tracing::warn!(error = %e, "could not serialize note store"),
    }

    Ok((config, store))
}
