//! Master token handling.
//!
//! The token never goes into `config.json`. It is kept in the OS keyring
//! under a fixed service name, keyed by the account username, and fetched
//! again on every start.

use std::fmt;

use crate::error::MoverError;

/// Keyring service name the master token is stored under.
pub const KEYRING_SERVICE: &str = "Google Keep Master Token";

/// A secret string that never prints its contents.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Secret(String);

impl Secret {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The plaintext value. Only the note service adapter and the keyring
    /// should need this.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Length in characters, for validation messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret(<{} chars>)", self.len())
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("********")
    }
}

/// Where the master token lives between runs.
#[cfg_attr(test, mockall::automock)]
pub trait SecretStore {
    /// Fetch the secret stored for `username`.
    ///
    /// # Errors
    ///
    /// Returns `MoverError::Config` if nothing is stored and
    /// `MoverError::PermissionDenied` if the store refuses access.
    fn get(&self, username: &str) -> Result<Secret, MoverError>;

    /// Store `secret` for `username`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `MoverError::PermissionDenied` if the store refuses access.
    fn set(&self, username: &str, secret: &Secret) -> Result<(), MoverError>;
}

/// [`SecretStore`] backed by the platform keyring.
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_service(KEYRING_SERVICE)
    }

    #[must_use]
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, username: &str) -> Result<keyring::Entry, MoverError> {
        keyring::Entry::new(&self.service, username).map_err(|e| keyring_error(username, e))
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretStore for KeyringStore {
    fn get(&self, username: &str) -> Result<Secret, MoverError> {
        let password = self
            .entry(username)?
            .get_password()
            .map_err(|e| keyring_error(username, e))?;
        Ok(Secret::new(password))
    }

    fn set(&self, username: &str, secret: &Secret) -> Result<(), MoverError> {
        self.entry(username)?
            .set_password(secret.expose())
            .map_err(|e| keyring_error(username, e))
    }
}

fn keyring_error(username: &str, err: keyring::Error) -> MoverError {
    match err {
        keyring::Error::NoEntry => MoverError::Config(format!(
            "No master token stored in the keyring for {username}; delete config.json to run setup again"
        )),
        keyring::Error::NoStorageAccess(e) => {
            MoverError::PermissionDenied(format!("keyring access for {username}: {e}"))
        },
        keyring::Error::PlatformFailure(e) => {
            MoverError::PermissionDenied(format!("keyring unavailable for {username}: {e}"))
        },
        other => MoverError::Config(format!("keyring entry for {username}: {other}")),
    }
}
