//! Error types for tickmove.
//!
//! Every failure is a [`MoverError`]. Configuration, validation,
//! authentication and secret-store failures stop the process before the
//! polling loop starts; network failures inside the loop are retried on the
//! next cycle.

use std::fmt;

use thiserror::Error;

/// Exit code for a clean, user-initiated shutdown.
pub const EXIT_OK: i32 = 0;
/// Exit code for an unhandled runtime error during the loop.
pub const EXIT_RUNTIME: i32 = 1;
/// Exit code for setup, credential or validation failures. Distinct from
/// the `2` clap uses for usage errors.
pub const EXIT_SETUP: i32 = 3;

#[derive(Error, Debug)]
pub enum MoverError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Note service error: {0}")]
    Remote(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Interrupted during {0}")]
    Interrupted(String),
}

impl MoverError {
    /// Whether the polling loop should log this error and try again next cycle.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_)
            | Self::Validation(_)
            | Self::Authentication(_)
            | Self::PermissionDenied(_) => EXIT_SETUP,
            Self::Interrupted(_) => EXIT_OK,
            Self::Network(_)
            | Self::Remote(_)
            | Self::NotFound(_)
            | Self::Io(_)
            | Self::Parse(_) => EXIT_RUNTIME,
        }
    }
}

impl From<reqwest::Error> for MoverError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() {
            Self::Network(err.to_string())
        } else if err.is_decode() {
            Self::Remote(format!("unreadable response: {err}"))
        } else {
            Self::Remote(err.to_string())
        }
    }
}

/// Which side of a list set a name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListRole {
    Primary,
    Secondary,
}

impl fmt::Display for ListRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "primary list"),
            Self::Secondary => write!(f, "low priority list"),
        }
    }
}

/// A single failed configuration check.
///
/// Messages name the field and the value that failed. Secrets are only ever
/// described by their length.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("first_run_flag: setup has not completed")]
    NotInitialized,

    #[error("username: value is empty")]
    EmptyUsername,

    #[error("username: {0:?} is not a Google account address")]
    InvalidUsername(String),

    #[error("master_token: value is empty")]
    EmptySecret,

    #[error("master_token: too short, got {len} characters (minimum {min})")]
    SecretTooShort { len: usize, min: usize },

    #[error("num_sets: must be greater than 0, got {0}")]
    NonPositiveSetCount(i64),

    #[error("num_sets: declares {declared} sets but {actual} are configured")]
    SetCountMismatch { declared: i64, actual: usize },

    #[error("poll_interval_ms: {ms} is below the minimum of {min}")]
    IntervalTooShort { ms: u64, min: u64 },

    #[error("list set {set}: {role} name is empty")]
    EmptyListName { set: usize, role: ListRole },

    #[error("list set {set}: {role} {name:?} matches no single list")]
    ListNotFound {
        set: usize,
        role: ListRole,
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_network_errors_are_transient() {
        assert!(MoverError::Network("reset".to_string()).is_transient());
        assert!(!MoverError::Authentication("denied".to_string()).is_transient());
        assert!(!MoverError::Remote("bad".to_string()).is_transient());
        assert!(!MoverError::Validation(ValidationError::EmptyUsername).is_transient());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(MoverError::Config("x".to_string()).exit_code(), EXIT_SETUP);
        assert_eq!(
            MoverError::Validation(ValidationError::EmptySecret).exit_code(),
            EXIT_SETUP
        );
        assert_eq!(
            MoverError::PermissionDenied("x".to_string()).exit_code(),
            EXIT_SETUP
        );
        assert_eq!(MoverError::Network("x".to_string()).exit_code(), EXIT_RUNTIME);
        assert_eq!(MoverError::Remote("x".to_string()).exit_code(), EXIT_RUNTIME);
        assert_eq!(MoverError::Interrupted("setup".to_string()).exit_code(), EXIT_OK);
        assert_ne!(EXIT_SETUP, 2);
    }

    #[test]
    fn test_secret_length_message_hides_value() {
        let err = ValidationError::SecretTooShort { len: 12, min: 100 };
        assert_eq!(
            err.to_string(),
            "master_token: too short, got 12 characters (minimum 100)"
        );
    }

    #[test]
    fn test_list_not_found_names_field_and_value() {
        let err = ValidationError::ListNotFound {
            set: 2,
            role: ListRole::Secondary,
            name: "Groceries".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "list set 2: low priority list \"Groceries\" matches no single list"
        );
    }
}
