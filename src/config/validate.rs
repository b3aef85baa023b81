//! Configuration checks.
//!
//! Every check fails fast with a [`ValidationError`] naming the field that
//! failed.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

use super::settings::{Configuration, ListSet};
use crate::error::{ListRole, MoverError, ValidationError};
use crate::secrets::Secret;
use crate::store::NoteStore;

/// Shortest master token accepted. A guess; real tokens are well above it.
pub const MIN_SECRET_LEN: usize = 100;

/// Shortest poll interval accepted, to stay clear of abuse detection.
pub const MIN_POLL_INTERVAL_MS: u64 = 500;

static GOOGLE_ACCOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@(?:gmail|googlemail)\.[A-Za-z]{2,}$")
        .unwrap_or_else(|e| panic!("Invalid account regex: {e}"))
});

/// Check that `username` looks like a Google account address.
///
/// # Errors
///
/// Returns `EmptyUsername` or `InvalidUsername`.
pub fn check_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::EmptyUsername);
    }
    if !GOOGLE_ACCOUNT.is_match(username) {
        return Err(ValidationError::InvalidUsername(username.to_string()));
    }
    Ok(())
}

/// Check that the master token is present and plausibly long.
///
/// # Errors
///
/// Returns `EmptySecret` or `SecretTooShort`.
pub fn check_secret(secret: &Secret) -> Result<(), ValidationError> {
    if secret.is_empty() {
        return Err(ValidationError::EmptySecret);
    }
    if secret.len() < MIN_SECRET_LEN {
        return Err(ValidationError::SecretTooShort {
            len: secret.len(),
            min: MIN_SECRET_LEN,
        });
    }
    Ok(())
}

/// Check the declared set count.
///
/// # Errors
///
/// Returns `NonPositiveSetCount`.
pub const fn check_num_sets(num_sets: i64) -> Result<(), ValidationError> {
    if num_sets < 1 {
        return Err(ValidationError::NonPositiveSetCount(num_sets));
    }
    Ok(())
}

/// Check the poll interval against the rate limit floor.
///
/// # Errors
///
/// Returns `IntervalTooShort`.
pub fn check_interval(interval: Duration) -> Result<(), ValidationError> {
    let ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
    if ms < MIN_POLL_INTERVAL_MS {
        return Err(ValidationError::IntervalTooShort {
            ms,
            min: MIN_POLL_INTERVAL_MS,
        });
    }
    Ok(())
}

/// Check that both names of set number `set` (1-based) are filled in.
///
/// # Errors
///
/// Returns `EmptyListName`.
pub fn check_list_names(set: usize, list_set: &ListSet) -> Result<(), ValidationError> {
    if list_set.primary_list.trim().is_empty() {
        return Err(ValidationError::EmptyListName {
            set,
            role: ListRole::Primary,
        });
    }
    if list_set.secondary_list.trim().is_empty() {
        return Err(ValidationError::EmptyListName {
            set,
            role: ListRole::Secondary,
        });
    }
    Ok(())
}

/// Check that both lists of set number `set` exist in `store`.
///
/// # Errors
///
/// Returns `ListNotFound`.
pub fn check_lists_exist(
    set: usize,
    list_set: &ListSet,
    store: &dyn NoteStore,
) -> Result<(), ValidationError> {
    for (role, name) in [
        (ListRole::Primary, &list_set.primary_list),
        (ListRole::Secondary, &list_set.secondary_list),
    ] {
        if store.find_list_by_name(name).is_none() {
            return Err(ValidationError::ListNotFound {
                set,
                role,
                name: name.clone(),
            });
        }
    }
    Ok(())
}

impl Configuration {
    /// Checks that need no note store: initialization, username, secret,
    /// set count and poll interval.
    ///
    /// # Errors
    ///
    /// Returns the first failed check.
    pub fn validate_local(&self) -> Result<(), MoverError> {
        if !self.is_initialized {
            return Err(ValidationError::NotInitialized.into());
        }
        check_username(&self.username)?;
        check_secret(&self.secret)?;
        check_num_sets(self.num_sets)?;
        if usize::try_from(self.num_sets).ok() != Some(self.list_sets.len()) {
            return Err(ValidationError::SetCountMismatch {
                declared: self.num_sets,
                actual: self.list_sets.len(),
            }
            .into());
        }
        check_interval(self.poll_interval)?;
        Ok(())
    }

    /// Full validation, including resolving every list name in `store`.
    ///
    /// # Errors
    ///
    /// Returns the first failed check.
    pub fn validate(&self, store: &dyn NoteStore) -> Result<(), MoverError> {
        self.validate_local()?;
        for (index, list_set) in self.list_sets.iter().enumerate() {
            let set = index + 1;
            check_list_names(set, list_set)?;
            check_lists_exist(set, list_set, store)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn token() -> Secret {
        Secret::new("x".repeat(MIN_SECRET_LEN))
    }

    fn store_with(titles: &[&str]) -> MemoryStore {
        let mut store = MemoryStore::new();
        for title in titles {
            store.add_list(title);
        }
        store
    }

    #[test]
    fn test_username_shapes() {
        assert!(check_username("someone@gmail.com").is_ok());
        assert!(check_username("first.last+keep@googlemail.co").is_ok());
        assert_eq!(check_username(""), Err(ValidationError::EmptyUsername));
        assert_eq!(
            check_username("someone@example.com"),
            Err(ValidationError::InvalidUsername("someone@example.com".to_string()))
        );
        assert!(check_username("not an email").is_err());
    }

    #[test]
    fn test_secret_length() {
        assert!(check_secret(&token()).is_ok());
        assert_eq!(check_secret(&Secret::default()), Err(ValidationError::EmptySecret));
        assert_eq!(
            check_secret(&Secret::new("short")),
            Err(ValidationError::SecretTooShort { len: 5, min: 100 })
        );
    }

    #[test]
    fn test_num_sets() {
        assert!(check_num_sets(1).is_ok());
        assert_eq!(check_num_sets(0), Err(ValidationError::NonPositiveSetCount(0)));
        assert_eq!(check_num_sets(-3), Err(ValidationError::NonPositiveSetCount(-3)));
    }

    #[test]
    fn test_interval_floor() {
        assert!(check_interval(Duration::from_millis(500)).is_ok());
        assert_eq!(
            check_interval(Duration::from_millis(100)),
            Err(ValidationError::IntervalTooShort { ms: 100, min: 500 })
        );
    }

    #[test]
    fn test_validate_passes_for_existing_lists() {
        let store = store_with(&["Shopping", "Shopping (low priority)"]);
        let config = Configuration::new(
            "someone@gmail.com",
            token(),
            vec![ListSet::new("Shopping", "Shopping (low priority)")],
        );

        assert!(config.validate(&store).is_ok());
    }

    #[test]
    fn test_validate_stops_at_first_bad_set() {
        let store = store_with(&["A", "A low", "C", "C low"]);
        let config = Configuration::new(
            "someone@gmail.com",
            token(),
            vec![
                ListSet::new("A", "A low"),
                ListSet::new("B", "B low"),
                ListSet::new("C", "missing"),
            ],
        );

        let err = config.validate(&store).unwrap_err();

        assert!(matches!(
            err,
            MoverError::Validation(ValidationError::ListNotFound { set: 2, role: ListRole::Primary, ref name })
                if name == "B"
        ));
        // Set 1 resolved both names, set 2 failed on its first lookup.
        assert_eq!(store.lookup_count(), 3);
    }

    #[test]
    fn test_validate_examines_every_set() {
        let store = store_with(&["A", "A low", "B", "B low", "C", "C low"]);
        let config = Configuration::new(
            "someone@gmail.com",
            token(),
            vec![
                ListSet::new("A", "A low"),
                ListSet::new("B", "B low"),
                ListSet::new("C", "C low"),
            ],
        );

        config.validate(&store).unwrap();
        assert_eq!(store.lookup_count(), 6);
    }

    #[test]
    fn test_duplicate_list_titles_fail_validation() {
        let store = store_with(&["Shopping", "Shopping", "Shopping (low priority)"]);
        let config = Configuration::new(
            "someone@gmail.com",
            token(),
            vec![ListSet::new("Shopping", "Shopping (low priority)")],
        );

        let err = config.validate(&store).unwrap_err();
        assert!(matches!(
            err,
            MoverError::Validation(ValidationError::ListNotFound {
                set: 1,
                role: ListRole::Primary,
                ..
            })
        ));
    }

    #[test]
    fn test_empty_list_name() {
        let store = store_with(&["Shopping"]);
        let config = Configuration::new(
            "someone@gmail.com",
            token(),
            vec![ListSet::new("Shopping", "  ")],
        );

        let err = config.validate(&store).unwrap_err();
        assert!(matches!(
            err,
            MoverError::Validation(ValidationError::EmptyListName {
                set: 1,
                role: ListRole::Secondary
            })
        ));
    }

    #[test]
    fn test_set_count_mismatch() {
        let mut config = Configuration::new(
            "someone@gmail.com",
            token(),
            vec![ListSet::new("A", "B")],
        );
        config.num_sets = 2;

        let err = config.validate_local().unwrap_err();
        assert!(matches!(
            err,
            MoverError::Validation(ValidationError::SetCountMismatch { declared: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_uninitialized_config() {
        let mut config = Configuration::new("someone@gmail.com", token(), vec![ListSet::new("A", "B")]);
        config.is_initialized = false;

        assert!(matches!(
            config.validate_local(),
            Err(MoverError::Validation(ValidationError::NotInitialized))
        ));
    }
}
