//! Path resolution for tickmove's files.
//!
//! By default both files live in the working directory:
//! - `config.json` - list sets and account name
//! - `keep_notes.json` - snapshot of the note store
//!
//! With `--config` the snapshot moves next to the chosen config file unless
//! `--snapshot` says otherwise.

use std::path::{Path, PathBuf};

use crate::error::MoverError;

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const SNAPSHOT_FILE_NAME: &str = "keep_notes.json";

/// Files tickmove reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    /// Config file: `<root>/config.json` unless overridden.
    pub config_file: PathBuf,
    /// Snapshot file: `<root>/keep_notes.json` unless overridden.
    pub snapshot_file: PathBuf,
    /// Whether the config path was given explicitly.
    pub explicit_config: bool,
}

impl Paths {
    /// Default paths in the current working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory cannot be determined.
    pub fn new() -> Result<Self, MoverError> {
        let cwd = std::env::current_dir().map_err(|e| {
            MoverError::Config(format!("Could not determine working directory: {e}"))
        })?;
        Ok(Self::with_root(&cwd))
    }

    /// Default file names under `root` (useful for testing).
    #[must_use]
    pub fn with_root(root: &Path) -> Self {
        Self {
            config_file: root.join(CONFIG_FILE_NAME),
            snapshot_file: root.join(SNAPSHOT_FILE_NAME),
            explicit_config: false,
        }
    }

    /// Resolve paths from the command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if no override is given and the working directory
    /// cannot be determined.
    pub fn resolve(config: Option<&Path>, snapshot: Option<&Path>) -> Result<Self, MoverError> {
        let mut paths = match config {
            Some(file) => {
                let dir = file
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or_else(|| Path::new("."));
                Self {
                    config_file: file.to_path_buf(),
                    snapshot_file: dir.join(SNAPSHOT_FILE_NAME),
                    explicit_config: true,
                }
            },
            None => Self::new()?,
        };

        if let Some(file) = snapshot {
            paths.snapshot_file = file.to_path_buf();
        }
        Ok(paths)
    }

    /// First run means there is no config file at the default location yet.
    #[must_use]
    pub fn is_first_run(&self) -> bool {
        !self.explicit_config && !self.config_file.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths_with_root() {
        let root = PathBuf::from("/tmp/test-tickmove");
        let paths = Paths::with_root(&root);

        assert_eq!(paths.config_file, root.join("config.json"));
        assert_eq!(paths.snapshot_file, root.join("keep_notes.json"));
        assert!(!paths.explicit_config);
    }

    #[test]
    fn test_snapshot_follows_explicit_config() {
        let paths = Paths::resolve(Some(Path::new("/etc/tickmove/home.json")), None).unwrap();

        assert_eq!(paths.config_file, PathBuf::from("/etc/tickmove/home.json"));
        assert_eq!(paths.snapshot_file, PathBuf::from("/etc/tickmove/keep_notes.json"));
        assert!(paths.explicit_config);
    }

    #[test]
    fn test_bare_config_file_name() {
        let paths = Paths::resolve(Some(Path::new("home.json")), None).unwrap();
        assert_eq!(paths.snapshot_file, PathBuf::from("./keep_notes.json"));
    }

    #[test]
    fn test_snapshot_override() {
        let paths = Paths::resolve(
            Some(Path::new("/etc/tickmove/home.json")),
            Some(Path::new("/var/cache/notes.json")),
        )
        .unwrap();
        assert_eq!(paths.snapshot_file, PathBuf::from("/var/cache/notes.json"));
    }

    #[test]
    fn test_first_run_detection() {
        let temp_dir = TempDir::new().unwrap();
        let paths = Paths::with_root(temp_dir.path());
        assert!(paths.is_first_run());

        std::fs::write(&paths.config_file, "{}").unwrap();
        assert!(!paths.is_first_run());
    }

    #[test]
    fn test_explicit_config_is_never_first_run() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.json");
        let paths = Paths::resolve(Some(&missing), None).unwrap();
        assert!(!paths.is_first_run());
    }
}
