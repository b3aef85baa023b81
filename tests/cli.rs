use assert_cmd::Command;
use predicates::prelude::predicate;
use tempfile::TempDir;

fn tickmove() -> Command {
    let mut cmd = Command::cargo_bin("tickmove").unwrap();
    cmd.env_remove("TICKMOVE_CONFIG").env_remove("RUST_LOG");
    cmd
}

fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.json");
    std::fs::write(&path, contents).unwrap();
    path
}

mod help_and_version {
    use super::*;

    #[test]
    fn test_help_flag() {
        tickmove()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Usage:"))
            .stdout(predicate::str::contains("--once"));
    }

    #[test]
    fn test_version_flag() {
        tickmove()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("tickmove"));
    }

    #[test]
    fn test_unknown_flag_is_a_usage_error() {
        tickmove()
            .arg("--frobnicate")
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Usage:"));
    }
}

mod config_errors {
    use super::*;

    #[test]
    fn test_missing_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nowhere.json");

        tickmove()
            .arg("-c")
            .arg(&path)
            .assert()
            .code(3)
            .stderr(predicate::str::contains("nowhere.json"));
    }

    #[test]
    fn test_corrupted_first_run_flag() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(
            &temp_dir,
            r#"{
                "first_run_flag": "False",
                "username": "someone@gmail.com",
                "master_token": "",
                "num_sets": 1,
                "list_sets": [{"primary_list": "A", "secondary_list": "B"}]
            }"#,
        );

        tickmove()
            .arg("-c")
            .arg(&path)
            .assert()
            .code(3)
            .stderr(predicate::str::contains("may be corrupted"));
    }

    #[test]
    fn test_token_in_config_file_is_refused() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(
            &temp_dir,
            r#"{
                "first_run_flag": "True",
                "username": "someone@gmail.com",
                "master_token": "aas_et/secret",
                "num_sets": 1,
                "list_sets": [{"primary_list": "A", "secondary_list": "B"}]
            }"#,
        );

        tickmove()
            .arg("-c")
            .arg(&path)
            .assert()
            .code(3)
            .stderr(predicate::str::contains("keyring"));
    }

    #[test]
    fn test_config_from_environment() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, "not json");

        tickmove()
            .env("TICKMOVE_CONFIG", &path)
            .assert()
            .code(3)
            .stderr(predicate::str::contains("Failed to parse config file"));
    }

    #[test]
    fn test_flat_legacy_layout_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(
            &temp_dir,
            r#"{
                "first_run_flag": "True",
                "username": "someone@gmail.com",
                "master_token": "",
                "num_sets": 1,
                "primary_list_1": "A",
                "secondary_list_1": "B"
            }"#,
        );

        tickmove()
            .arg("-c")
            .arg(&path)
            .assert()
            .code(3)
            .stderr(predicate::str::contains("Failed to parse config file"));
    }

    #[test]
    fn test_short_interval_rejected_before_reading_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nowhere.json");

        tickmove()
            .arg("-c")
            .arg(&path)
            .args(["--interval-ms", "100"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("poll_interval_ms"));
    }
}
