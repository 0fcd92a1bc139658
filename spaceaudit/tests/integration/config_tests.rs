use crate::common::{TestHome, assert_contains, assert_failed, init_test_logging};

#[test]
fn test_missing_config_file() {
    init_test_logging();
    crate::test_log!("TEST START: test_missing_config_file");

    let home = TestHome::new();
    let missing = home.path().join("absent.toml");
    let output = home.run(&["--config", missing.to_str().unwrap()]);

    assert_failed(&output);
    assert_contains(
        &String::from_utf8_lossy(&output.stderr),
        "Configuration file not found",
    );

    crate::test_log!("TEST PASS: test_missing_config_file");
}

#[test]
fn test_unparseable_config_file() {
    init_test_logging();
    let home = TestHome::new();
    let path = home.write_config("[fetch\nsecure_timeout_secs = ");
    let output = home.run(&["--config", path.to_str().unwrap()]);

    assert_failed(&output);
    assert_contains(
        &String::from_utf8_lossy(&output.stderr),
        "Failed to parse configuration file",
    );
}

#[test]
fn test_invalid_values_are_rejected() {
    init_test_logging();
    crate::test_log!("TEST START: test_invalid_values_are_rejected");

    let home = TestHome::new();
    let path = home.write_config(
        r#"
[validation]
staleness_months = 0

[notify]
sender = "not-an-address"
"#,
    );
    let output = home.run(&["--config", path.to_str().unwrap(), "--dry-run"]);

    assert_failed(&output);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_contains(&stderr, "validation.staleness_months");
    assert_contains(&stderr, "notify.sender");
    assert_contains(&stderr, "invalid configuration");
    // Validation happens before any network access or run output.
    assert!(output.stdout.is_empty());

    crate::test_log!("TEST PASS: test_invalid_values_are_rejected");
}

#[test]
fn test_cli_directory_url_is_validated() {
    init_test_logging();
    let home = TestHome::new();
    let output = home.run(&["--dry-run", "--directory-url", "ftp://dir.example/list.json"]);

    assert_failed(&output);
    assert_contains(&String::from_utf8_lossy(&output.stderr), "directory.url");
}

#[test]
fn test_bad_env_override_is_ignored_with_warning() {
    init_test_logging();
    let home = TestHome::new();
    let output = home
        .command()
        .env("SPACEAUDIT_STALENESS_MONTHS", "soon")
        .args(["--dry-run", "--directory-url", "http://127.0.0.1:9/directory.json"])
        .output()
        .expect("run spaceaudit");

    // The override is dropped and the run proceeds to the directory fetch.
    assert_eq!(output.status.code(), Some(1));
    assert_contains(&String::from_utf8_lossy(&output.stderr), "SPACEAUDIT_STALENESS_MONTHS");
    assert_contains(&String::from_utf8_lossy(&output.stdout), "not available");
}
