use crate::common::{TestHome, assert_contains, assert_failed, init_test_logging};

#[test]
fn test_help_describes_tool() {
    init_test_logging();
    crate::test_log!("TEST START: test_help_describes_tool");

    let home = TestHome::new();
    let output = home.run(&["--help"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_contains(&stdout, "SpaceAPI");
    assert_contains(&stdout, "--dry-run");
    assert_contains(&stdout, "--directory-url");

    crate::test_log!("TEST PASS: test_help_describes_tool");
}

#[test]
fn test_version_flag() {
    init_test_logging();
    let home = TestHome::new();
    let output = home.run(&["--version"]);
    assert!(output.status.success());
    assert_contains(&String::from_utf8_lossy(&output.stdout), env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_unreachable_directory_aborts_run() {
    init_test_logging();
    crate::test_log!("TEST START: test_unreachable_directory_aborts_run");

    let home = TestHome::new();
    // Port 9 (discard) is closed on test hosts, so the connect is refused at once.
    let output = home.run(&[
        "--dry-run",
        "--directory-url",
        "http://127.0.0.1:9/directory.json",
    ]);
    assert_failed(&output);
    assert_eq!(output.status.code(), Some(1));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_contains(&stdout, "## Validate Space api json file");
    assert_contains(&stdout, "Space api directory http://127.0.0.1:9/directory.json not available");
    assert!(!stdout.contains("Checked "), "summary printed after abort: {stdout}");

    crate::test_log!("TEST PASS: test_unreachable_directory_aborts_run");
}

#[test]
fn test_unknown_flag_is_rejected() {
    init_test_logging();
    let home = TestHome::new();
    let output = home.run(&["--no-such-flag"]);
    assert_failed(&output);
    assert_contains(&String::from_utf8_lossy(&output.stderr), "--no-such-flag");
}
