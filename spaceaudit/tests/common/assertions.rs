use std::process::Output;

pub fn assert_contains(haystack: &str, needle: &str) {
    assert!(
        haystack.contains(needle),
        "Expected to find '{needle}' in output, got: {haystack}"
    );
}

pub fn assert_failed(output: &Output) {
    assert!(
        !output.status.success(),
        "Expected failure, got {} with stdout: {}",
        output.status,
        String::from_utf8_lossy(&output.stdout)
    );
}
