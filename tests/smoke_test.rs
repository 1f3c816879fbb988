/// Smoke tests to verify the binary runs without panicking
use std::fs;
use std::process::{Command, Output};

fn gridpoint(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gridpoint"))
        .args(args)
        .env_remove("GRIDPOINT_LOG")
        .output()
        .expect("Failed to execute gridpoint")
}

#[test]
fn binary_shows_help() {
    let output = gridpoint(&["--help"]);

    assert!(
        output.status.success(),
        "Binary failed to run --help: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("gridpoint"),
        "Help output should mention gridpoint"
    );
    assert!(stdout.contains("monitors"));
    assert!(stdout.contains("bind"));
}

#[test]
fn binary_shows_version() {
    let output = gridpoint(&["--version"]);

    assert!(
        output.status.success(),
        "Binary failed to run --version: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn invalid_subcommand_fails_gracefully() {
    let output = gridpoint(&["nonexistent-command"]);

    // Should fail with error, not panic
    assert!(
        !output.status.success(),
        "Invalid subcommand should return error status"
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        !stderr.contains("panicked at"),
        "Invalid subcommand should not cause panic"
    );
}

#[test]
fn keys_prints_default_layout() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let output = gridpoint(&["--config", config.to_str().unwrap(), "keys"]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Activation: ctrl+alt"));
    assert!(stdout.contains("Select:     enter"));
    assert!(!config.exists(), "keys must not write settings");
}

#[test]
fn bind_persists_and_displaces() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("nested").join("config.toml");
    let path = config.to_str().unwrap();

    let output = gridpoint(&["--config", path, "bind", "w", "0", "0"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("q is no longer bound"));

    let saved = fs::read_to_string(&config).unwrap();
    assert!(saved.contains("\"w\""));
    assert!(!saved.contains("\"q\""));
}

#[test]
fn bind_rejects_cell_outside_grid() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let output = gridpoint(&["--config", config.to_str().unwrap(), "bind", "q", "3", "0"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("outside the 3x3 grid"));
    assert!(!stderr.contains("panicked at"));
    assert!(!config.exists());
}

#[test]
fn bind_refuses_confirm_and_back_keys() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    for key in ["enter", "esc"] {
        let output = gridpoint(&["--config", config.to_str().unwrap(), "bind", key, "1", "1"]);
        assert!(!output.status.success(), "binding {} should fail", key);
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("cannot be bound to a grid cell"));
        assert!(!config.exists());
    }
}

#[test]
fn zero_size_monitor_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    fs::write(&config, "[[monitors]]\nname = \"z\"\nwidth = 0\nheight = 0\n").unwrap();

    let output = gridpoint(&["--config", config.to_str().unwrap(), "monitors"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("positive width and height"));
}

#[test]
fn monitors_lists_configured_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    fs::write(
        &config,
        r#"
[[monitors]]
name = "left"
width = 1920
height = 1080
primary = true

[[monitors]]
name = "right"
x = 1920
width = 2560
height = 1440
"#,
    )
    .unwrap();

    let output = gridpoint(&["--config", config.to_str().unwrap(), "monitors"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[0] left (primary)"));
    assert!(stdout.contains("[1] right"));
    assert!(stdout.contains("Resolution: 2560x1440"));
}

#[test]
fn malformed_settings_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    fs::write(&config, "grid = 5\n").unwrap();

    let output = gridpoint(&["--config", config.to_str().unwrap(), "keys"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to parse settings"));
}
