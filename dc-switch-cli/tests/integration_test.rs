use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

fn dc_switch(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("dc-switch").unwrap();
    cmd.env("DC_SWITCH_HOME", home);
    cmd
}

#[test]
fn test_help() {
    let home = tempfile::tempdir().unwrap();
    dc_switch(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Manage Discord account profiles"));
}

#[test]
fn test_version() {
    let home = tempfile::tempdir().unwrap();
    dc_switch(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("dc-switch"));
}

#[test]
fn test_profile_help() {
    let home = tempfile::tempdir().unwrap();
    dc_switch(home.path())
        .args(["profile", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Profile management"));
}

#[test]
fn test_profile_list_empty() {
    let home = tempfile::tempdir().unwrap();
    dc_switch(home.path())
        .args(["profile", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No profiles yet"));
}

#[test]
fn test_profile_list_json_empty() {
    let home = tempfile::tempdir().unwrap();
    dc_switch(home.path())
        .args(["profile", "list", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}

#[test]
fn test_profile_add_and_list() {
    let home = tempfile::tempdir().unwrap();
    dc_switch(home.path())
        .args(["profile", "add", "Work"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added profile: Work"));

    dc_switch(home.path())
        .args(["profile", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Work"));
}

#[test]
fn test_profile_add_duplicate_nickname() {
    let home = tempfile::tempdir().unwrap();
    dc_switch(home.path())
        .args(["profile", "add", "Main"])
        .assert()
        .success();

    dc_switch(home.path())
        .args(["profile", "add", "main"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_profile_add_rejects_bad_color() {
    let home = tempfile::tempdir().unwrap();
    dc_switch(home.path())
        .args(["profile", "add", "Alt", "--color", "blue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("hex color"));
}

#[test]
fn test_profile_show_by_nickname() {
    let home = tempfile::tempdir().unwrap();
    dc_switch(home.path())
        .args(["profile", "add", "Work"])
        .assert()
        .success();

    dc_switch(home.path())
        .args(["profile", "show", "work"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nickname: Work"))
        .stdout(predicate::str::contains("Token: none"));
}

#[test]
fn test_profile_show_nonexistent() {
    let home = tempfile::tempdir().unwrap();
    dc_switch(home.path())
        .args(["profile", "show", "nonexistent-id-12345"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Profile not found"));
}

#[test]
fn test_profile_rename() {
    let home = tempfile::tempdir().unwrap();
    dc_switch(home.path())
        .args(["profile", "add", "Work"])
        .assert()
        .success();

    dc_switch(home.path())
        .args(["profile", "rename", "Work", "Office"])
        .assert()
        .success()
        .stdout(predicate::str::contains("to 'Office'"));
}

#[test]
fn test_profile_delete_nonexistent() {
    let home = tempfile::tempdir().unwrap();
    dc_switch(home.path())
        .args(["profile", "delete", "nonexistent-id-12345", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Profile not found"));
}

#[test]
fn test_profile_delete() {
    let home = tempfile::tempdir().unwrap();
    dc_switch(home.path())
        .args(["profile", "add", "Gone"])
        .assert()
        .success();

    dc_switch(home.path())
        .args(["profile", "delete", "Gone", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted profile: Gone"));

    dc_switch(home.path())
        .args(["profile", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No profiles yet"));
}

#[test]
fn test_switch_nonexistent_profile() {
    let home = tempfile::tempdir().unwrap();
    dc_switch(home.path())
        .args(["switch", "nonexistent-id-12345"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Profile not found"));
}

#[test]
fn test_switch_without_saved_token() {
    let home = tempfile::tempdir().unwrap();
    dc_switch(home.path())
        .args(["profile", "add", "Fresh"])
        .assert()
        .success();

    dc_switch(home.path())
        .args(["switch", "Fresh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no saved token"));
}

#[test]
fn test_capture_nonexistent_profile() {
    let home = tempfile::tempdir().unwrap();
    dc_switch(home.path())
        .args(["capture", "nonexistent-id-12345"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Profile not found"));
}

#[test]
fn test_login_invalid_channel() {
    let home = tempfile::tempdir().unwrap();
    dc_switch(home.path())
        .args(["login", "--channel", "beta"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid channel"));
}

#[test]
fn test_detect_runs_without_installation() {
    let home = tempfile::tempdir().unwrap();
    dc_switch(home.path()).arg("detect").assert().success();
}

#[test]
fn test_detect_json() {
    let home = tempfile::tempdir().unwrap();
    dc_switch(home.path())
        .args(["detect", "--format", "json"])
        .assert()
        .success();
}

#[test]
fn test_settings_show_defaults() {
    let home = tempfile::tempdir().unwrap();
    dc_switch(home.path())
        .args(["settings", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Preferred channel: auto"));
}

#[test]
fn test_settings_set_channel() {
    let home = tempfile::tempdir().unwrap();
    dc_switch(home.path())
        .args(["settings", "set", "--channel", "canary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Preferred channel: canary"));

    dc_switch(home.path())
        .args(["settings", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Preferred channel: canary"));
}

#[test]
fn test_settings_set_invalid_channel() {
    let home = tempfile::tempdir().unwrap();
    dc_switch(home.path())
        .args(["settings", "set", "--channel", "nightly"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid channel"));
}

#[test]
fn test_settings_set_dangling_custom_path() {
    let home = tempfile::tempdir().unwrap();
    dc_switch(home.path())
        .args(["settings", "set", "--custom-path", "/does/not/exist/discord"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}
