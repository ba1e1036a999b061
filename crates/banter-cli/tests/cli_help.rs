use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_lists_subcommands() {
    cargo_bin_cmd!("banter")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("models"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_unknown_subcommand_fails() {
    cargo_bin_cmd!("banter")
        .arg("frobnicate")
        .assert()
        .failure();
}

#[test]
fn test_models_lists_supported_tags() {
    let home = tempfile::tempdir().unwrap();

    cargo_bin_cmd!("banter")
        .env("BANTER_HOME", home.path())
        .arg("models")
        .assert()
        .success()
        .stdout(predicate::str::contains("o3-mini"))
        .stdout(predicate::str::contains("gpt-4o-mini"));
}
