mod common;

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

fn pivot() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_pivot"));
    cmd.env_remove("PIVOTDIRECTORY").env_remove("RUST_LOG");
    cmd
}

#[test]
fn shows_help() {
    pivot()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--target-directory"));
}

#[test]
fn missing_repository_fails_before_walking() {
    let src = TempDir::new().unwrap();

    pivot()
        .arg(src.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("PIVOTDIRECTORY"));
}

#[test]
fn repository_from_environment() {
    let src = TempDir::new().unwrap();
    let repo = TempDir::new().unwrap();
    let bytes = common::tiff(Some("2020:01:01 12:00:00"), b"env");
    common::write(src.path(), "a.tif", &bytes);

    pivot()
        .env("PIVOTDIRECTORY", repo.path())
        .args(["--output", "minimal"])
        .arg(src.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "{}.tif",
            common::sha256_hex(&bytes)
        )));

    repo.child("images/20200101")
        .assert(predicate::path::is_dir());
}

#[test]
fn dry_run_copies_nothing() {
    let src = TempDir::new().unwrap();
    let repo = TempDir::new().unwrap();
    common::photo(src.path(), "a.tif", "2020:01:01 12:00:00", b"a");

    pivot()
        .arg("--target-directory")
        .arg(repo.path())
        .arg("--test")
        .arg(src.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("->"));

    repo.child("images").assert(predicate::path::missing());
}

#[test]
fn second_run_reports_already_present() {
    let src = TempDir::new().unwrap();
    let repo = TempDir::new().unwrap();
    common::photo(src.path(), "a.tif", "2020:01:01 12:00:00", b"a");

    pivot()
        .arg("-d")
        .arg(repo.path())
        .arg(src.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("->"));

    pivot()
        .arg("-d")
        .arg(repo.path())
        .arg(src.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("already present"));
}

#[test]
fn glob_arguments_expand() {
    let src = TempDir::new().unwrap();
    let repo = TempDir::new().unwrap();
    common::photo(src.path(), "roll-1/a.tif", "2020:01:01 12:00:00", b"1");
    common::photo(src.path(), "roll-2/b.tif", "2020:01:02 12:00:00", b"2");
    common::photo(src.path(), "other/c.tif", "2020:01:03 12:00:00", b"3");

    let output = pivot()
        .arg("-d")
        .arg(repo.path())
        .args(["--output", "json"])
        .arg(format!("{}/roll-*", src.path().display()))
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["plan"]["import_count"], 2);
    assert_eq!(json["execution"]["files_imported"], 2);
}
