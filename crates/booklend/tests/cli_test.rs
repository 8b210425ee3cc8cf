//! End-to-end tests running the built binaries against a temporary data
//! directory.

use std::path::Path;
use std::process::{Command, Output};

fn booklend(bin: &str, data_dir: &Path, args: &[&str]) -> Output {
    let exe = match bin {
        "loan" => env!("CARGO_BIN_EXE_booklend-loan"),
        "catalog" => env!("CARGO_BIN_EXE_booklend-catalog"),
        "roster" => env!("CARGO_BIN_EXE_booklend-roster"),
        "report" => env!("CARGO_BIN_EXE_booklend-report"),
        "admin" => env!("CARGO_BIN_EXE_booklend-admin"),
        "form" => env!("CARGO_BIN_EXE_booklend-form"),
        other => panic!("unknown tool {other}"),
    };
    Command::new(exe)
        .arg("--data-dir")
        .arg(data_dir)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run binary")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_missing_subcommand_exits_with_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = booklend("loan", dir.path(), &[]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("a subcommand is required"));
}

#[test]
fn test_loan_cycle_persists_between_runs() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path();

    stdout(&booklend("catalog", data, &["add", "Sains", "XS1", "1", "--stock", "3"]));
    stdout(&booklend(
        "roster",
        data,
        &["add", "Ali bin Abu", "--year", "1", "--class", "Amanah"],
    ));
    let text = stdout(&booklend("loan", data, &["borrow", "XS1", "ali bin abu"]));
    assert!(text.contains("(2 left)"));

    for file in ["books.json", "members.json", "transactions.json"] {
        assert!(data.join(file).exists(), "{file} was not written");
    }

    let text = stdout(&booklend("loan", data, &["active", "Ali bin Abu"]));
    assert!(text.contains("SAINS"));

    let text = stdout(&booklend("form", data, &["show", "Ali bin Abu", "XS1"]));
    assert!(text.contains("source:       form"));

    let text = stdout(&booklend("report", data, &["export-log"]));
    assert!(text.starts_with("id,timestamp,action"));
    assert!(text.contains("ALI BIN ABU"));
}

#[test]
fn test_borrow_beyond_stock_fails() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path();
    stdout(&booklend("catalog", data, &["add", "Sains", "XS1", "1", "--stock", "1"]));
    stdout(&booklend("loan", data, &["borrow", "XS1", "Ali"]));

    let output = booklend("loan", data, &["borrow", "XS1", "Siti"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("error:"));
}

#[test]
fn test_backup_restore_between_directories() {
    let source = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    let backup = source.path().join("backup.json");

    stdout(&booklend("roster", source.path(), &["add", "Siti", "--year", "4"]));
    stdout(&booklend(
        "admin",
        source.path(),
        &["backup", "-o", backup.to_str().unwrap()],
    ));
    let text = stdout(&booklend(
        "admin",
        target.path(),
        &["restore", backup.to_str().unwrap(), "--yes"],
    ));
    assert!(text.contains("1 members"));

    let text = stdout(&booklend("roster", target.path(), &["list"]));
    assert!(text.contains("SITI"));
}
