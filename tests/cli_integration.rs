//! Integration tests for the ticket-desk binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

/// A command running against local storage inside `dir`
#[allow(deprecated)]
fn desk(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ticket-desk").unwrap();
    cmd.current_dir(dir)
        .env_remove("RUST_LOG")
        .arg("--no-color")
        .arg("--backend")
        .arg("local")
        .arg("--data-dir")
        .arg(dir.join("data"));
    cmd
}

fn create(dir: &Path, name: &str, email: &str, priority: &str) {
    desk(dir)
        .args(["create", "--name", name, "--surname", "Tester", "--company", "Acme"])
        .args(["--email", email, "--description", "The printer is on fire"])
        .args(["--priority", priority])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created ticket"));
}

#[test]
#[allow(deprecated)]
fn test_help_lists_commands() {
    Command::cargo_bin("ticket-desk")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("board"));
}

#[test]
fn test_create_then_list_persists_locally() {
    let temp_dir = TempDir::new().unwrap();
    create(temp_dir.path(), "Ann", "ann@example.com", "high");
    create(temp_dir.path(), "Bob", "bob@example.com", "low");

    desk(temp_dir.path())
        .args(["list", "--search", "ann"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ann Tester"))
        .stdout(predicate::str::contains("Bob Tester").not());

    assert!(temp_dir.path().join("data/tickets.json").exists());
}

#[test]
fn test_create_rejects_invalid_email() {
    let temp_dir = TempDir::new().unwrap();
    desk(temp_dir.path())
        .args(["create", "--name", "Ann", "--surname", "Tester", "--company", "Acme"])
        .args(["--email", "not-an-email", "--description", "The printer is on fire"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please check your input"));
}

#[test]
fn test_import_reports_row_errors_and_imports_valid_rows() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("tickets.csv");
    std::fs::write(
        &file,
        "name,surname,company,email,description,priority\n\
         A,B,C,a@b.com,\"long enough desc\",HIGH\n\
         D,E,F,not-an-email,\"long enough desc\",low\n",
    )
    .unwrap();

    desk(temp_dir.path())
        .arg("import")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 row(s): 1 valid, 1 error(s)"))
        .stdout(predicate::str::contains("Imported 1"))
        .stderr(predicate::str::contains("Invalid email format"));

    desk(temp_dir.path())
        .args(["--json", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"totalItems\": 1"))
        .stdout(predicate::str::contains("\"priority\": \"high\""));
}

#[test]
fn test_import_rejects_unknown_file_type() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("tickets.xml");
    std::fs::write(&file, "<tickets/>").unwrap();

    desk(temp_dir.path())
        .arg("import")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid file type"));
}

#[test]
fn test_export_writes_file() {
    let temp_dir = TempDir::new().unwrap();
    create(temp_dir.path(), "Ann", "ann@example.com", "medium");

    desk(temp_dir.path())
        .args(["export", "--format", "csv", "--filename", "out"])
        .arg("--out-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 ticket(s)"));

    let csv = std::fs::read_to_string(temp_dir.path().join("out.csv")).unwrap();
    assert!(csv.starts_with("\"id\",\"name\""));
    assert!(csv.contains("\"ann@example.com\""));
}

#[test]
fn test_export_rejects_filename_outside_out_dir() {
    let temp_dir = TempDir::new().unwrap();
    let out_dir = temp_dir.path().join("exports");
    create(temp_dir.path(), "Ann", "ann@example.com", "medium");

    desk(temp_dir.path())
        .args(["export", "--format", "json", "--filename", "../escaped"])
        .arg("--out-dir")
        .arg(&out_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("must not contain path components"));

    assert!(!temp_dir.path().join("escaped.json").exists());
}

#[test]
fn test_priority_of_unknown_ticket_fails() {
    let temp_dir = TempDir::new().unwrap();
    desk(temp_dir.path())
        .args(["priority", "missing", "low"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing"));
}

#[test]
fn test_board_groups_by_priority() {
    let temp_dir = TempDir::new().unwrap();
    create(temp_dir.path(), "Ann", "ann@example.com", "high");

    desk(temp_dir.path())
        .arg("board")
        .assert()
        .success()
        .stdout(predicate::str::contains("High Priority (1)"))
        .stdout(predicate::str::contains("Low Priority (0)"));
}
