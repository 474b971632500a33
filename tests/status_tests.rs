use assert_cmd::Command;
use predicates::prelude::*;
use rusqlite::Connection;
use tempfile::TempDir;

fn fixture_db(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("results.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE files (id INTEGER PRIMARY KEY, path TEXT NOT NULL);
         CREATE TABLE check_kinds (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
         CREATE TABLE functions (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
         CREATE TABLE call_contexts (id INTEGER PRIMARY KEY, description TEXT NOT NULL);
         CREATE TABLE checks (
             id INTEGER PRIMARY KEY,
             file_id INTEGER NOT NULL,
             line INTEGER NOT NULL,
             col INTEGER,
             kind INTEGER NOT NULL,
             status INTEGER NOT NULL,
             message TEXT NOT NULL,
             function_id INTEGER NOT NULL,
             call_context_ids TEXT NOT NULL
         );
         INSERT INTO files VALUES (0, 'src/b.c'), (1, 'src/a.c');
         INSERT INTO check_kinds VALUES (0, 'buffer overflow'), (3, 'division by zero');
         INSERT INTO functions VALUES (1, 'main');
         INSERT INTO call_contexts VALUES (0, '');
         INSERT INTO checks VALUES
            (1, 0, 10, 4, 0, 2, 'overflow', 1, '0'),
            (2, 0, 10, 9, 3, 0, 'ok here', 1, '0'),
            (3, 1, 3, 1, 3, 3, 'never runs', 1, '0');",
    )
    .unwrap();
    path
}

#[test]
fn status_lists_files_sorted_with_counts() {
    let dir = TempDir::new().unwrap();
    let db = fixture_db(&dir);

    let output = Command::cargo_bin("check-view")
        .unwrap()
        .arg("status")
        .arg(&db)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("2 files"));
    assert!(stdout.contains("ok:1 warning:0 error:1 dead:0"));
    assert!(stdout.contains("ok:0 warning:0 error:0 dead:1"));

    // Sorted by path, not by file id.
    let a = stdout.find("src/a.c").unwrap();
    let b = stdout.find("src/b.c").unwrap();
    assert!(a < b);
}

#[test]
fn status_header_shows_encoded_kind_mask() {
    let dir = TempDir::new().unwrap();
    let db = fixture_db(&dir);

    // Kinds 0 and 3 both enabled: bits 0 and 3 of byte 0.
    Command::cargo_bin("check-view")
        .unwrap()
        .arg("status")
        .arg(&db)
        .assert()
        .success()
        .stdout(predicate::str::contains("k=09"));
}

#[test]
fn kind_mask_excludes_counts_and_marks_safe() {
    let dir = TempDir::new().unwrap();
    let db = fixture_db(&dir);

    // Mask 01 keeps only kind 0. src/a.c has nothing but a kind-3 dead code
    // finding left, so it reads Safe; src/b.c keeps its error.
    let output = Command::cargo_bin("check-view")
        .unwrap()
        .args(["status", db.to_str().unwrap(), "--kinds", "01"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("k=01"));
    assert!(stdout.contains("src/a.c  Safe"));
    assert!(stdout.contains("ok:0 warning:0 error:1 dead:0"));
}

#[test]
fn malformed_kind_mask_is_ignored() {
    let dir = TempDir::new().unwrap();
    let db = fixture_db(&dir);

    Command::cargo_bin("check-view")
        .unwrap()
        .args(["status", db.to_str().unwrap(), "--kinds", "ZZ"])
        .assert()
        .success()
        .stdout(predicate::str::contains("k=09"))
        .stdout(predicate::str::contains("error:1"));
}

#[test]
fn status_flag_matches_subcommand() {
    let dir = TempDir::new().unwrap();
    let db = fixture_db(&dir);

    let via_flag = Command::cargo_bin("check-view")
        .unwrap()
        .arg("--status")
        .arg(&db)
        .output()
        .unwrap();
    let via_subcommand = Command::cargo_bin("check-view")
        .unwrap()
        .arg("status")
        .arg(&db)
        .output()
        .unwrap();

    assert!(via_flag.status.success());
    assert_eq!(via_flag.stdout, via_subcommand.stdout);
}

#[test]
fn missing_database_fails_with_context() {
    let dir = TempDir::new().unwrap();

    Command::cargo_bin("check-view")
        .unwrap()
        .arg("status")
        .arg(dir.path().join("absent.db"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open results database"));
}

#[test]
fn no_database_argument_fails() {
    Command::cargo_bin("check-view")
        .unwrap()
        .arg("--status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing results database"));
}
