//! End-to-end pipeline over a real database: load checks, build the report,
//! apply filters and drive the navigators the way the report view does.

use check_view::db::ResultsDb;
use check_view::filter::{KindFilter, StatusFilter, Visibility};
use check_view::navigator::{NavCategory, NavigatorSet};
use check_view::report::FileReport;
use check_view::CheckStatus;
use rusqlite::Connection;
use tempfile::TempDir;

const SOURCE: &str = "\
int div(int a, int b) {
  return a / b;
}

int main() {
  int x = div(1, 0);
  while (0) {
    x++;
  }
  return x;
}
";

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
         INSERT INTO files VALUES (0, 'div.c');
         INSERT INTO check_kinds VALUES (0, 'division by zero'), (1, 'unreachable code');
         INSERT INTO functions VALUES (1, 'div'), (2, 'main');
         INSERT INTO call_contexts VALUES (0, ''), (1, 'div.c:6:11: function ''div''');
         INSERT INTO checks VALUES
            (1, 0, 2, 10, 0, 2, 'division by zero', 1, '1'),
            (2, 0, 2, 10, 1, 0, 'reachable', 1, '1'),
            (3, 0, 6, 11, 0, 1, 'may divide by zero', 2, '0'),
            (4, 0, 8, 5, 1, 3, 'unreachable statement', 2, '0');",
    )
    .unwrap();
    path
}

fn load_report(db: &ResultsDb) -> FileReport {
    let path = db.file_path(0).unwrap().unwrap();
    let checks = db.checks(0).unwrap();
    let functions = db.functions().unwrap();
    let call_contexts = db.call_contexts().unwrap();
    FileReport::new(0, path, SOURCE, checks, functions, call_contexts)
}

#[test]
fn loaded_report_has_expected_line_statuses() {
    let dir = TempDir::new().unwrap();
    let db = ResultsDb::open(&fixture_db(&dir)).unwrap();
    let report = load_report(&db);

    // Line 2 has an error and an ok check: the error wins.
    assert_eq!(report.line_status(2), Some(CheckStatus::Error));
    assert_eq!(report.line_status(6), Some(CheckStatus::Warning));
    assert_eq!(report.line_status(8), Some(CheckStatus::Unreachable));
    assert_eq!(report.line_status(1), None);

    // Within line 2 the error renders before the ok check.
    let on_line_2 = report.checks_on_line(2);
    assert_eq!(report.checks[on_line_2[0]].status, CheckStatus::Error);
    assert_eq!(report.checks[on_line_2[1]].status, CheckStatus::Ok);
}

#[test]
fn kind_and_status_filters_compose_over_loaded_checks() {
    let dir = TempDir::new().unwrap();
    let db = ResultsDb::open(&fixture_db(&dir)).unwrap();
    let report = load_report(&db);
    let kinds = db.check_kinds().unwrap();

    let mut kind_filter = KindFilter::all_enabled(&kinds);
    let mut status_filter = StatusFilter::default();
    let mut vis = Visibility::new(&report.checks);
    vis.apply_initial(&report.checks, &kind_filter, &status_filter);

    // Everything starts visible.
    assert!((0..report.checks.len()).all(|i| vis.check_visible(i)));

    // Disabling the unreachable-code kind hides its checks and collapses the
    // box of the line that only had that kind.
    kind_filter.set(1, false);
    vis.set_kind(&report.checks, 1, false);
    assert!(vis.box_visible(2));
    assert!(!vis.box_visible(8));

    // Disabling errors on top empties line 2 as well.
    status_filter.set(CheckStatus::Error, false);
    vis.set_status(&report.checks, CheckStatus::Error, false);
    assert!(!vis.box_visible(2));
    assert!(vis.box_visible(6));

    // Re-enabling the kind is not enough for line 2: the error stays
    // status-hidden, but the ok check of that kind comes back.
    vis.set_kind(&report.checks, 1, true);
    assert!(vis.box_visible(2));
    let on_line_2 = report.checks_on_line(2);
    assert!(!vis.check_visible(on_line_2[0]));
    assert!(vis.check_visible(on_line_2[1]));
}

#[test]
fn restored_mask_applies_as_initial_state() {
    let dir = TempDir::new().unwrap();
    let db = ResultsDb::open(&fixture_db(&dir)).unwrap();
    let report = load_report(&db);
    let kinds = db.check_kinds().unwrap();

    // Mask 02 keeps only kind 1 (unreachable code).
    let kind_filter = KindFilter::from_mask(&kinds, Some("02"));
    let mut vis = Visibility::new(&report.checks);
    vis.apply_initial(&report.checks, &kind_filter, &StatusFilter::default());

    assert!(!vis.box_visible(6));
    assert!(vis.box_visible(8));
    let on_line_2 = report.checks_on_line(2);
    assert!(!vis.check_visible(on_line_2[0]));
    assert!(vis.check_visible(on_line_2[1]));
}

#[test]
fn navigators_walk_findings_in_document_order() {
    let dir = TempDir::new().unwrap();
    let db = ResultsDb::open(&fixture_db(&dir)).unwrap();
    let report = load_report(&db);

    let mut navs = NavigatorSet::new(&report.line_statuses());
    assert_eq!(navs.get(NavCategory::Error).len(), 1);
    assert_eq!(navs.get(NavCategory::Warning).len(), 1);
    assert_eq!(navs.get(NavCategory::Deadcode).len(), 1);

    assert_eq!(navs.get_mut(NavCategory::Error).step(1), Some(2));
    assert_eq!(navs.get_mut(NavCategory::Warning).step(1), Some(6));
    assert_eq!(navs.get_mut(NavCategory::Deadcode).step(1), Some(8));

    // Each list is exhausted after its single finding.
    assert!(!navs.get(NavCategory::Error).next_enabled());
    assert_eq!(navs.get_mut(NavCategory::Error).step(1), None);

    navs.reset_all();
    assert_eq!(navs.get(NavCategory::Error).current(), -1);
}

#[test]
fn call_context_text_uses_loaded_functions_and_contexts() {
    let dir = TempDir::new().unwrap();
    let db = ResultsDb::open(&fixture_db(&dir)).unwrap();
    let report = load_report(&db);

    // The warning in main was reached from the entry point.
    let on_line_6 = report.checks_on_line(6);
    let check = &report.checks[on_line_6[0]];
    assert_eq!(
        report.call_context_text(check),
        "Called from entry point 'main'\n"
    );

    // The error in div carries a real call path.
    let on_line_2 = report.checks_on_line(2);
    let check = &report.checks[on_line_2[0]];
    assert_eq!(
        report.call_context_text(check),
        "Called from:\ndiv.c:6:11: function 'div'\n"
    );
}
