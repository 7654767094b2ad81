mod common;

use assert_cmd::Command;
use predicates::str::contains;

use common::TestWorkspace;

// Import tests that exercise the report boundary without a reachable store.
// The pool connects lazily, so a parse failure surfaces before any network
// traffic happens.

#[test]
fn import_of_a_missing_file_emits_an_error_report() {
    Command::cargo_bin("csv-ingest")
        .expect("binary present")
        .args([
            "import",
            "-i",
            "/nonexistent/patients.csv",
            "--user",
            "loader",
            "--database",
            "staging",
        ])
        .assert()
        .failure()
        .stdout(contains("\"status\": \"error\""))
        .stdout(contains("csv parse failure"))
        .stdout(contains("\"rows_imported\": 0"));
}

#[test]
fn import_report_names_the_derived_table_even_on_failure() {
    let workspace = TestWorkspace::new();
    // The directory exists but the file does not; the derived table name is
    // still reported so callers can correlate failures.
    let missing = workspace.path().join("Visit Records.csv");

    Command::cargo_bin("csv-ingest")
        .expect("binary present")
        .args([
            "import",
            "-i",
            missing.to_str().unwrap(),
            "--user",
            "loader",
            "--database",
            "staging",
        ])
        .assert()
        .failure()
        .stdout(contains("\"table\": \"data_visit_records\""));
}
