mod common;

use assert_cmd::Command;
use predicates::str::contains;

use common::TestWorkspace;

#[test]
fn probe_prints_create_table_with_inferred_types() {
    let workspace = TestWorkspace::new();
    let input = workspace.write(
        "patients.csv",
        "patient_id,visit_date,cost\n\
         1,2024-05-06 14:30:00,12.50\n\
         2,2024-05-07 09:00:00,99.99\n",
    );

    Command::cargo_bin("csv-ingest")
        .expect("binary present")
        .args(["probe", "-i", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("CREATE TABLE IF NOT EXISTS `data_patients`"))
        .stdout(contains("`patient_id` INT"))
        .stdout(contains("`visit_date` DATETIME"))
        .stdout(contains("`cost` DECIMAL(12,4)"))
        .stdout(contains("`import_time` TIMESTAMP DEFAULT CURRENT_TIMESTAMP"));
}

#[test]
fn probe_flattens_string_columns_to_the_fixed_length() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("people.csv", "name,city\nalice,berlin\nbob,oslo\n");

    Command::cargo_bin("csv-ingest")
        .expect("binary present")
        .args(["probe", "-i", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("`name` VARCHAR(255)"))
        .stdout(contains("`city` VARCHAR(255)"));
}

#[test]
fn probe_sanitizes_quoted_and_unruly_headers() {
    let workspace = TestWorkspace::new();
    let input = workspace.write(
        "Quarterly Export (final).csv",
        "\"Patient ID\",Amount Due ($)\n1,10\n",
    );

    Command::cargo_bin("csv-ingest")
        .expect("binary present")
        .args(["probe", "-i", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("`data_quarterly_export_final_`"))
        .stdout(contains("`patient_id`"))
        .stdout(contains("`amount_due_`"));
}

#[test]
fn probe_consumes_a_utf8_byte_order_mark() {
    let workspace = TestWorkspace::new();
    let input = workspace.write_bytes(
        "bom.csv",
        b"\xef\xbb\xbfid,name\n1,alpha\n2,beta\n",
    );

    Command::cargo_bin("csv-ingest")
        .expect("binary present")
        .args(["probe", "-i", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("`id` INT"));
}

#[test]
fn probe_tolerates_malformed_rows_and_still_reports() {
    let workspace = TestWorkspace::new();
    let input = workspace.write(
        "ragged.csv",
        "a,b\n1,2\n1,2,3,4\n5,6\n",
    );

    Command::cargo_bin("csv-ingest")
        .expect("binary present")
        .args(["probe", "-i", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("CREATE TABLE IF NOT EXISTS `data_ragged`"))
        .stderr(contains("skipped"));
}

#[test]
fn probe_resolves_tab_delimiter_from_the_extension() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("sheet.tsv", "id\tname\n1\talpha\n");

    Command::cargo_bin("csv-ingest")
        .expect("binary present")
        .args(["probe", "-i", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("`id` INT"))
        .stdout(contains("`name` VARCHAR(255)"));
}

#[test]
fn probe_honors_a_custom_table_prefix() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("orders.csv", "qty\n1\n");

    Command::cargo_bin("csv-ingest")
        .expect("binary present")
        .args([
            "probe",
            "-i",
            input.to_str().unwrap(),
            "--table-prefix",
            "staging_",
        ])
        .assert()
        .success()
        .stdout(contains("CREATE TABLE IF NOT EXISTS `staging_orders`"));
}

#[test]
fn probe_fails_cleanly_on_a_missing_file() {
    Command::cargo_bin("csv-ingest")
        .expect("binary present")
        .args(["probe", "-i", "/nonexistent/input.csv"])
        .assert()
        .failure()
        .stderr(contains("error"));
}
