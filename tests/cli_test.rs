use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const REFERENCE: &str = r#"{
    "land_area_m2": 5000,
    "far_ratio": 1.8,
    "parking_type": "ENCLOSED",
    "housing_class": "MID",
    "land_value_usd": 2000000
}"#;

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// Run the binary from an empty directory so no `feasibility.toml` is picked up.
fn feasibility(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("feasibility").unwrap();
    cmd.current_dir(dir.path()).env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_help() {
    let dir = TempDir::new().unwrap();
    feasibility(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("feasibility calculator"));
}

#[test]
fn test_compute_from_file() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "scenario.json", REFERENCE);
    feasibility(&dir)
        .args(["compute", "--input", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sellable Area"))
        .stdout(predicate::str::contains("11,250.0"))
        .stdout(predicate::str::contains("cost-only"))
        .stdout(predicate::str::contains("No exchange rate available"));
}

#[test]
fn test_compute_json_with_flags_over_file() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "scenario.json", REFERENCE);
    let output = feasibility(&dir)
        .args([
            "compute",
            "--input",
            input.to_str().unwrap(),
            "--sale-price",
            "2200",
            "--rate",
            "10",
            "--json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["outputs"]["revenue_usd"], 24_750_000.0);
    assert_eq!(body["outputs"]["land_value_try"], 20_000_000.0);
}

#[test]
fn test_compute_from_flags_only() {
    let dir = TempDir::new().unwrap();
    feasibility(&dir)
        .args([
            "compute",
            "--land-area",
            "5000",
            "--far",
            "1.8",
            "--parking-type",
            "acik",
            "--housing-class",
            "low",
            "--land-value",
            "1000000",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("OPEN"))
        .stdout(predicate::str::contains("LOW"));
}

#[test]
fn test_compute_missing_fields_fails() {
    let dir = TempDir::new().unwrap();
    feasibility(&dir)
        .args(["compute", "--land-area", "5000"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("far_ratio"))
        .stdout(predicate::str::contains("land_value_usd"))
        .stderr(predicate::str::contains("incomplete"));
}

#[test]
fn test_compute_unsupported_input_format() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "scenario.xlsx", "");
    feasibility(&dir)
        .args(["compute", "--input", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported scenario format"));
}

#[test]
fn test_sensitivity_with_csv_export() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "scenario.json", REFERENCE);
    let csv_path = dir.path().join("grid.csv");
    feasibility(&dir)
        .args([
            "sensitivity",
            "--input",
            input.to_str().unwrap(),
            "--sale-price",
            "2200",
            "--csv",
            csv_path.to_str().unwrap(),
            "--chart",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sensitivity"))
        .stdout(predicate::str::contains("+10%"))
        .stdout(predicate::str::contains("Margin by Scenario"));

    let content = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(content.lines().count(), 10);
}

#[test]
fn test_sensitivity_cost_only() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "scenario.json", REFERENCE);
    feasibility(&dir)
        .args(["sensitivity", "--input", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("requires a sale price"));
}

#[test]
fn test_merge_writes_output() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "scenario.json", REFERENCE);
    let patch = write_file(&dir, "patch.json", r#"{"housing_class": "HIGH", "far_ratio": null}"#);
    let output = dir.path().join("merged.toml");

    feasibility(&dir)
        .args([
            "merge",
            "--input",
            input.to_str().unwrap(),
            "--patch",
            patch.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Merged"))
        .stdout(predicate::str::contains("far_ratio"));

    let merged = std::fs::read_to_string(&output).unwrap();
    assert!(merged.contains("housing_class = \"HIGH\""));
    assert!(!merged.contains("far_ratio"));
    // cost materialized for MID stays
    assert!(merged.contains("construction_cost_usd_per_m2 = 900.0"));
}

#[test]
fn test_batch() {
    let dir = TempDir::new().unwrap();
    let input = write_file(
        &dir,
        "batch.csv",
        "\
name,land_area_m2,far_ratio,parking_type,housing_class,land_value_usd,sale_price_usd_per_m2
a,5000,1.8,ENCLOSED,MID,2000000,2200
b,5000,,OPEN,LOW,1000000,
",
    );
    let output = dir.path().join("results.csv");
    feasibility(&dir)
        .args([
            "batch",
            "--input",
            input.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Batch Results"))
        .stdout(predicate::str::contains("Missing field: far_ratio"));
    assert!(output.exists());
}

#[test]
fn test_batch_uses_config_defaults() {
    let dir = TempDir::new().unwrap();
    write_file(&dir, "feasibility.toml", "[defaults]\naverage_unit_m2 = 100.0\n");
    let input = write_file(
        &dir,
        "batch.csv",
        "name,land_area_m2,far_ratio,parking_type,housing_class,land_value_usd\n\
         a,5000,1.8,ENCLOSED,MID,2000000\n",
    );
    let output = dir.path().join("results.csv");
    feasibility(&dir)
        .args([
            "batch",
            "--input",
            input.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    let mut rdr = csv::Reader::from_path(&output).unwrap();
    let headers = rdr.headers().unwrap().clone();
    let row = rdr.records().next().unwrap().unwrap();
    let units = headers.iter().position(|h| h == "unit_count").unwrap();
    assert_eq!(&row[units], "112");
}

#[test]
fn test_compute_rejects_non_positive_rate() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "scenario.json", REFERENCE);
    feasibility(&dir)
        .args(["compute", "--input", input.to_str().unwrap(), "--rate", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exchange rate must be positive"));
}

#[test]
fn test_defaults_uses_config() {
    let dir = TempDir::new().unwrap();
    write_file(&dir, "feasibility.toml", "[defaults]\naverage_unit_m2 = 95.0\n");
    feasibility(&dir)
        .arg("defaults")
        .assert()
        .success()
        .stdout(predicate::str::contains("Default Assumptions"))
        .stdout(predicate::str::contains("95"));
}

#[test]
fn test_bad_config_path() {
    let dir = TempDir::new().unwrap();
    feasibility(&dir)
        .args(["--config", "missing.toml", "defaults"])
        .assert()
        .failure();
}
