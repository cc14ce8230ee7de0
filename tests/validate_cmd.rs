mod common;

use assert_cmd::Command;
use tempfile::TempDir;

use common::{MULTI_PEAK_ID_FORMAT, indexed_psms, single_run, write_mgf, write_mzid};

#[test]
fn mzid_run_prints_and_writes_reports() {
    let tmp = TempDir::new().unwrap();
    let mgf = write_mgf(tmp.path(), "run1.mgf", 25);
    let mzid = write_mzid(
        tmp.path(),
        "assay.mzid",
        &single_run("file:///data/run1.mgf", MULTI_PEAK_ID_FORMAT),
        &indexed_psms(25),
        true,
    );
    let report_file = tmp.path().join("report.txt");
    let json = tmp.path().join("report.json");

    let out = Command::cargo_bin("kira-pxvalidator")
        .unwrap()
        .arg("validate")
        .arg("--mzid")
        .arg(&mzid)
        .arg("--peak")
        .arg(&mgf)
        .arg("--report-file")
        .arg(&report_file)
        .arg("--json")
        .arg(&json)
        .args(["--threads", "2"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(out).unwrap();

    assert!(stdout.starts_with("Status : Valid\n"));
    assert!(stdout.contains("Number of reported PSMs : 25"));
    assert!(stdout.contains("Peak File : run1.mgf\t"));
    assert_eq!(std::fs::read_to_string(&report_file).unwrap(), stdout);

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(value["valid"], true);
    assert_eq!(value["report"]["kind"], "result");
    assert_eq!(value["report"]["peak_reports"][0]["detected"].as_array().unwrap().len(), 10);
}

#[test]
fn invalid_report_still_exits_zero() {
    let tmp = TempDir::new().unwrap();
    let px = tmp.path().join("submission.px");
    std::fs::write(&px, "MTD\tsubmitter_name\tJane\n").unwrap();

    let out = Command::cargo_bin("kira-pxvalidator")
        .unwrap()
        .arg("validate")
        .arg("--px")
        .arg(&px)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(out).unwrap();
    assert!(stdout.contains("== Level Error: ERROR =="));
    assert!(stdout.ends_with("Status : Invalid\n"));
}

#[test]
fn missing_input_exits_non_zero() {
    let tmp = TempDir::new().unwrap();
    Command::cargo_bin("kira-pxvalidator")
        .unwrap()
        .arg("validate")
        .arg("--mztab")
        .arg(tmp.path().join("absent.mztab"))
        .assert()
        .failure();
}
