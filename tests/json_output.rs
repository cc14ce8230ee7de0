use std::path::Path;

use tempfile::TempDir;

use kira_pxvalidator::ident::AssayFormat;
use kira_pxvalidator::io::json_writer::{build_report, write_json};
use kira_pxvalidator::report::{Issue, Report, ResultReport, ValidationReport};
use kira_pxvalidator::schema::v1::PxValidationV1;

#[test]
fn envelope_carries_tool_and_validity() {
    let mut report = Report::new();
    report.add(Issue::error("bad mail"));
    let envelope = build_report(
        Path::new("submission.px"),
        AssayFormat::Submission,
        &ValidationReport::Submission(report),
    );
    assert_eq!(envelope.tool, "kira-pxvalidator");
    assert_eq!(envelope.schema_version, "v1");
    assert_eq!(envelope.version, env!("CARGO_PKG_VERSION"));
    assert!(!envelope.valid);
    assert_eq!(envelope.errors, 1);
}

#[test]
fn written_json_reads_back() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("report.json");
    let mut result = ResultReport::new();
    result.assay_file = Some("a.mzid".to_string());
    result.valid_schema = true;
    let report = ValidationReport::Result(result);

    write_json(&out, Path::new("/data/a.mzid"), AssayFormat::MzIdentMl, &report).unwrap();

    let text = std::fs::read_to_string(&out).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["tool"], "kira-pxvalidator");
    assert_eq!(json["valid"], true);
    assert_eq!(json["input"]["path"], "/data/a.mzid");
    assert_eq!(json["input"]["format"], "mz_ident_ml");
    assert_eq!(json["report"]["kind"], "result");
    assert_eq!(json["report"]["assay_file"], "a.mzid");

    let parsed: PxValidationV1 = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed.report, report);
}
