use std::fs;
use std::path::Path;

use tempfile::TempDir;

use kira_pxvalidator::report::{Severity, ValidationReport};
use kira_pxvalidator::submission::{check_submission, parse_submission};
use kira_pxvalidator::validators::{Collaborators, InputSelection, build_validator};

const GOOD: &str = "\
COM\tgenerated by hand
MTD\tsubmitter_name\tJane Doe
MTD\tsubmitter_email\tjane.doe@ebi.ac.uk
MTD\tproject_title\tPhosphoproteome of stressed yeast cultures
MTD\tproject_description\tTime course of the phosphoproteome of yeast under osmotic stress, three replicates.
MTD\tsubmission_type\tCOMPLETE
FMH\tfile_id\tfile_type\tfile_path\tfile_mapping
FME\t1\tRESULT\ta.mzid\t2
FME\t2\tPEAK\ta.mgf
";

fn validate_px(dir: &Path, text: &str) -> ValidationReport {
    let px = dir.join("submission.px");
    fs::write(&px, text).unwrap();
    let selection = InputSelection {
        px: Some(px),
        ..InputSelection::default()
    };
    build_validator(&selection, Collaborators::default())
        .unwrap()
        .validate()
        .unwrap()
}

#[test]
fn complete_descriptor_is_valid() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("a.mzid"), "<MzIdentML/>").unwrap();
    fs::write(tmp.path().join("a.mgf"), "").unwrap();

    let report = validate_px(tmp.path(), GOOD);

    assert!(matches!(report, ValidationReport::Submission(_)));
    assert!(report.is_valid(), "{}", report);
    assert_eq!(report.to_string(), "Status : Valid\n");
}

#[test]
fn missing_files_on_disk_are_warnings() {
    let tmp = TempDir::new().unwrap();
    let report = validate_px(tmp.path(), GOOD);
    assert_eq!(report.error_count(), 0);
    assert_eq!(report.issues().count(Severity::Warning), 2);
}

#[test]
fn broken_descriptor_collects_every_problem() {
    let text = "\
MTD\tsubmitter_email\tnope
MTD\tproject_title\tShort title
MTD\tproject_description\tShort description
MTD\tsubmission_type\tFULL
FME\t9\tPEAK\tearly.mgf
FMH\tfile_id\tfile_type\tfile_path\tfile_mapping
FME\t1\tRESULT\ta.mzid\t3
FME\t1\tPEAK\tb.mgf
FME\t2\tBANANA\tc.txt
XYZ\tstray line
";
    let (submission, mut issues) = parse_submission(text);
    assert_eq!(submission.files.len(), 3);
    issues.extend(check_submission(&submission, Path::new("/nonexistent")));

    let errors: Vec<&str> = issues
        .iter()
        .filter(|i| i.severity == Severity::Error)
        .map(|i| i.cause.as_str())
        .collect();
    let has = |needle: &str| errors.iter().any(|e| e.contains(needle));
    assert!(has("FME line appears before the FMH header"));
    assert!(has("unknown line prefix 'XYZ'"));
    assert!(has("mandatory field 'submitter_name' is missing"));
    assert!(has("submitter_email 'nope' is not a valid email"));
    assert!(has("unknown submission_type 'FULL'"));
    assert!(has("duplicate file_id '1'"));
    assert!(has("unknown file_type 'BANANA'"));
    assert!(has("maps to undeclared file_id '3'"));

    let warnings = issues
        .iter()
        .filter(|i| i.severity == Severity::Warning)
        .count();
    // short title, short description, three files missing on disk
    assert_eq!(warnings, 5);
}

#[test]
fn complete_submission_needs_a_result_file() {
    let text = GOOD.replace("FME\t1\tRESULT\ta.mzid\t2\n", "");
    let (submission, issues) = parse_submission(&text);
    assert!(issues.is_empty());
    let issues = check_submission(&submission, Path::new("/nonexistent"));
    assert!(issues
        .iter()
        .any(|i| i.cause.contains("COMPLETE submission must list at least one RESULT file")));
}

#[test]
fn peak_arguments_are_ignored_for_descriptors() {
    let tmp = TempDir::new().unwrap();
    let px = tmp.path().join("submission.px");
    fs::write(&px, GOOD).unwrap();
    let selection = InputSelection {
        px: Some(px),
        peak: vec![tmp.path().join("nowhere.mgf")],
        ..InputSelection::default()
    };
    let report = build_validator(&selection, Collaborators::default())
        .unwrap()
        .validate()
        .unwrap();
    assert!(report.as_result().is_none());
}
