mod common;

use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;

use common::{MULTI_PEAK_ID_FORMAT, indexed_psms, single_run, write_mzid};
use kira_pxvalidator::ident::AssayFormat;
use kira_pxvalidator::validators::{
    Collaborators, InputSelection, ValidationTarget, ValidatorError, build_validator,
    intermediate_path,
};

#[test]
fn no_selector_is_unrecognized() {
    let err = ValidationTarget::from_selection(&InputSelection::default()).unwrap_err();
    assert!(matches!(err, ValidatorError::UnrecognizedInput));
}

#[test]
fn two_selectors_conflict() {
    let selection = InputSelection {
        px: Some(PathBuf::from("submission.px")),
        mztab: Some(PathBuf::from("a.mztab")),
        ..InputSelection::default()
    };
    match ValidationTarget::from_selection(&selection).unwrap_err() {
        ValidatorError::ConflictingInputs(flags) => assert_eq!(flags, vec!["--px", "--mztab"]),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn selector_picks_format() {
    let selection = InputSelection {
        mztab: Some(PathBuf::from("a.mztab")),
        ..InputSelection::default()
    };
    let target = ValidationTarget::from_selection(&selection).unwrap();
    assert_eq!(target.format(), AssayFormat::MzTab);
    assert_eq!(target.path(), Path::new("a.mztab"));
}

#[test]
fn missing_main_file_fails_before_parsing() {
    let tmp = TempDir::new().unwrap();
    let selection = InputSelection {
        mzid: Some(tmp.path().join("absent.mzid")),
        ..InputSelection::default()
    };
    let err = build_validator(&selection, Collaborators::default())
        .err()
        .unwrap();
    match err.downcast_ref::<ValidatorError>() {
        Some(ValidatorError::MissingFile { kind, .. }) => assert_eq!(*kind, "mzIdentML"),
        other => panic!("unexpected {other:?}"),
    }
    assert!(err.to_string().starts_with("the provided mzIdentML file can't be found -- "));
}

#[test]
fn missing_peak_file_is_a_configuration_error() {
    let tmp = TempDir::new().unwrap();
    let mzid = write_mzid(
        tmp.path(),
        "assay.mzid",
        &single_run("run1.mgf", MULTI_PEAK_ID_FORMAT),
        &indexed_psms(2),
        true,
    );
    let selection = InputSelection {
        mzid: Some(mzid),
        peak: vec![tmp.path().join("run1.mgf")],
        ..InputSelection::default()
    };
    let err = build_validator(&selection, Collaborators::default())
        .err()
        .unwrap();
    assert!(matches!(
        err.downcast_ref::<ValidatorError>(),
        Some(ValidatorError::MissingFile { kind: "peak", .. })
    ));
}

#[test]
fn expired_deadline_aborts_the_run() {
    let tmp = TempDir::new().unwrap();
    let mzid = write_mzid(
        tmp.path(),
        "assay.mzid",
        &single_run("run1.mgf", MULTI_PEAK_ID_FORMAT),
        &indexed_psms(2),
        true,
    );
    let selection = InputSelection {
        mzid: Some(mzid),
        timeout: Some(Duration::ZERO),
        ..InputSelection::default()
    };
    let validator = build_validator(&selection, Collaborators::default()).unwrap();
    let err = validator.validate().unwrap_err();
    assert!(err.to_string().contains("deadline exceeded"));
}

#[test]
fn intermediate_lands_beside_input_or_in_unpack_dir() {
    assert_eq!(
        intermediate_path(Path::new("/d/a.mzid"), None),
        PathBuf::from("/d/a.mzid.compiled.json")
    );
    assert_eq!(
        intermediate_path(Path::new("/d/a.mzid"), Some(Path::new("/u"))),
        PathBuf::from("/u/a.mzid.compiled.json")
    );
}
