//! Input dispatch.
//!
//! Exactly one of the three selectors picks the validator. Configuration problems
//! surface as [`ValidatorError`] before any file is parsed.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use thiserror::Error;
use tracing::{info, warn};

use crate::ident::mztab::MzTabChecker;
use crate::ident::{AssayFormat, IdentificationCompiler, NativeCompiler, TabularParser};
use crate::input;
use crate::pipeline::Deadline;
use crate::report::ValidationReport;
use crate::spectra::{NativeSpectrumReaders, SpectrumReaderFactory};
use crate::submission::{PxSubmissionChecker, SubmissionChecker};
use crate::xml_schema::{SchemaValidator, StructuralValidator};

pub mod mzid;
pub mod mztab;
pub mod px;

pub use mzid::MzIdValidator;
pub use mztab::MzTabValidator;
pub use px::PxFileValidator;

pub trait Validator {
    fn name(&self) -> &'static str;
    fn validate(&self) -> Result<ValidationReport>;
}

#[derive(Debug, Error)]
pub enum ValidatorError {
    #[error("no input selected: provide one of --px, --mzid or --mztab")]
    UnrecognizedInput,
    #[error("conflicting inputs: {} were all provided, expected exactly one", .0.join(", "))]
    ConflictingInputs(Vec<&'static str>),
    #[error("the provided {kind} file can't be found -- {}", path.display())]
    MissingFile { kind: &'static str, path: PathBuf },
}

/// Raw selector and option values, as they arrive from the command line.
#[derive(Debug, Clone, Default)]
pub struct InputSelection {
    pub px: Option<PathBuf>,
    pub mzid: Option<PathBuf>,
    pub mztab: Option<PathBuf>,
    pub peak: Vec<PathBuf>,
    pub peaks: Option<String>,
    pub skip_peak_validation: bool,
    pub unpack_dir: Option<PathBuf>,
    /// 0 = automatic.
    pub threads: usize,
    pub timeout: Option<Duration>,
    pub keep_intermediate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationTarget {
    Submission(PathBuf),
    Identification(PathBuf),
    Tabular(PathBuf),
}

impl ValidationTarget {
    pub fn from_selection(selection: &InputSelection) -> Result<Self, ValidatorError> {
        let mut picked = Vec::new();
        if let Some(p) = &selection.px {
            picked.push(("--px", Self::Submission(p.clone())));
        }
        if let Some(p) = &selection.mzid {
            picked.push(("--mzid", Self::Identification(p.clone())));
        }
        if let Some(p) = &selection.mztab {
            picked.push(("--mztab", Self::Tabular(p.clone())));
        }
        match picked.len() {
            0 => Err(ValidatorError::UnrecognizedInput),
            1 => Ok(picked.remove(0).1),
            _ => Err(ValidatorError::ConflictingInputs(
                picked.into_iter().map(|(flag, _)| flag).collect(),
            )),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Submission(p) | Self::Identification(p) | Self::Tabular(p) => p,
        }
    }

    pub fn format(&self) -> AssayFormat {
        match self {
            Self::Submission(_) => AssayFormat::Submission,
            Self::Identification(_) => AssayFormat::MzIdentMl,
            Self::Tabular(_) => AssayFormat::MzTab,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Submission(_) => "submission.px",
            Self::Identification(_) => "mzIdentML",
            Self::Tabular(_) => "mzTab",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationOptions {
    pub peak_files: Vec<PathBuf>,
    pub skip_peak_validation: bool,
    pub threads: usize,
    pub deadline: Deadline,
    pub intermediate: Option<PathBuf>,
}

/// The seams to the parsers and readers the engine does not own.
#[derive(Clone)]
pub struct Collaborators {
    pub compiler: Arc<dyn IdentificationCompiler>,
    pub schema: Arc<dyn SchemaValidator>,
    pub tabular: Arc<dyn TabularParser>,
    pub submission: Arc<dyn SubmissionChecker>,
    pub spectra: Arc<dyn SpectrumReaderFactory>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            compiler: Arc::new(NativeCompiler),
            schema: Arc::new(StructuralValidator),
            tabular: Arc::new(MzTabChecker),
            submission: Arc::new(PxSubmissionChecker),
            spectra: Arc::new(NativeSpectrumReaders),
        }
    }
}

/// Picks the validator, checks the selected file exists, resolves and unpacks
/// the inputs. The run deadline starts here.
pub fn build_validator(
    selection: &InputSelection,
    collaborators: Collaborators,
) -> Result<Box<dyn Validator>> {
    let target = ValidationTarget::from_selection(selection)?;
    if !target.path().is_file() {
        return Err(ValidatorError::MissingFile {
            kind: target.kind(),
            path: target.path().to_path_buf(),
        }
        .into());
    }
    let deadline = Deadline::from_timeout(selection.timeout);

    let peak_files = match target {
        ValidationTarget::Submission(_) => {
            if !selection.peak.is_empty() || selection.peaks.is_some() {
                warn!("peak files are ignored when validating a submission descriptor");
            }
            Vec::new()
        }
        _ if selection.skip_peak_validation => Vec::new(),
        _ => input::resolve_peak_files(&selection.peak, selection.peaks.as_deref())?,
    };
    let prepared = input::prepare(
        target.path(),
        &peak_files,
        selection.unpack_dir.as_deref(),
        selection.threads,
    )?;

    let intermediate = if selection.keep_intermediate {
        Some(intermediate_path(&prepared.main, selection.unpack_dir.as_deref()))
    } else {
        None
    };
    let options = ValidationOptions {
        peak_files: prepared.peak_files,
        skip_peak_validation: selection.skip_peak_validation,
        threads: selection.threads,
        deadline,
        intermediate,
    };

    info!(
        input = %prepared.main.display(),
        format = %target.format(),
        peak_files = options.peak_files.len(),
        "validator selected"
    );
    let validator: Box<dyn Validator> = match target {
        ValidationTarget::Submission(_) => {
            Box::new(PxFileValidator::new(prepared.main, options, collaborators))
        }
        ValidationTarget::Identification(_) => {
            Box::new(MzIdValidator::new(prepared.main, options, collaborators))
        }
        ValidationTarget::Tabular(_) => {
            Box::new(MzTabValidator::new(prepared.main, options, collaborators))
        }
    };
    Ok(validator)
}

/// `<name>.compiled.json` beside the input, or in `unpack_dir`.
pub fn intermediate_path(input: &Path, unpack_dir: Option<&Path>) -> PathBuf {
    let mut name = input
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".compiled.json");
    match unpack_dir {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    }
}
