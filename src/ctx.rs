use std::path::PathBuf;

use crate::ident::{AssayFormat, CompiledIdentifications};
use crate::peaks::PeakFileBinding;
use crate::pipeline::Deadline;
use crate::report::ResultReport;
use crate::sampling::SampledGroup;
use crate::validators::{Collaborators, ValidationOptions};

pub struct Ctx {
    pub input: PathBuf,
    pub format: AssayFormat,
    pub peak_files: Vec<PathBuf>,
    pub skip_peak_validation: bool,
    pub threads: usize,
    pub deadline: Deadline,
    /// Where the compiled identifications are persisted, if requested.
    pub intermediate: Option<PathBuf>,
    pub collaborators: Collaborators,

    pub compiled: Option<CompiledIdentifications>,
    pub bindings: Vec<PeakFileBinding>,
    pub samples: Vec<SampledGroup>,
    pub report: ResultReport,
}

impl Ctx {
    pub fn new(
        input: PathBuf,
        format: AssayFormat,
        options: ValidationOptions,
        collaborators: Collaborators,
    ) -> Self {
        Self {
            input,
            format,
            peak_files: options.peak_files,
            skip_peak_validation: options.skip_peak_validation,
            threads: options.threads,
            deadline: options.deadline,
            intermediate: options.intermediate,
            collaborators,
            compiled: None,
            bindings: Vec::new(),
            samples: Vec::new(),
            report: ResultReport::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        self.report.report.error_count() > 0
    }
}
