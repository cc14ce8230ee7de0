use std::path::PathBuf;

use anyhow::Result;

use crate::ctx::Ctx;
use crate::ident::AssayFormat;
use crate::pipeline::Pipeline;
use crate::pipeline::stage1_submission::Stage1Submission;
use crate::report::ValidationReport;
use crate::validators::{Collaborators, ValidationOptions, Validator};

pub struct PxFileValidator {
    input: PathBuf,
    options: ValidationOptions,
    collaborators: Collaborators,
}

impl PxFileValidator {
    pub fn new(input: PathBuf, options: ValidationOptions, collaborators: Collaborators) -> Self {
        Self {
            input,
            options,
            collaborators,
        }
    }
}

impl Validator for PxFileValidator {
    fn name(&self) -> &'static str {
        "px"
    }

    fn validate(&self) -> Result<ValidationReport> {
        let mut ctx = Ctx::new(
            self.input.clone(),
            AssayFormat::Submission,
            self.options.clone(),
            self.collaborators.clone(),
        );
        Pipeline::new(vec![Box::new(Stage1Submission::new())]).run(&mut ctx)?;
        Ok(ValidationReport::Submission(ctx.report.report))
    }
}
