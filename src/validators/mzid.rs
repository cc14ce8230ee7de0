use std::path::PathBuf;

use anyhow::Result;

use crate::ctx::Ctx;
use crate::ident::AssayFormat;
use crate::pipeline::stage1_structure::Stage1Schema;
use crate::pipeline::stage2_compile::Stage2Compile;
use crate::pipeline::stage3_summary::Stage3Summary;
use crate::pipeline::stage4_peak_refs::Stage4PeakRefs;
use crate::pipeline::stage5_sampling::Stage5Sampling;
use crate::pipeline::stage6_cross_validate::Stage6CrossValidate;
use crate::pipeline::{Pipeline, Stage};
use crate::report::ValidationReport;
use crate::validators::{Collaborators, ValidationOptions, Validator};

pub struct MzIdValidator {
    input: PathBuf,
    options: ValidationOptions,
    collaborators: Collaborators,
}

impl MzIdValidator {
    pub fn new(input: PathBuf, options: ValidationOptions, collaborators: Collaborators) -> Self {
        Self {
            input,
            options,
            collaborators,
        }
    }
}

impl Validator for MzIdValidator {
    fn name(&self) -> &'static str {
        "mzid"
    }

    fn validate(&self) -> Result<ValidationReport> {
        let mut ctx = Ctx::new(
            self.input.clone(),
            AssayFormat::MzIdentMl,
            self.options.clone(),
            self.collaborators.clone(),
        );
        let mut stages: Vec<Box<dyn Stage>> = vec![
            Box::new(Stage1Schema::new()),
            Box::new(Stage2Compile::new()),
            Box::new(Stage3Summary::new()),
        ];
        if !ctx.skip_peak_validation {
            stages.push(Box::new(Stage4PeakRefs::new()));
            stages.push(Box::new(Stage5Sampling::new()));
            stages.push(Box::new(Stage6CrossValidate::new()));
        }
        Pipeline::new(stages).run(&mut ctx)?;
        Ok(ValidationReport::Result(ctx.report))
    }
}
