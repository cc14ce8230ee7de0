use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::ctx::Ctx;
use crate::cv::SpectrumFileFormat;
use crate::peaks::CrossValidator;
use crate::pipeline::{Stage, StageOutcome};
use crate::spectra::SpectrumService;

pub struct Stage6CrossValidate;

impl Stage6CrossValidate {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage6CrossValidate {
    fn name(&self) -> &'static str {
        "stage6_cross_validate"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<StageOutcome> {
        let compiled = ctx.compiled.as_ref().context("identifications not compiled")?;

        let mut files: Vec<(PathBuf, SpectrumFileFormat)> = Vec::new();
        for binding in &ctx.bindings {
            if !files.iter().any(|(p, _)| p == &binding.path) {
                files.push((binding.path.clone(), binding.format));
            }
        }
        let service = SpectrumService::open_all(ctx.collaborators.spectra.as_ref(), &files);

        let validator = CrossValidator::new(compiled, &ctx.bindings, &service, ctx.deadline);
        let reports = validator.validate(&ctx.samples, ctx.threads)?;
        ctx.report.peak_reports = reports;
        Ok(StageOutcome::Continue)
    }
}
