use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::ctx::Ctx;
use crate::peaks::{bind_peak_files, peak_reference_errors};
use crate::pipeline::{Stage, StageOutcome};

/// Every supplied peak file must be declared by the identification file.
pub struct Stage4PeakRefs;

impl Stage4PeakRefs {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage4PeakRefs {
    fn name(&self) -> &'static str {
        "stage4_peak_refs"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<StageOutcome> {
        if ctx.peak_files.is_empty() {
            warn!("no peak files supplied, cross-validation skipped");
            return Ok(StageOutcome::Halt);
        }

        let compiled = ctx.compiled.as_ref().context("identifications not compiled")?;
        let errors = peak_reference_errors(&ctx.peak_files, &compiled.spectra_data);
        if !errors.is_empty() {
            ctx.report.report.extend(errors);
            return Ok(StageOutcome::Halt);
        }

        ctx.bindings = bind_peak_files(&ctx.peak_files, &compiled.spectra_data);
        info!(
            peak_files = ctx.peak_files.len(),
            bindings = ctx.bindings.len(),
            "peak_files_bound"
        );
        Ok(StageOutcome::Continue)
    }
}
