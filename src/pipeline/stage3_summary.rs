use anyhow::{Context, Result};
use tracing::info;

use crate::ctx::Ctx;
use crate::pipeline::{Stage, StageOutcome};
use crate::report::AssaySummary;

pub struct Stage3Summary;

impl Stage3Summary {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage3Summary {
    fn name(&self) -> &'static str {
        "stage3_summary"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<StageOutcome> {
        let compiled = ctx.compiled.as_ref().context("identifications not compiled")?;
        let summary = AssaySummary {
            proteins: compiled.protein_count,
            peptides: compiled.peptide_count,
            psms: compiled.psm_count(),
            peak_files: compiled.spectra_data.len(),
        };
        info!(
            proteins = summary.proteins,
            peptides = summary.peptides,
            psms = summary.psms,
            peak_files = summary.peak_files,
            "assay_summary"
        );

        ctx.report.assay_file = ctx
            .input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        ctx.report.file_size = std::fs::metadata(&ctx.input).map(|m| m.len()).ok();
        ctx.report.summary = Some(summary);
        Ok(StageOutcome::Continue)
    }
}
