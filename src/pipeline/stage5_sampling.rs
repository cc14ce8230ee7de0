use anyhow::{Context, Result};
use tracing::info;

use crate::ctx::Ctx;
use crate::pipeline::{Stage, StageOutcome};
use crate::sampling::select_samples;

pub struct Stage5Sampling;

impl Stage5Sampling {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage5Sampling {
    fn name(&self) -> &'static str {
        "stage5_sampling"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<StageOutcome> {
        let compiled = ctx.compiled.as_ref().context("identifications not compiled")?;
        ctx.samples = select_samples(&compiled.psms);
        for group in &ctx.samples {
            info!(
                reference = %group.reference,
                identified = group.total,
                sampled = group.record_indices.len(),
                "group_sampled"
            );
        }
        Ok(StageOutcome::Continue)
    }
}
