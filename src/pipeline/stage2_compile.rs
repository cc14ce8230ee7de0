use anyhow::Result;
use tracing::{info, warn};

use crate::ctx::Ctx;
use crate::pipeline::{Stage, StageOutcome};
use crate::report::Issue;

pub struct Stage2Compile;

impl Stage2Compile {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage2Compile {
    fn name(&self) -> &'static str {
        "stage2_compile"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<StageOutcome> {
        let compiled = match ctx.collaborators.compiler.compile(&ctx.input, ctx.format) {
            Ok(compiled) => compiled,
            Err(err) => {
                ctx.report.report.add(Issue::error(format!(
                    "failed to compile {}: {:#}",
                    ctx.input.display(),
                    err
                )));
                return Ok(StageOutcome::Halt);
            }
        };

        if let Some(path) = &ctx.intermediate {
            compiled.write_intermediate(path)?;
            info!(path = %path.display(), "intermediate_written");
        }
        if compiled.psms.is_empty() {
            warn!(input = %ctx.input.display(), "no identifications reported");
        }

        ctx.compiled = Some(compiled);
        Ok(StageOutcome::Continue)
    }
}
