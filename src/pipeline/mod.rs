use anyhow::{Result, bail};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::ctx::Ctx;

pub mod stage1_structure;
pub mod stage1_submission;
pub mod stage2_compile;
pub mod stage3_summary;
pub mod stage4_peak_refs;
pub mod stage5_sampling;
pub mod stage6_cross_validate;

/// Whether later stages still run. `Halt` is a gate, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    Continue,
    Halt,
}

pub trait Stage {
    fn name(&self) -> &'static str;
    fn run(&self, ctx: &mut Ctx) -> Result<StageOutcome>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    pub fn none() -> Self {
        Self { at: None }
    }

    pub fn after(timeout: Duration) -> Self {
        Self {
            at: Some(Instant::now() + timeout),
        }
    }

    pub fn from_timeout(timeout: Option<Duration>) -> Self {
        timeout.map(Self::after).unwrap_or_default()
    }

    pub fn check(&self, what: &str) -> Result<()> {
        if let Some(at) = self.at {
            if Instant::now() >= at {
                bail!("deadline exceeded before {}", what);
            }
        }
        Ok(())
    }
}

pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    pub fn run(&self, ctx: &mut Ctx) -> Result<()> {
        for stage in &self.stages {
            ctx.deadline.check(stage.name())?;
            let start = Instant::now();
            info!(stage = stage.name(), "stage started");
            let outcome = match stage.run(ctx) {
                Ok(outcome) => outcome,
                Err(err) => {
                    let elapsed_ms = start.elapsed().as_millis();
                    warn!(
                        stage = stage.name(),
                        elapsed_ms = elapsed_ms as u64,
                        "stage failed"
                    );
                    return Err(err);
                }
            };
            let elapsed_ms = start.elapsed().as_millis();
            info!(
                stage = stage.name(),
                elapsed_ms = elapsed_ms as u64,
                "stage finished"
            );
            if outcome == StageOutcome::Halt {
                info!(
                    stage = stage.name(),
                    errors = ctx.report.report.error_count(),
                    "pipeline halted"
                );
                break;
            }
        }
        Ok(())
    }
}
