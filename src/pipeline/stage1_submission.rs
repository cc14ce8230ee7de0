use anyhow::Result;
use tracing::info;

use crate::ctx::Ctx;
use crate::pipeline::{Stage, StageOutcome};
use crate::report::Issue;

pub struct Stage1Submission;

impl Stage1Submission {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage1Submission {
    fn name(&self) -> &'static str {
        "stage1_submission"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<StageOutcome> {
        match ctx.collaborators.submission.check(&ctx.input) {
            Ok(issues) => ctx.report.report.extend(issues),
            Err(err) => ctx.report.report.add(Issue::error(format!("{:#}", err))),
        }
        info!(
            issues = ctx.report.report.issue_count(),
            errors = ctx.report.report.error_count(),
            "submission_descriptor_checked"
        );
        Ok(StageOutcome::Halt)
    }
}
