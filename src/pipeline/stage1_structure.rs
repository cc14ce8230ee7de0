use anyhow::Result;
use tracing::info;

use crate::ctx::Ctx;
use crate::io::open_maybe_gz;
use crate::pipeline::{Stage, StageOutcome};
use crate::report::Issue;
use crate::xml_schema::{MZID_ROOT, read_root, select_schema};

/// mzIdentML schema gate. Any ERROR ends the run with only these issues.
pub struct Stage1Schema;

impl Stage1Schema {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage1Schema {
    fn name(&self) -> &'static str {
        "stage1_schema"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<StageOutcome> {
        let root = match read_root(&ctx.input) {
            Ok(Some(root)) => root,
            Ok(None) => {
                ctx.report
                    .report
                    .add(Issue::error(format!("{} has no root element", ctx.input.display())));
                return Ok(StageOutcome::Halt);
            }
            Err(err) => {
                ctx.report.report.add(Issue::error(format!("{:#}", err)));
                return Ok(StageOutcome::Halt);
            }
        };

        let Some(version) = root.version.as_deref() else {
            ctx.report.report.add(Issue::error(format!(
                "{} root element carries no version attribute",
                root.name
            )));
            return Ok(StageOutcome::Halt);
        };
        let Some(schema) = select_schema(version) else {
            ctx.report.report.add(Issue::error(format!(
                "unsupported {} version '{}'",
                MZID_ROOT, version
            )));
            return Ok(StageOutcome::Halt);
        };

        let source = open_maybe_gz(&ctx.input)?;
        match ctx.collaborators.schema.validate(source, &schema) {
            Ok(messages) => {
                ctx.report
                    .report
                    .extend(messages.into_iter().map(Issue::error));
            }
            Err(err) => ctx.report.report.add(Issue::error(format!("{:#}", err))),
        }

        info!(
            schema = schema.uri,
            errors = ctx.report.report.error_count(),
            "schema_checked"
        );
        if ctx.has_errors() {
            return Ok(StageOutcome::Halt);
        }
        ctx.report.valid_schema = true;
        Ok(StageOutcome::Continue)
    }
}

/// mzTab parser gate. Severities come from the parser; only ERRORs stop the run.
pub struct Stage1Tabular;

impl Stage1Tabular {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage1Tabular {
    fn name(&self) -> &'static str {
        "stage1_tabular"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<StageOutcome> {
        match ctx.collaborators.tabular.parse(&ctx.input) {
            Ok(issues) => ctx.report.report.extend(issues),
            Err(err) => ctx.report.report.add(Issue::error(format!("{:#}", err))),
        }
        info!(
            issues = ctx.report.report.issue_count(),
            errors = ctx.report.report.error_count(),
            "tabular_checked"
        );
        if ctx.has_errors() {
            return Ok(StageOutcome::Halt);
        }
        ctx.report.valid_schema = true;
        Ok(StageOutcome::Continue)
    }
}
