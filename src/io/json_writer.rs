use std::path::Path;

use anyhow::{Context, Result};

use crate::ident::AssayFormat;
use crate::report::ValidationReport;
use crate::schema::v1::{InputMeta, PxValidationV1};

pub fn build_report(input: &Path, format: AssayFormat, report: &ValidationReport) -> PxValidationV1 {
    PxValidationV1 {
        tool: "kira-pxvalidator".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        schema_version: "v1".to_string(),
        input: InputMeta {
            path: input.display().to_string(),
            format,
        },
        valid: report.is_valid(),
        errors: report.error_count(),
        report: report.clone(),
    }
}

pub fn write_json(
    path: &Path,
    input: &Path,
    format: AssayFormat,
    report: &ValidationReport,
) -> Result<()> {
    let envelope = build_report(input, format, report);
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &envelope)?;
    Ok(())
}
