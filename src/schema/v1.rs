use serde::{Deserialize, Serialize};

use crate::ident::AssayFormat;
use crate::report::ValidationReport;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputMeta {
    pub path: String,
    pub format: AssayFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PxValidationV1 {
    pub tool: String,
    pub version: String,
    pub schema_version: String,
    pub input: InputMeta,
    pub valid: bool,
    pub errors: usize,
    pub report: ValidationReport,
}
