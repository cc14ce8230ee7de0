//! `submission.px` descriptor checks.
//!
//! ```text
//! MTD  submitter_name  Jane Doe
//! FMH  file_id  file_type  file_path  file_mapping
//! FME  1        RESULT     a.mzid     2
//! FME  2        PEAK       a.mgf
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::report::Issue;

pub const MANDATORY_FIELDS: &[&str] = &[
    "submitter_name",
    "submitter_email",
    "project_title",
    "project_description",
    "submission_type",
];
pub const SUBMISSION_TYPES: &[&str] = &["COMPLETE", "PARTIAL", "PRIDE"];
pub const FILE_TYPES: &[&str] = &[
    "RESULT",
    "PEAK",
    "SEARCH",
    "RAW",
    "QUANTIFICATION",
    "GEL",
    "FASTA",
    "SPECTRUM_LIBRARY",
    "OTHER",
];
const MIN_TITLE_LEN: usize = 30;
const MIN_DESCRIPTION_LEN: usize = 50;

pub trait SubmissionChecker: Send + Sync {
    fn check(&self, path: &Path) -> Result<Vec<Issue>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionFile {
    pub id: String,
    pub file_type: String,
    pub path: String,
    pub mappings: Vec<String>,
}

#[derive(Debug, Default, Clone)]
pub struct Submission {
    pub metadata: HashMap<String, String>,
    pub files: Vec<SubmissionFile>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PxSubmissionChecker;

impl SubmissionChecker for PxSubmissionChecker {
    fn check(&self, path: &Path) -> Result<Vec<Issue>> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let (submission, mut issues) = parse_submission(&text);
        let base = path.parent().unwrap_or(Path::new("."));
        issues.extend(check_submission(&submission, base));
        info!(file = %path.display(), files = submission.files.len(), issues = issues.len(), "submission_checked");
        Ok(issues)
    }
}

/// Line-level problems come back as ERROR issues next to what could be read.
pub fn parse_submission(text: &str) -> (Submission, Vec<Issue>) {
    let mut submission = Submission::default();
    let mut issues = Vec::new();
    let mut header: Option<Vec<String>> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        if raw.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = raw.split('\t').map(str::trim).collect();
        match fields[0] {
            "COM" => {}
            "MTD" => {
                if fields.len() < 3 || fields[1].is_empty() {
                    issues.push(Issue::error(format!(
                        "[line {}] MTD line requires a key and a value",
                        line_no
                    )));
                    continue;
                }
                submission
                    .metadata
                    .insert(fields[1].to_string(), fields[2..].join("\t"));
            }
            "FMH" => {
                header = Some(fields[1..].iter().map(|f| f.to_ascii_lowercase()).collect());
            }
            "FME" => {
                let Some(columns) = header.as_ref() else {
                    issues.push(Issue::error(format!(
                        "[line {}] FME line appears before the FMH header",
                        line_no
                    )));
                    continue;
                };
                let value = |name: &str| {
                    columns
                        .iter()
                        .position(|c| c == name)
                        .and_then(|i| fields.get(i + 1))
                        .map(|v| v.to_string())
                        .unwrap_or_default()
                };
                let mappings = value("file_mapping")
                    .split(',')
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .map(str::to_string)
                    .collect();
                submission.files.push(SubmissionFile {
                    id: value("file_id"),
                    file_type: value("file_type").to_ascii_uppercase(),
                    path: value("file_path"),
                    mappings,
                });
            }
            other => issues.push(Issue::error(format!(
                "[line {}] unknown line prefix '{}'",
                line_no, other
            ))),
        }
    }

    (submission, issues)
}

/// Relative file paths resolve against `base`.
pub fn check_submission(submission: &Submission, base: &Path) -> Vec<Issue> {
    let mut issues = Vec::new();
    let meta = &submission.metadata;

    for field in MANDATORY_FIELDS {
        if meta.get(*field).is_none_or(|v| v.trim().is_empty()) {
            issues.push(Issue::error(format!("mandatory field '{}' is missing", field)));
        }
    }
    if let Some(email) = meta.get("submitter_email").filter(|v| !v.trim().is_empty()) {
        if !is_valid_email(email) {
            issues.push(Issue::error(format!("submitter_email '{}' is not a valid email", email)));
        }
    }
    let submission_type = meta
        .get("submission_type")
        .map(|v| v.trim().to_ascii_uppercase());
    if let Some(kind) = submission_type.as_deref().filter(|k| !k.is_empty()) {
        if !SUBMISSION_TYPES.contains(&kind) {
            issues.push(Issue::error(format!("unknown submission_type '{}'", kind)));
        }
    }
    if let Some(title) = meta.get("project_title").filter(|v| !v.trim().is_empty()) {
        if title.trim().chars().count() < MIN_TITLE_LEN {
            issues.push(Issue::warning(format!(
                "project_title is shorter than {} characters",
                MIN_TITLE_LEN
            )));
        }
    }
    if let Some(desc) = meta.get("project_description").filter(|v| !v.trim().is_empty()) {
        if desc.trim().chars().count() < MIN_DESCRIPTION_LEN {
            issues.push(Issue::warning(format!(
                "project_description is shorter than {} characters",
                MIN_DESCRIPTION_LEN
            )));
        }
    }

    let mut ids = HashSet::new();
    let mut by_type: BTreeMap<&str, usize> = BTreeMap::new();
    for file in &submission.files {
        if !ids.insert(file.id.as_str()) {
            issues.push(Issue::error(format!("duplicate file_id '{}'", file.id)));
        }
        if FILE_TYPES.contains(&file.file_type.as_str()) {
            *by_type.entry(file.file_type.as_str()).or_default() += 1;
        } else {
            issues.push(Issue::error(format!(
                "file '{}' has unknown file_type '{}'",
                file.id, file.file_type
            )));
        }
    }
    for file in &submission.files {
        for mapping in &file.mappings {
            if !ids.contains(mapping.as_str()) {
                issues.push(Issue::error(format!(
                    "file '{}' maps to undeclared file_id '{}'",
                    file.id, mapping
                )));
            }
        }
        if !file.path.is_empty() && !resolve(base, &file.path).exists() {
            issues.push(Issue::warning(format!(
                "file '{}' not found at {}",
                file.id, file.path
            )));
        }
    }

    if submission_type.as_deref() == Some("COMPLETE") && !by_type.contains_key("RESULT") {
        issues.push(Issue::error("a COMPLETE submission must list at least one RESULT file"));
    }

    issues
}

fn resolve(base: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() { p.to_path_buf() } else { base.join(p) }
}

fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.contains(char::is_whitespace)
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
