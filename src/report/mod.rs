//! Validation report model.
//!
//! A [`Report`] is an append-only list of issues. [`ResultReport`] composes one with
//! the assay summary and the per-peak-file outcomes. [`ValidationReport`] is what a
//! validator hands back.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
            Self::Info => "INFO",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub cause: String,
    pub severity: Severity,
}

impl Issue {
    pub fn new(cause: impl Into<String>, severity: Severity) -> Self {
        Self {
            cause: cause.into(),
            severity,
        }
    }

    pub fn error(cause: impl Into<String>) -> Self {
        Self::new(cause, Severity::Error)
    }

    pub fn warning(cause: impl Into<String>) -> Self {
        Self::new(cause, Severity::Warning)
    }

    pub fn info(cause: impl Into<String>) -> Self {
        Self::new(cause, Severity::Info)
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} == Level Error: {} ==", self.cause, self.severity)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    issues: Vec<Issue>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    pub fn add_issue(&mut self, cause: impl Into<String>, severity: Severity) {
        self.add(Issue::new(cause, severity));
    }

    pub fn extend<I: IntoIterator<Item = Issue>>(&mut self, issues: I) {
        self.issues.extend(issues);
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for issue in &self.issues {
            writeln!(f, "{issue}")?;
        }
        if self.is_valid() {
            writeln!(f, "Status : Valid")
        } else {
            writeln!(f, "Status : Invalid")
        }
    }
}

/// One sampled identification and what the raw file said about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckedSpectrum {
    pub psm_id: u64,
    pub source_id: String,
    pub expected_mz: f64,
    pub observed_mz: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeakReport {
    pub peak_file: String,
    pub file_size: u64,
    /// Total PSM count of the whole identification file, not a per-file count.
    pub claimed_spectra: usize,
    /// False when the reference could not be tied to exactly one peak file.
    pub mapped: bool,
    pub detected: Vec<CheckedSpectrum>,
    pub undetected: Vec<CheckedSpectrum>,
}

impl PeakReport {
    pub fn checked(&self) -> usize {
        self.detected.len() + self.undetected.len()
    }
}

impl fmt::Display for PeakReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Peak File : {}\tFile Size : {}\tNumber Of Peaks : {}\tNumber Of detected peaks : {}\tNumber Of undetected peaks : {}",
            self.peak_file,
            self.file_size,
            self.claimed_spectra,
            self.detected.len(),
            self.undetected.len()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssaySummary {
    pub proteins: usize,
    pub peptides: usize,
    pub psms: usize,
    pub peak_files: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultReport {
    pub report: Report,
    pub assay_file: Option<String>,
    pub file_size: Option<u64>,
    pub valid_schema: bool,
    /// Only set once the structural stage finished without errors.
    pub summary: Option<AssaySummary>,
    pub peak_reports: Vec<PeakReport>,
}

impl ResultReport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl fmt::Display for ResultReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.report)?;
        let summary = self.summary.as_ref();
        writeln!(
            f,
            "Assay file : {}",
            self.assay_file.as_deref().unwrap_or(NOT_AVAILABLE)
        )?;
        writeln!(f, "Assay file size: {}", self.file_size.unwrap_or(0))?;
        writeln!(f, "Valid Schema : {}", self.valid_schema)?;
        writeln!(
            f,
            "Number of reported proteins : {}",
            summary.map_or(0, |s| s.proteins)
        )?;
        writeln!(
            f,
            "Number of reported peptides : {}",
            summary.map_or(0, |s| s.peptides)
        )?;
        writeln!(
            f,
            "Number of reported PSMs : {}",
            summary.map_or(0, |s| s.psms)
        )?;
        writeln!(
            f,
            "Number of peak files : {}",
            summary.map_or(0, |s| s.peak_files)
        )?;
        for peak in &self.peak_reports {
            writeln!(f, "{peak}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationReport {
    Submission(Report),
    Result(ResultReport),
}

impl ValidationReport {
    pub fn issues(&self) -> &Report {
        match self {
            Self::Submission(report) => report,
            Self::Result(result) => &result.report,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.issues().is_valid()
    }

    pub fn error_count(&self) -> usize {
        self.issues().error_count()
    }

    pub fn as_result(&self) -> Option<&ResultReport> {
        match self {
            Self::Result(result) => Some(result),
            Self::Submission(_) => None,
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submission(report) => write!(f, "{report}"),
            Self::Result(result) => write!(f, "{result}"),
        }
    }
}
