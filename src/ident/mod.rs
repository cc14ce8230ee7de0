use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cv::{SpectrumFileFormat, SpectrumIdFormat};
use crate::report::Issue;

pub mod mzid;
pub mod mztab;

/// Declared type of the file handed to a validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssayFormat {
    MzIdentMl,
    MzTab,
    Submission,
}

impl AssayFormat {
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::MzIdentMl => "mzid",
            Self::MzTab => "mztab",
            Self::Submission => "px",
        }
    }
}

impl fmt::Display for AssayFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentificationRecord {
    pub id: u64,
    pub spectra_data_ref: String,
    pub source_id: String,
    pub spectrum_title: Option<String>,
    pub mass_to_charge: f64,
    pub charge: Option<i32>,
    pub peptide: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectraFileDescriptor {
    pub id: String,
    pub location: Option<String>,
    pub name: Option<String>,
    pub id_format_accession: Option<String>,
    pub file_format_accession: Option<String>,
    pub file_format: SpectrumFileFormat,
}

impl SpectraFileDescriptor {
    pub fn id_format(&self) -> SpectrumIdFormat {
        self.id_format_accession
            .as_deref()
            .map(SpectrumIdFormat::from_accession)
            .unwrap_or(SpectrumIdFormat::None)
    }

    pub fn classify(&mut self) {
        self.file_format = SpectrumFileFormat::classify(
            self.file_format_accession.as_deref(),
            self.location.as_deref(),
            self.name.as_deref(),
        );
    }
}

/// Everything the engine needs from a compiled identification file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompiledIdentifications {
    pub protein_count: usize,
    pub peptide_count: usize,
    /// In insertion order, ids ascending.
    pub psms: Vec<IdentificationRecord>,
    pub spectra_data: Vec<SpectraFileDescriptor>,
    /// Declared spectra-data id to the reference the records carry.
    pub original_ids: HashMap<String, String>,
}

impl CompiledIdentifications {
    pub fn psm_count(&self) -> usize {
        self.psms.len()
    }

    pub fn reference_for(&self, descriptor: &SpectraFileDescriptor) -> Option<&str> {
        self.original_ids.get(&descriptor.id).map(String::as_str)
    }

    pub fn write_intermediate(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

pub trait IdentificationCompiler: Send + Sync {
    fn compile(&self, path: &Path, format: AssayFormat) -> Result<CompiledIdentifications>;
}

/// Line-level checker for tabular result files. Severities come from the parser.
pub trait TabularParser: Send + Sync {
    fn parse(&self, path: &Path) -> Result<Vec<Issue>>;
}

/// Streaming readers for mzIdentML and mzTab.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeCompiler;

impl IdentificationCompiler for NativeCompiler {
    fn compile(&self, path: &Path, format: AssayFormat) -> Result<CompiledIdentifications> {
        match format {
            AssayFormat::MzIdentMl => mzid::compile_mzid(path),
            AssayFormat::MzTab => mztab::compile_mztab(path),
            AssayFormat::Submission => {
                anyhow::bail!("submission descriptors carry no identifications")
            }
        }
    }
}
