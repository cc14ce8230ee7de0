//! Raw peak file access.
//!
//! Readers only index what a lookup needs: id, 1-based position, precursor m/z.
//! Sessions are opened once per run and only read afterwards.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::cv::SpectrumFileFormat;

pub mod mgf;
pub mod ms2;
pub mod mzml;

#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    pub id: String,
    /// 1-based position in the file.
    pub index: usize,
    pub precursor_mz: Option<f64>,
}

#[derive(Debug, Error)]
pub enum SpectrumReadError {
    #[error("error parsing the following accession -- {0}")]
    MalformedId(String),
    #[error("spectrum '{id}' not found in {}", file.display())]
    NotFound { id: String, file: PathBuf },
    #[error("index {index} out of range for {} ({len} spectra)", file.display())]
    IndexOutOfRange {
        index: usize,
        len: usize,
        file: PathBuf,
    },
    #[error("peak file format {format} is not readable: {}", path.display())]
    UnsupportedFormat {
        format: SpectrumFileFormat,
        path: PathBuf,
    },
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
    #[error("no reading session for {}", .0.display())]
    NoSession(PathBuf),
}

pub trait SpectrumReader: Send + Sync {
    fn spectrum_by_id(&self, id: &str) -> Result<Spectrum, SpectrumReadError>;
    /// 1-based.
    fn spectrum_by_index(&self, index: usize) -> Result<Spectrum, SpectrumReadError>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub trait SpectrumReaderFactory: Send + Sync {
    fn open(
        &self,
        path: &Path,
        format: SpectrumFileFormat,
    ) -> Result<Box<dyn SpectrumReader>, SpectrumReadError>;
}

/// In-memory lookup tables shared by the built-in readers.
#[derive(Debug, Clone)]
pub struct SpectrumIndex {
    file: PathBuf,
    spectra: Vec<Spectrum>,
    ids: HashMap<String, usize>,
    aliases: HashMap<String, usize>,
    positional: bool,
}

impl SpectrumIndex {
    /// `positional` lets numeric ids fall back to a 1-based position.
    pub fn new(file: &Path, positional: bool) -> Self {
        Self {
            file: file.to_path_buf(),
            spectra: Vec::new(),
            ids: HashMap::new(),
            aliases: HashMap::new(),
            positional,
        }
    }

    /// First occurrence of a duplicated id or alias wins.
    pub fn push(&mut self, spectrum: Spectrum, aliases: &[String]) {
        let pos = self.spectra.len();
        self.ids.entry(spectrum.id.clone()).or_insert(pos);
        for alias in aliases {
            self.aliases.entry(alias.clone()).or_insert(pos);
        }
        self.spectra.push(spectrum);
    }

    fn not_found(&self, id: &str) -> SpectrumReadError {
        SpectrumReadError::NotFound {
            id: id.to_string(),
            file: self.file.clone(),
        }
    }
}

impl SpectrumReader for SpectrumIndex {
    fn spectrum_by_id(&self, id: &str) -> Result<Spectrum, SpectrumReadError> {
        let key = id.trim();
        if let Some(&pos) = self.ids.get(key) {
            return Ok(self.spectra[pos].clone());
        }
        if let Some(&pos) = self.aliases.get(key) {
            return Ok(self.spectra[pos].clone());
        }
        if self.positional {
            if let Ok(index) = key.parse::<usize>() {
                return self.spectrum_by_index(index).map_err(|_| self.not_found(id));
            }
        }
        Err(self.not_found(id))
    }

    fn spectrum_by_index(&self, index: usize) -> Result<Spectrum, SpectrumReadError> {
        if index == 0 || index > self.spectra.len() {
            return Err(SpectrumReadError::IndexOutOfRange {
                index,
                len: self.spectra.len(),
                file: self.file.clone(),
            });
        }
        Ok(self.spectra[index - 1].clone())
    }

    fn len(&self) -> usize {
        self.spectra.len()
    }
}

/// MGF, MS2 and mzML readers. Everything else is unsupported.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeSpectrumReaders;

impl SpectrumReaderFactory for NativeSpectrumReaders {
    fn open(
        &self,
        path: &Path,
        format: SpectrumFileFormat,
    ) -> Result<Box<dyn SpectrumReader>, SpectrumReadError> {
        let index = match format {
            SpectrumFileFormat::Mgf => mgf::read_mgf(path)?,
            SpectrumFileFormat::Ms2 => ms2::read_ms2(path)?,
            SpectrumFileFormat::Mzml => mzml::read_mzml(path)?,
            other => {
                return Err(SpectrumReadError::UnsupportedFormat {
                    format: other,
                    path: path.to_path_buf(),
                });
            }
        };
        Ok(Box::new(index))
    }
}

/// Reading sessions keyed by absolute path.
#[derive(Default)]
pub struct SpectrumService {
    sessions: HashMap<PathBuf, Box<dyn SpectrumReader>>,
}

impl SpectrumService {
    /// Opens every file once. A file that fails to open gets no session and is
    /// reported later as `NoSession`.
    pub fn open_all(
        factory: &dyn SpectrumReaderFactory,
        files: &[(PathBuf, SpectrumFileFormat)],
    ) -> Self {
        let mut sessions = HashMap::new();
        for (path, format) in files {
            let key = session_key(path);
            if sessions.contains_key(&key) {
                continue;
            }
            match factory.open(path, *format) {
                Ok(reader) => {
                    info!(file = %path.display(), spectra = reader.len(), "peak_file_opened");
                    sessions.insert(key, reader);
                }
                Err(err) => {
                    warn!(file = %path.display(), error = %err, "peak_file_unreadable");
                }
            }
        }
        Self { sessions }
    }

    pub fn session(&self, path: &Path) -> Result<&dyn SpectrumReader, SpectrumReadError> {
        self.sessions
            .get(&session_key(path))
            .map(|r| r.as_ref())
            .ok_or_else(|| SpectrumReadError::NoSession(path.to_path_buf()))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

fn session_key(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

pub(crate) fn io_error(path: &Path, source: std::io::Error) -> SpectrumReadError {
    SpectrumReadError::Io {
        path: path.to_path_buf(),
        source,
    }
}
