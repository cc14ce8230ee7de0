use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use quick_xml::events::{BytesStart, Event};
use tracing::info;

use crate::cv::{SPECTRUM_TITLE_ACCESSION, SpectrumFileFormat};
use crate::ident::{CompiledIdentifications, IdentificationRecord, SpectraFileDescriptor};
use crate::io::xml::{attr, open_xml};

#[derive(Debug, Default)]
struct PendingItem {
    mass_to_charge: f64,
    charge: Option<i32>,
    peptide_ref: Option<String>,
    evidence_refs: Vec<String>,
}

#[derive(Debug, Default)]
struct PendingResult {
    spectrum_id: String,
    spectra_data_ref: String,
    title: Option<String>,
    items: Vec<PendingItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CvScope {
    None,
    FileFormat,
    SpectrumIdFormat,
}

#[derive(Default)]
struct MzidState {
    spectra_data: Vec<SpectraFileDescriptor>,
    current_spectra_data: Option<SpectraFileDescriptor>,
    db_accessions: HashMap<String, String>,
    peptide_sequences: HashMap<String, String>,
    current_peptide: Option<String>,
    in_peptide_sequence: bool,
    evidence_db: HashMap<String, String>,
    current_result: Option<PendingResult>,
    current_item: Option<PendingItem>,
    results: Vec<PendingResult>,
}

pub fn compile_mzid(path: &Path) -> Result<CompiledIdentifications> {
    let mut reader = open_xml(path)?;
    let mut state = MzidState::default();
    let mut scope = CvScope::None;
    let mut buf = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .with_context(|| format!("malformed mzIdentML at byte {}", reader.buffer_position()))?;
        match event {
            Event::Start(ref e) => {
                scope = state.open(e, scope)?;
            }
            Event::Empty(ref e) => {
                scope = state.open(e, scope)?;
                scope = state.close(e.local_name().as_ref(), scope)?;
            }
            Event::End(ref e) => {
                scope = state.close(e.local_name().as_ref(), scope)?;
            }
            Event::Text(ref t) => {
                if state.in_peptide_sequence {
                    if let Some(id) = &state.current_peptide {
                        let seq = t.unescape()?.trim().to_string();
                        state.peptide_sequences.insert(id.clone(), seq);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let compiled = state.finish();
    info!(
        file = %path.display(),
        psms = compiled.psm_count(),
        spectra_data = compiled.spectra_data.len(),
        "mzid_compiled"
    );
    Ok(compiled)
}

impl MzidState {
    fn open(&mut self, e: &BytesStart<'_>, scope: CvScope) -> Result<CvScope> {
        match e.local_name().as_ref() {
            b"SpectraData" => {
                self.current_spectra_data = Some(SpectraFileDescriptor {
                    id: attr(e, "id")?.unwrap_or_default(),
                    location: attr(e, "location")?,
                    name: attr(e, "name")?,
                    id_format_accession: None,
                    file_format_accession: None,
                    file_format: SpectrumFileFormat::Unknown,
                });
            }
            b"FileFormat" if self.current_spectra_data.is_some() => return Ok(CvScope::FileFormat),
            b"SpectrumIDFormat" if self.current_spectra_data.is_some() => {
                return Ok(CvScope::SpectrumIdFormat);
            }
            b"cvParam" => self.cv_param(e, scope)?,
            b"DBSequence" => {
                if let Some(id) = attr(e, "id")? {
                    let accession = attr(e, "accession")?.unwrap_or_else(|| id.clone());
                    self.db_accessions.insert(id, accession);
                }
            }
            b"Peptide" => {
                self.current_peptide = attr(e, "id")?;
            }
            b"PeptideSequence" => self.in_peptide_sequence = true,
            b"PeptideEvidence" => {
                if let (Some(id), Some(db)) = (attr(e, "id")?, attr(e, "dBSequence_ref")?) {
                    self.evidence_db.insert(id, db);
                }
            }
            b"SpectrumIdentificationResult" => {
                self.current_result = Some(PendingResult {
                    spectrum_id: attr(e, "spectrumID")?.unwrap_or_default(),
                    spectra_data_ref: attr(e, "spectraData_ref")?.unwrap_or_default(),
                    ..PendingResult::default()
                });
            }
            b"SpectrumIdentificationItem" => {
                let mz = attr(e, "experimentalMassToCharge")?.unwrap_or_default();
                let mass_to_charge: f64 = mz
                    .trim()
                    .parse()
                    .with_context(|| format!("invalid experimentalMassToCharge '{}'", mz))?;
                let charge = attr(e, "chargeState")?.and_then(|c| c.trim().parse().ok());
                self.current_item = Some(PendingItem {
                    mass_to_charge,
                    charge,
                    peptide_ref: attr(e, "peptide_ref")?,
                    evidence_refs: Vec::new(),
                });
            }
            b"PeptideEvidenceRef" => {
                if let (Some(item), Some(r)) =
                    (self.current_item.as_mut(), attr(e, "peptideEvidence_ref")?)
                {
                    item.evidence_refs.push(r);
                }
            }
            _ => {}
        }
        Ok(scope)
    }

    fn close(&mut self, name: &[u8], scope: CvScope) -> Result<CvScope> {
        match name {
            b"SpectraData" => {
                if let Some(mut sd) = self.current_spectra_data.take() {
                    sd.classify();
                    self.spectra_data.push(sd);
                }
            }
            b"FileFormat" | b"SpectrumIDFormat" => return Ok(CvScope::None),
            b"Peptide" => self.current_peptide = None,
            b"PeptideSequence" => self.in_peptide_sequence = false,
            b"SpectrumIdentificationItem" => {
                if let (Some(item), Some(result)) =
                    (self.current_item.take(), self.current_result.as_mut())
                {
                    result.items.push(item);
                }
            }
            b"SpectrumIdentificationResult" => {
                if let Some(result) = self.current_result.take() {
                    self.results.push(result);
                }
            }
            _ => {}
        }
        Ok(scope)
    }

    fn cv_param(&mut self, e: &BytesStart<'_>, scope: CvScope) -> Result<()> {
        let accession = match attr(e, "accession")? {
            Some(acc) => acc,
            None => return Ok(()),
        };
        if let Some(sd) = self.current_spectra_data.as_mut() {
            match scope {
                CvScope::FileFormat => sd.file_format_accession = Some(accession),
                CvScope::SpectrumIdFormat => sd.id_format_accession = Some(accession),
                CvScope::None => {}
            }
            return Ok(());
        }
        // Title params sit on the result, after its items.
        if self.current_item.is_none() && accession == SPECTRUM_TITLE_ACCESSION {
            if let Some(result) = self.current_result.as_mut() {
                result.title = attr(e, "value")?;
            }
        }
        Ok(())
    }

    fn finish(self) -> CompiledIdentifications {
        let mut psms = Vec::new();
        let mut accessions = HashSet::new();
        let mut sequences = HashSet::new();
        let mut next_id = 1u64;

        for result in self.results {
            for item in result.items {
                for ev in &item.evidence_refs {
                    if let Some(acc) = self
                        .evidence_db
                        .get(ev)
                        .and_then(|db| self.db_accessions.get(db))
                    {
                        accessions.insert(acc.clone());
                    }
                }
                let peptide = item.peptide_ref.as_ref().map(|r| {
                    self.peptide_sequences
                        .get(r)
                        .cloned()
                        .unwrap_or_else(|| r.clone())
                });
                if let Some(seq) = &peptide {
                    sequences.insert(seq.clone());
                }
                psms.push(IdentificationRecord {
                    id: next_id,
                    spectra_data_ref: result.spectra_data_ref.clone(),
                    source_id: result.spectrum_id.clone(),
                    spectrum_title: result.title.clone(),
                    mass_to_charge: item.mass_to_charge,
                    charge: item.charge,
                    peptide,
                });
                next_id += 1;
            }
        }

        let protein_count = if self.evidence_db.is_empty() {
            self.db_accessions.len()
        } else {
            accessions.len()
        };
        let original_ids = self
            .spectra_data
            .iter()
            .map(|sd| (sd.id.clone(), sd.id.clone()))
            .collect();

        CompiledIdentifications {
            protein_count,
            peptide_count: sequences.len(),
            psms,
            spectra_data: self.spectra_data,
            original_ids,
        }
    }
}
