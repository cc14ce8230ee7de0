use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, info, warn};

#[cfg(feature = "mt")]
use rayon::prelude::*;

use crate::cv::{SpectrumFileFormat, real_file_name, strip_compression};
use crate::ident::{CompiledIdentifications, IdentificationRecord, SpectraFileDescriptor};
use crate::pipeline::Deadline;
use crate::report::{CheckedSpectrum, Issue, NOT_AVAILABLE, PeakReport};
use crate::sampling::SampledGroup;
use crate::spectra::{Spectrum, SpectrumReadError, SpectrumReader, SpectrumService};
use crate::spectrum_id::resolve_spectrum_key;

/// A supplied peak file tied to one declared spectra-data entry.
#[derive(Debug, Clone, PartialEq)]
pub struct PeakFileBinding {
    pub path: PathBuf,
    /// Position in `CompiledIdentifications::spectra_data`.
    pub descriptor: usize,
    pub format: SpectrumFileFormat,
}

/// A peak file binds to every descriptor whose location contains its name,
/// ignoring case. One file may bind several times.
pub fn bind_peak_files(
    peak_files: &[PathBuf],
    descriptors: &[SpectraFileDescriptor],
) -> Vec<PeakFileBinding> {
    let mut bindings = Vec::new();
    for path in peak_files {
        let name = file_name(path).to_lowercase();
        for (idx, sd) in descriptors.iter().enumerate() {
            let Some(location) = sd.location.as_deref() else {
                continue;
            };
            if !location.to_lowercase().contains(&name) {
                continue;
            }
            let format = match sd.file_format {
                SpectrumFileFormat::Unknown => {
                    SpectrumFileFormat::from_location(&path.to_string_lossy())
                }
                known => known,
            };
            bindings.push(PeakFileBinding {
                path: path.clone(),
                descriptor: idx,
                format,
            });
        }
    }
    bindings
}

/// One ERROR per supplied file whose name matches no declared location.
pub fn peak_reference_errors(
    peak_files: &[PathBuf],
    descriptors: &[SpectraFileDescriptor],
) -> Vec<Issue> {
    peak_files
        .iter()
        .filter_map(|path| {
            let name = file_name(path);
            let found = descriptors.iter().any(|sd| {
                sd.location.as_deref().is_some_and(|loc| {
                    let declared = real_file_name(loc);
                    declared.eq_ignore_ascii_case(&name)
                        || strip_compression(&declared).eq_ignore_ascii_case(strip_compression(&name))
                })
            });
            if found {
                None
            } else {
                Some(Issue::error(format!(
                    "{} does not found as a reference in MzIdentML",
                    name
                )))
            }
        })
        .collect()
}

/// Precursor masses agree when equal at two decimals.
pub fn masses_agree(observed: f64, expected: f64) -> bool {
    (observed * 100.0).round() == (expected * 100.0).round()
}

pub struct CrossValidator<'a> {
    compiled: &'a CompiledIdentifications,
    bindings: &'a [PeakFileBinding],
    service: &'a SpectrumService,
    deadline: Deadline,
}

impl<'a> CrossValidator<'a> {
    pub fn new(
        compiled: &'a CompiledIdentifications,
        bindings: &'a [PeakFileBinding],
        service: &'a SpectrumService,
        deadline: Deadline,
    ) -> Self {
        Self {
            compiled,
            bindings,
            service,
            deadline,
        }
    }

    /// One report per group, in group order.
    pub fn validate(&self, groups: &[SampledGroup], threads: usize) -> Result<Vec<PeakReport>> {
        #[cfg(feature = "mt")]
        {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| anyhow::anyhow!("failed to build thread pool: {}", e))?;
            return pool.install(|| {
                groups
                    .par_iter()
                    .map(|group| self.validate_group(group))
                    .collect::<Result<Vec<_>>>()
            });
        }

        #[cfg(not(feature = "mt"))]
        {
            let _ = threads;
            groups
                .iter()
                .map(|group| self.validate_group(group))
                .collect::<Result<Vec<_>>>()
        }
    }

    pub fn validate_group(&self, group: &SampledGroup) -> Result<PeakReport> {
        self.deadline.check("cross-validating a peak group")?;

        let candidates = self.candidates(&group.reference);
        if candidates.len() != 1 {
            warn!(
                reference = %group.reference,
                candidates = candidates.len(),
                sampled = group.record_indices.len(),
                "spectra file cannot be mapped"
            );
            let undetected = group
                .record_indices
                .iter()
                .map(|&idx| checked(&self.compiled.psms[idx], None))
                .collect();
            return Ok(PeakReport {
                peak_file: NOT_AVAILABLE.to_string(),
                file_size: 0,
                claimed_spectra: 0,
                mapped: false,
                detected: Vec::new(),
                undetected,
            });
        }

        let binding = candidates[0];
        let descriptor = &self.compiled.spectra_data[binding.descriptor];
        let mut report = PeakReport {
            peak_file: file_name(&binding.path),
            file_size: std::fs::metadata(&binding.path).map(|m| m.len()).unwrap_or(0),
            claimed_spectra: self.compiled.psm_count(),
            mapped: true,
            detected: Vec::new(),
            undetected: Vec::new(),
        };

        let session = self.service.session(&binding.path).ok();
        for &idx in &group.record_indices {
            let record = &self.compiled.psms[idx];
            let fetched = match session {
                Some(reader) => fetch_spectrum(reader, descriptor, record),
                None => Err(SpectrumReadError::NoSession(binding.path.clone())),
            };
            match fetched {
                Ok(spectrum) => {
                    let item = checked(record, spectrum.precursor_mz);
                    let agrees = spectrum
                        .precursor_mz
                        .is_some_and(|mz| masses_agree(mz, record.mass_to_charge));
                    debug!(psm = record.id, source = %record.source_id, agrees, "spectrum_checked");
                    if agrees {
                        report.detected.push(item);
                    } else {
                        report.undetected.push(item);
                    }
                }
                Err(err) => {
                    warn!(psm = record.id, source = %record.source_id, error = %err, "spectrum_lookup_failed");
                    report.undetected.push(checked(record, None));
                }
            }
        }

        info!(
            peak_file = %report.peak_file,
            detected = report.detected.len(),
            undetected = report.undetected.len(),
            "peak_file_checked"
        );
        Ok(report)
    }

    fn candidates(&self, reference: &str) -> Vec<&'a PeakFileBinding> {
        self.bindings
            .iter()
            .filter(|b| {
                let sd = &self.compiled.spectra_data[b.descriptor];
                sd.name.as_deref() == Some(reference)
                    || self.compiled.reference_for(sd) == Some(reference)
            })
            .collect()
    }
}

fn fetch_spectrum(
    reader: &dyn SpectrumReader,
    descriptor: &SpectraFileDescriptor,
    record: &IdentificationRecord,
) -> Result<Spectrum, SpectrumReadError> {
    let scheme = descriptor.id_format();
    let key = resolve_spectrum_key(scheme, &record.source_id, record.spectrum_title.as_deref());
    if scheme.fetch_by_index() {
        let index: usize = key
            .parse()
            .map_err(|_| SpectrumReadError::MalformedId(key.clone()))?;
        reader.spectrum_by_index(index)
    } else {
        reader.spectrum_by_id(&key)
    }
}

fn checked(record: &IdentificationRecord, observed_mz: Option<f64>) -> CheckedSpectrum {
    CheckedSpectrum {
        psm_id: record.id,
        source_id: record.source_id.clone(),
        expected_mz: record.mass_to_charge,
        observed_mz,
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_decimal_agreement() {
        assert!(masses_agree(500.004, 500.00));
        assert!(!masses_agree(500.01, 500.00));
        assert!(masses_agree(1234.5678, 1234.57));
    }
}
