//! MGF peak lists.
//!
//! ```text
//! BEGIN IONS
//! TITLE=...
//! PEPMASS=precursor_mz [intensity]
//! SCANS=...
//! mz intensity
//! END IONS
//! ```
//!
//! A spectrum is addressed by its exact TITLE or by its 1-based position.

use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::io::open_maybe_gz;
use crate::spectra::{Spectrum, SpectrumIndex, SpectrumReadError, SpectrumReader, io_error};

pub fn read_mgf(path: &Path) -> Result<SpectrumIndex, SpectrumReadError> {
    let source = open_maybe_gz(path).map_err(|e| SpectrumReadError::Parse {
        path: path.to_path_buf(),
        message: format!("{:#}", e),
    })?;
    let reader = BufReader::new(source);
    let mut index = SpectrumIndex::new(path, true);

    let mut in_block = false;
    let mut title: Option<String> = None;
    let mut pepmass: Option<f64> = None;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| io_error(path, e))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with(['#', ';', '!', '/']) {
            continue;
        }
        if line.eq_ignore_ascii_case("BEGIN IONS") {
            if in_block {
                return Err(SpectrumReadError::Parse {
                    path: path.to_path_buf(),
                    message: format!("line {}: BEGIN IONS inside an open block", line_no + 1),
                });
            }
            in_block = true;
            title = None;
            pepmass = None;
            continue;
        }
        if line.eq_ignore_ascii_case("END IONS") {
            if !in_block {
                return Err(SpectrumReadError::Parse {
                    path: path.to_path_buf(),
                    message: format!("line {}: END IONS without BEGIN IONS", line_no + 1),
                });
            }
            let position = index.len() + 1;
            index.push(
                Spectrum {
                    id: title.take().unwrap_or_else(|| position.to_string()),
                    index: position,
                    precursor_mz: pepmass.take(),
                },
                &[],
            );
            in_block = false;
            continue;
        }
        if !in_block {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            match key.trim().to_ascii_uppercase().as_str() {
                "TITLE" => title = Some(value.trim().to_string()),
                "PEPMASS" => {
                    pepmass = value
                        .split_whitespace()
                        .next()
                        .and_then(|v| v.parse::<f64>().ok());
                }
                _ => {}
            }
        }
    }

    if in_block {
        return Err(SpectrumReadError::Parse {
            path: path.to_path_buf(),
            message: "unterminated BEGIN IONS block".to_string(),
        });
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn reads_titles_and_pepmass() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("run.mgf");
        fs::write(
            &path,
            "BEGIN IONS\nTITLE=first\nPEPMASS=500.25 1200\nCHARGE=2+\n100.0 10\nEND IONS\n\
             BEGIN IONS\nPEPMASS=610.5\nEND IONS\n",
        )
        .unwrap();

        let index = read_mgf(&path).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.spectrum_by_id("first").unwrap().precursor_mz, Some(500.25));
        let second = index.spectrum_by_id("2").unwrap();
        assert_eq!(second.id, "2");
        assert_eq!(second.precursor_mz, Some(610.5));
    }
}
