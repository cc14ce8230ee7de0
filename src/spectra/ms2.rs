//! MS2 text format: `S  scan  scan  precursor_mz` opens a spectrum.
//! Spectra are addressed by scan number.

use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::io::open_maybe_gz;
use crate::spectra::{Spectrum, SpectrumIndex, SpectrumReadError, SpectrumReader, io_error};

pub fn read_ms2(path: &Path) -> Result<SpectrumIndex, SpectrumReadError> {
    let source = open_maybe_gz(path).map_err(|e| SpectrumReadError::Parse {
        path: path.to_path_buf(),
        message: format!("{:#}", e),
    })?;
    let reader = BufReader::new(source);
    let mut index = SpectrumIndex::new(path, false);

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| io_error(path, e))?;
        if !line.starts_with('S') {
            continue;
        }
        let mut parts = line.split_whitespace().skip(1);
        let scan: u64 = parts
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| SpectrumReadError::Parse {
                path: path.to_path_buf(),
                message: format!("line {}: S line without a scan number", line_no + 1),
            })?;
        let precursor_mz = parts.nth(1).and_then(|s| s.parse::<f64>().ok());
        let position = index.len() + 1;
        index.push(
            Spectrum {
                id: scan.to_string(),
                index: position,
                precursor_mz,
            },
            &[format!("scan={}", scan)],
        );
    }

    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn scans_are_ids() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("run.ms2");
        fs::write(
            &path,
            "H\tCreationDate\ttoday\nS\t7\t7\t455.12\nZ\t2\t909.23\n100.0\t5.0\nS\t9\t9\t512.30\n",
        )
        .unwrap();

        let index = read_ms2(&path).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.spectrum_by_id("9").unwrap().precursor_mz, Some(512.30));
        assert_eq!(index.spectrum_by_id("scan=7").unwrap().index, 1);
        assert!(index.spectrum_by_id("2").is_err());
    }
}
