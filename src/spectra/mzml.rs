//! mzML spectrum index: `spectrum@id` plus the selected-ion m/z of its first precursor.
//! Binary arrays are skipped. Lookups go by native id or `scan=` number, never by position.

use std::path::Path;

use quick_xml::events::{BytesStart, Event};

use crate::cv::SELECTED_ION_MZ_ACCESSION;
use crate::io::xml::{attr, open_xml};
use crate::spectra::{Spectrum, SpectrumIndex, SpectrumReadError, SpectrumReader};

#[derive(Debug, Default)]
struct PendingSpectrum {
    id: String,
    precursor_mz: Option<f64>,
    in_selected_ion: bool,
}

pub fn read_mzml(path: &Path) -> Result<SpectrumIndex, SpectrumReadError> {
    let parse_error = |message: String| SpectrumReadError::Parse {
        path: path.to_path_buf(),
        message,
    };
    let mut reader = open_xml(path).map_err(|e| parse_error(format!("{:#}", e)))?;
    let mut index = SpectrumIndex::new(path, false);
    let mut current: Option<PendingSpectrum> = None;
    let mut buf = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            parse_error(format!("at byte {}: {}", reader.buffer_position(), e))
        })?;
        match event {
            Event::Start(ref e) => {
                open_element(e, &mut current).map_err(|e| parse_error(format!("{:#}", e)))?;
            }
            Event::Empty(ref e) => {
                open_element(e, &mut current).map_err(|e| parse_error(format!("{:#}", e)))?;
                if e.local_name().as_ref() == b"spectrum" {
                    finish_spectrum(&mut current, &mut index);
                }
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"selectedIon" => {
                    if let Some(spec) = current.as_mut() {
                        spec.in_selected_ion = false;
                    }
                }
                b"spectrum" => finish_spectrum(&mut current, &mut index),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(index)
}

fn open_element(e: &BytesStart<'_>, current: &mut Option<PendingSpectrum>) -> anyhow::Result<()> {
    match e.local_name().as_ref() {
        b"spectrum" => {
            *current = Some(PendingSpectrum {
                id: attr(e, "id")?.unwrap_or_default(),
                ..PendingSpectrum::default()
            });
        }
        b"selectedIon" => {
            if let Some(spec) = current.as_mut() {
                spec.in_selected_ion = true;
            }
        }
        b"cvParam" => {
            if let Some(spec) = current.as_mut() {
                if spec.in_selected_ion
                    && spec.precursor_mz.is_none()
                    && attr(e, "accession")?.as_deref() == Some(SELECTED_ION_MZ_ACCESSION)
                {
                    spec.precursor_mz = attr(e, "value")?.and_then(|v| v.trim().parse().ok());
                }
            }
        }
        _ => {}
    }
    Ok(())
}

fn finish_spectrum(current: &mut Option<PendingSpectrum>, index: &mut SpectrumIndex) {
    let Some(spec) = current.take() else {
        return;
    };
    let position = index.len() + 1;
    let id = if spec.id.is_empty() {
        position.to_string()
    } else {
        spec.id
    };
    let aliases: Vec<String> = id
        .split_whitespace()
        .filter_map(|token| token.strip_prefix("scan="))
        .map(str::to_string)
        .collect();
    index.push(
        Spectrum {
            id,
            index: position,
            precursor_mz: spec.precursor_mz,
        },
        &aliases,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const MZML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<mzML xmlns="http://psi.hupo.org/ms/mzml" version="1.1.0">
  <run id="r1">
    <spectrumList count="2">
      <spectrum index="0" id="controllerType=0 controllerNumber=1 scan=11" defaultArrayLength="0">
        <cvParam cvRef="MS" accession="MS:1000511" name="ms level" value="2"/>
        <precursorList count="1">
          <precursor>
            <selectedIonList count="1">
              <selectedIon>
                <cvParam cvRef="MS" accession="MS:1000744" name="selected ion m/z" value="445.34"/>
              </selectedIon>
            </selectedIonList>
          </precursor>
        </precursorList>
      </spectrum>
      <spectrum index="1" id="controllerType=0 controllerNumber=1 scan=12" defaultArrayLength="0">
        <cvParam cvRef="MS" accession="MS:1000511" name="ms level" value="1"/>
      </spectrum>
    </spectrumList>
  </run>
</mzML>
"#;

    #[test]
    fn indexes_ids_scans_and_precursors() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("run.mzML");
        fs::write(&path, MZML).unwrap();

        let index = read_mzml(&path).unwrap();
        assert_eq!(index.len(), 2);
        let first = index
            .spectrum_by_id("controllerType=0 controllerNumber=1 scan=11")
            .unwrap();
        assert_eq!(first.precursor_mz, Some(445.34));
        assert_eq!(index.spectrum_by_id("12").unwrap().index, 2);
        assert_eq!(index.spectrum_by_id("12").unwrap().precursor_mz, None);
        assert_eq!(index.spectrum_by_index(1).unwrap().id, first.id);
    }

    #[test]
    fn missing_scan_is_not_found_rather_than_positional() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("scans.mzML");
        let spectra: String = (101..=110)
            .map(|scan| {
                format!(
                    "<spectrum index=\"{}\" id=\"scan={}\" defaultArrayLength=\"0\"/>\n",
                    scan - 101,
                    scan
                )
            })
            .collect();
        fs::write(
            &path,
            format!("<mzML><run><spectrumList>\n{}</spectrumList></run></mzML>\n", spectra),
        )
        .unwrap();

        let index = read_mzml(&path).unwrap();
        assert_eq!(index.len(), 10);
        assert_eq!(index.spectrum_by_id("105").unwrap().index, 5);
        assert!(matches!(
            index.spectrum_by_id("5"),
            Err(SpectrumReadError::NotFound { .. })
        ));
    }
}
