#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub const MULTI_PEAK_ID_FORMAT: &str = "MS:1000774";
pub const TITLE_ID_FORMAT: &str = "MS:1000796";
pub const MGF_FORMAT: &str = "MS:1001062";

pub struct SpectraDataSpec {
    pub id: String,
    pub name: Option<String>,
    pub location: String,
    pub id_format: String,
}

pub struct PsmSpec {
    pub spectrum_id: String,
    pub spectra_data_ref: String,
    pub title: Option<String>,
    pub mz: f64,
}

/// `n` PSMs against `SD_1`, `index=i` with m/z `401 + i`.
pub fn indexed_psms(n: usize) -> Vec<PsmSpec> {
    (0..n)
        .map(|i| PsmSpec {
            spectrum_id: format!("index={}", i),
            spectra_data_ref: "SD_1".to_string(),
            title: None,
            mz: 401.0 + i as f64,
        })
        .collect()
}

/// MGF whose spectrum at 1-based position `p` has title `spec_p` and PEPMASS `400 + p`.
pub fn write_mgf(dir: &Path, name: &str, count: usize) -> PathBuf {
    let mut out = String::new();
    for p in 1..=count {
        out.push_str("BEGIN IONS\n");
        out.push_str(&format!("TITLE=spec_{}\n", p));
        out.push_str(&format!("PEPMASS={:.4} 1000.0\n", 400.0 + p as f64));
        out.push_str("CHARGE=2+\n");
        out.push_str("120.5 33.0\n250.1 12.0\n");
        out.push_str("END IONS\n");
    }
    let path = dir.join(name);
    fs::write(&path, out).unwrap();
    path
}

pub fn write_mzid(
    dir: &Path,
    name: &str,
    spectra_data: &[SpectraDataSpec],
    psms: &[PsmSpec],
    with_cv_list: bool,
) -> PathBuf {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<MzIdentML xmlns=\"http://psidev.info/psi/pi/mzIdentML/1.1\" id=\"test\" version=\"1.1.0\">\n");
    if with_cv_list {
        out.push_str("  <cvList><cv id=\"PSI-MS\" fullName=\"PSI-MS\" uri=\"https://psi.org/ms.obo\"/></cvList>\n");
    }
    out.push_str("  <SequenceCollection>\n");
    out.push_str("    <DBSequence id=\"DBS_0\" accession=\"P00001\" searchDatabase_ref=\"DB\"/>\n");
    out.push_str("    <DBSequence id=\"DBS_1\" accession=\"P00002\" searchDatabase_ref=\"DB\"/>\n");
    for k in 0..5 {
        out.push_str(&format!(
            "    <Peptide id=\"PEP_{k}\"><PeptideSequence>PEPTIDE{k}K</PeptideSequence></Peptide>\n"
        ));
    }
    for k in 0..5 {
        out.push_str(&format!(
            "    <PeptideEvidence id=\"PE_{k}\" peptide_ref=\"PEP_{k}\" dBSequence_ref=\"DBS_{}\"/>\n",
            k % 2
        ));
    }
    out.push_str("  </SequenceCollection>\n");
    out.push_str("  <DataCollection>\n    <Inputs>\n");
    for sd in spectra_data {
        let name_attr = sd
            .name
            .as_ref()
            .map(|n| format!(" name=\"{}\"", n))
            .unwrap_or_default();
        out.push_str(&format!(
            "      <SpectraData id=\"{}\" location=\"{}\"{}>\n",
            sd.id, sd.location, name_attr
        ));
        out.push_str(&format!(
            "        <FileFormat><cvParam cvRef=\"PSI-MS\" accession=\"{}\" name=\"Mascot MGF format\"/></FileFormat>\n",
            MGF_FORMAT
        ));
        out.push_str(&format!(
            "        <SpectrumIDFormat><cvParam cvRef=\"PSI-MS\" accession=\"{}\" name=\"id format\"/></SpectrumIDFormat>\n",
            sd.id_format
        ));
        out.push_str("      </SpectraData>\n");
    }
    out.push_str("    </Inputs>\n    <AnalysisData>\n");
    out.push_str("      <SpectrumIdentificationList id=\"SIL_1\">\n");
    for (i, psm) in psms.iter().enumerate() {
        let k = i % 5;
        out.push_str(&format!(
            "        <SpectrumIdentificationResult id=\"SIR_{i}\" spectrumID=\"{}\" spectraData_ref=\"{}\">\n",
            psm.spectrum_id, psm.spectra_data_ref
        ));
        out.push_str(&format!(
            "          <SpectrumIdentificationItem id=\"SII_{i}\" rank=\"1\" chargeState=\"2\" experimentalMassToCharge=\"{}\" peptide_ref=\"PEP_{k}\" passThreshold=\"true\">\n",
            psm.mz
        ));
        out.push_str(&format!(
            "            <PeptideEvidenceRef peptideEvidence_ref=\"PE_{k}\"/>\n"
        ));
        out.push_str("          </SpectrumIdentificationItem>\n");
        if let Some(title) = &psm.title {
            out.push_str(&format!(
                "          <cvParam cvRef=\"PSI-MS\" accession=\"MS:1000796\" name=\"spectrum title\" value=\"{}\"/>\n",
                title
            ));
        }
        out.push_str("        </SpectrumIdentificationResult>\n");
    }
    out.push_str("      </SpectrumIdentificationList>\n    </AnalysisData>\n  </DataCollection>\n");
    out.push_str("</MzIdentML>\n");

    let path = dir.join(name);
    fs::write(&path, out).unwrap();
    path
}

pub fn single_run(location: &str, id_format: &str) -> Vec<SpectraDataSpec> {
    vec![SpectraDataSpec {
        id: "SD_1".to_string(),
        name: None,
        location: location.to_string(),
        id_format: id_format.to_string(),
    }]
}
