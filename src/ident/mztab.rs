use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::cv::{SpectrumFileFormat, real_file_name};
use crate::ident::{
    CompiledIdentifications, IdentificationRecord, SpectraFileDescriptor, TabularParser,
};
use crate::io::open_maybe_gz;
use crate::report::Issue;

const DATA_SECTIONS: &[(&str, &str)] = &[("PRH", "PRT"), ("PEH", "PEP"), ("PSH", "PSM"), ("SMH", "SML")];

#[derive(Debug, Default, Clone)]
struct MsRun {
    location: Option<String>,
    format: Option<String>,
    id_format: Option<String>,
}

#[derive(Debug, Default)]
struct MzTabDocument {
    metadata: HashMap<String, String>,
    runs: BTreeMap<u32, MsRun>,
    headers: HashMap<&'static str, Vec<String>>,
    protein_rows: usize,
    psm_rows: Vec<(usize, Vec<String>)>,
    issues: Vec<Issue>,
}

/// mzTab checker reporting its own severities; no schema step.
#[derive(Debug, Default, Clone, Copy)]
pub struct MzTabChecker;

impl TabularParser for MzTabChecker {
    fn parse(&self, path: &Path) -> Result<Vec<Issue>> {
        check_mztab(path)
    }
}

pub fn check_mztab(path: &Path) -> Result<Vec<Issue>> {
    let doc = read_mztab(path)?;
    let mut issues = doc.issues.clone();

    for key in ["mzTab-version", "mzTab-mode", "mzTab-type"] {
        if !doc.metadata.contains_key(key) {
            issues.push(Issue::error(format!("mandatory metadata '{}' is missing", key)));
        }
    }
    if !doc.metadata.contains_key("description") {
        issues.push(Issue::warning("metadata 'description' is missing"));
    }
    for (n, run) in &doc.runs {
        if run.location.is_none() {
            issues.push(Issue::error(format!("ms_run[{}] has no location", n)));
        }
    }

    match doc.headers.get("PSH") {
        Some(header) => {
            let columns = column_index(header);
            for (line_no, row) in &doc.psm_rows {
                check_psm_row(*line_no, row, &columns, &doc.runs, &mut issues);
            }
        }
        None => issues.push(Issue::info("mzTab file contains no PSM section")),
    }

    info!(file = %path.display(), issues = issues.len(), "mztab_checked");
    Ok(issues)
}

pub fn compile_mztab(path: &Path) -> Result<CompiledIdentifications> {
    let doc = read_mztab(path)?;
    let mut psms = Vec::new();
    let mut sequences = HashSet::new();
    let mut accessions = HashSet::new();

    if let Some(header) = doc.headers.get("PSH") {
        let columns = column_index(header);
        for (_, row) in &doc.psm_rows {
            let mz = match cell(row, &columns, "exp_mass_to_charge").and_then(|v| v.parse().ok()) {
                Some(mz) => mz,
                None => continue,
            };
            let (reference, source_id) = match cell(row, &columns, "spectra_ref")
                .and_then(split_spectra_ref)
            {
                Some(parts) => parts,
                None => continue,
            };
            let sequence = cell(row, &columns, "sequence").map(str::to_string);
            if let Some(seq) = &sequence {
                sequences.insert(seq.clone());
            }
            if let Some(acc) = cell(row, &columns, "accession") {
                accessions.insert(acc.to_string());
            }
            psms.push(IdentificationRecord {
                id: psms.len() as u64 + 1,
                spectra_data_ref: reference.to_string(),
                source_id: source_id.to_string(),
                spectrum_title: None,
                mass_to_charge: mz,
                charge: cell(row, &columns, "charge").and_then(|c| c.parse().ok()),
                peptide: sequence,
            });
        }
    }

    let spectra_data: Vec<SpectraFileDescriptor> = doc
        .runs
        .iter()
        .map(|(n, run)| {
            let mut sd = SpectraFileDescriptor {
                id: format!("ms_run[{}]", n),
                location: run.location.clone(),
                name: run.location.as_deref().map(real_file_name),
                id_format_accession: run.id_format.clone(),
                file_format_accession: run.format.clone(),
                file_format: SpectrumFileFormat::Unknown,
            };
            sd.classify();
            sd
        })
        .collect();
    let original_ids = spectra_data
        .iter()
        .map(|sd| (sd.id.clone(), sd.id.clone()))
        .collect();

    let protein_count = if doc.protein_rows > 0 {
        doc.protein_rows
    } else {
        accessions.len()
    };

    info!(file = %path.display(), psms = psms.len(), runs = spectra_data.len(), "mztab_compiled");
    Ok(CompiledIdentifications {
        protein_count,
        peptide_count: sequences.len(),
        psms,
        spectra_data,
        original_ids,
    })
}

fn read_mztab(path: &Path) -> Result<MzTabDocument> {
    let reader = open_maybe_gz(path).with_context(|| format!("failed to open {}", path.display()))?;
    let reader = BufReader::new(reader);
    let mut doc = MzTabDocument::default();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read {}", path.display()))?;
        let line_no = idx + 1;
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.trim().is_empty() {
            continue;
        }
        let fields: Vec<String> = trimmed.split('\t').map(|f| f.trim().to_string()).collect();
        let prefix = fields[0].as_str();
        match prefix {
            "COM" => {}
            "MTD" => read_metadata(line_no, &fields, &mut doc),
            _ => {
                if let Some(&(header, _)) = DATA_SECTIONS.iter().find(|(h, _)| *h == prefix) {
                    doc.headers.insert(header, fields[1..].to_vec());
                } else if let Some(&(header, row)) = DATA_SECTIONS.iter().find(|(_, r)| *r == prefix) {
                    read_row(line_no, header, row, &fields, &mut doc);
                } else {
                    doc.issues.push(Issue::error(format!(
                        "[line {}] unknown line prefix '{}'",
                        line_no, prefix
                    )));
                }
            }
        }
    }

    Ok(doc)
}

fn read_metadata(line_no: usize, fields: &[String], doc: &mut MzTabDocument) {
    if fields.len() < 3 {
        doc.issues.push(Issue::error(format!(
            "[line {}] MTD line requires a key and a value",
            line_no
        )));
        return;
    }
    let key = fields[1].as_str();
    let value = fields[2].clone();
    if let Some((n, attribute)) = parse_run_key(key) {
        let run = doc.runs.entry(n).or_default();
        match attribute {
            "location" => run.location = Some(value.clone()),
            "format" => run.format = cv_accession(&value),
            "id_format" => run.id_format = cv_accession(&value),
            _ => {}
        }
    }
    doc.metadata.insert(key.to_string(), value);
}

fn read_row(
    line_no: usize,
    header: &'static str,
    row: &str,
    fields: &[String],
    doc: &mut MzTabDocument,
) {
    let expected = match doc.headers.get(header) {
        Some(h) => h.len(),
        None => {
            doc.issues.push(Issue::error(format!(
                "[line {}] {} row appears before its {} header",
                line_no, row, header
            )));
            return;
        }
    };
    let values = fields[1..].to_vec();
    if values.len() != expected {
        doc.issues.push(Issue::error(format!(
            "[line {}] {} row has {} columns, header declares {}",
            line_no,
            row,
            values.len(),
            expected
        )));
        return;
    }
    match row {
        "PRT" => doc.protein_rows += 1,
        "PSM" => doc.psm_rows.push((line_no, values)),
        _ => {}
    }
}

fn check_psm_row(
    line_no: usize,
    row: &[String],
    columns: &HashMap<String, usize>,
    runs: &BTreeMap<u32, MsRun>,
    issues: &mut Vec<Issue>,
) {
    match cell(row, columns, "exp_mass_to_charge") {
        None => issues.push(Issue::error(format!(
            "[line {}] PSM row has no exp_mass_to_charge column",
            line_no
        ))),
        Some("null") => issues.push(Issue::warning(format!(
            "[line {}] exp_mass_to_charge is null",
            line_no
        ))),
        Some(v) if v.parse::<f64>().is_err() => issues.push(Issue::error(format!(
            "[line {}] exp_mass_to_charge '{}' is not a number",
            line_no, v
        ))),
        Some(_) => {}
    }

    let spectra_ref = match cell(row, columns, "spectra_ref") {
        Some(r) if r != "null" => r,
        _ => {
            issues.push(Issue::warning(format!(
                "[line {}] PSM has no spectra_ref",
                line_no
            )));
            return;
        }
    };
    match split_spectra_ref(spectra_ref).and_then(|(run, _)| parse_run_label(run)) {
        Some(n) if runs.contains_key(&n) => {}
        Some(n) => issues.push(Issue::error(format!(
            "[line {}] spectra_ref points at undeclared ms_run[{}]",
            line_no, n
        ))),
        None => issues.push(Issue::error(format!(
            "[line {}] malformed spectra_ref '{}'",
            line_no, spectra_ref
        ))),
    }
}

fn column_index(header: &[String]) -> HashMap<String, usize> {
    header
        .iter()
        .enumerate()
        .map(|(i, name)| (name.clone(), i))
        .collect()
}

fn cell<'a>(row: &'a [String], columns: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    columns
        .get(name)
        .and_then(|&i| row.get(i))
        .map(String::as_str)
        .filter(|v| !v.is_empty())
}

/// `ms_run[1]:index=5|ms_run[2]:index=7` -> (`ms_run[1]`, `index=5`)
fn split_spectra_ref(value: &str) -> Option<(&str, &str)> {
    let first = value.split('|').next()?.trim();
    let (run, source) = first.split_once(':')?;
    if run.is_empty() || source.is_empty() {
        return None;
    }
    Some((run, source))
}

fn parse_run_label(label: &str) -> Option<u32> {
    label
        .strip_prefix("ms_run[")?
        .strip_suffix(']')?
        .parse()
        .ok()
}

/// `ms_run[3]-id_format` -> (3, `id_format`)
fn parse_run_key(key: &str) -> Option<(u32, &str)> {
    let (label, attribute) = key.split_once('-')?;
    Some((parse_run_label(label)?, attribute))
}

/// `[MS, MS:1001062, Mascot MGF format, ]` -> `MS:1001062`
fn cv_accession(value: &str) -> Option<String> {
    let inner = value.trim().strip_prefix('[')?.strip_suffix(']')?;
    inner
        .split(',')
        .nth(1)
        .map(|acc| acc.trim().to_string())
        .filter(|acc| !acc.is_empty())
}
