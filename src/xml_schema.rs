//! Structural pre-check for mzIdentML.
//!
//! The root `version` attribute picks the schema family. The built-in validator
//! checks the elements the engine depends on rather than the full XSD.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use quick_xml::events::{BytesStart, Event};

use crate::io::xml::{XmlReader, attr, open_xml, xml_reader};

pub const MZID_ROOT: &str = "MzIdentML";
pub const MZID_1_1_SCHEMA_URI: &str = "https://storage.googleapis.com/google-code-archive-downloads/v2/code.google.com/psi-pi/mzIdentML1.1.0.xsd";
pub const MZID_1_2_SCHEMA_URI: &str =
    "https://raw.githubusercontent.com/HUPO-PSI/mzIdentML/master/schema/mzIdentML1.2.0.xsd";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaResource {
    pub version: &'static str,
    pub uri: &'static str,
}

pub fn select_schema(version: &str) -> Option<SchemaResource> {
    let version = version.trim();
    if version == "1.1" || version.starts_with("1.1.") {
        Some(SchemaResource {
            version: "1.1",
            uri: MZID_1_1_SCHEMA_URI,
        })
    } else if version == "1.2" || version.starts_with("1.2.") {
        Some(SchemaResource {
            version: "1.2",
            uri: MZID_1_2_SCHEMA_URI,
        })
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootElement {
    pub name: String,
    pub version: Option<String>,
}

/// First element of the document, `None` for a document without one.
pub fn read_root(path: &Path) -> Result<Option<RootElement>> {
    let mut reader = open_xml(path)?;
    let mut buf = Vec::new();
    loop {
        let event = reader
            .read_event_into(&mut buf)
            .with_context(|| format!("malformed XML at byte {}", reader.buffer_position()))?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                return Ok(Some(RootElement {
                    name: String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
                    version: attr(e, "version")?,
                }));
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
        buf.clear();
    }
}

pub trait SchemaValidator: Send + Sync {
    /// One message per violation. `Err` only when the check itself could not run.
    fn validate(&self, reader: Box<dyn Read>, schema: &SchemaResource) -> Result<Vec<String>>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StructuralValidator;

#[derive(Default)]
struct StructureState {
    root_seen: bool,
    cv_list: bool,
    data_collection: bool,
    spectra_data: Option<(String, bool)>,
    messages: Vec<String>,
}

impl SchemaValidator for StructuralValidator {
    fn validate(&self, reader: Box<dyn Read>, schema: &SchemaResource) -> Result<Vec<String>> {
        let mut reader: XmlReader = xml_reader(reader);
        let mut state = StructureState::default();
        let mut buf = Vec::new();

        loop {
            let event = match reader.read_event_into(&mut buf) {
                Ok(event) => event,
                Err(err) => {
                    state.messages.push(format!(
                        "malformed XML at byte {}: {}",
                        reader.buffer_position(),
                        err
                    ));
                    return Ok(state.messages);
                }
            };
            match event {
                Event::Start(ref e) => state.open(e, schema)?,
                Event::Empty(ref e) => {
                    state.open(e, schema)?;
                    state.close(e.local_name().as_ref());
                }
                Event::End(ref e) => state.close(e.local_name().as_ref()),
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if !state.root_seen {
            state.messages.push("document has no root element".to_string());
            return Ok(state.messages);
        }
        if !state.cv_list {
            state.messages.push("required element cvList is missing".to_string());
        }
        if !state.data_collection {
            state
                .messages
                .push("required element DataCollection is missing".to_string());
        }
        Ok(state.messages)
    }
}

impl StructureState {
    fn open(&mut self, e: &BytesStart<'_>, schema: &SchemaResource) -> Result<()> {
        let name = e.local_name();
        let name = name.as_ref();
        if !self.root_seen {
            self.root_seen = true;
            if name != MZID_ROOT.as_bytes() {
                self.messages.push(format!(
                    "root element is '{}', expected '{}' ({})",
                    String::from_utf8_lossy(name),
                    MZID_ROOT,
                    schema.uri
                ));
            }
            return Ok(());
        }
        match name {
            b"cvList" => self.cv_list = true,
            b"DataCollection" => self.data_collection = true,
            b"SpectraData" => {
                let id = attr(e, "id")?.unwrap_or_default();
                if attr(e, "location")?.is_none() {
                    self.messages
                        .push(format!("SpectraData '{}' has no location attribute", id));
                }
                self.spectra_data = Some((id, false));
            }
            b"SpectrumIDFormat" => {
                if let Some((_, seen)) = self.spectra_data.as_mut() {
                    *seen = true;
                }
            }
            b"SpectrumIdentificationResult" => {
                let id = attr(e, "id")?.unwrap_or_default();
                for required in ["spectrumID", "spectraData_ref"] {
                    if attr(e, required)?.is_none() {
                        self.messages.push(format!(
                            "SpectrumIdentificationResult '{}' has no {} attribute",
                            id, required
                        ));
                    }
                }
            }
            b"SpectrumIdentificationItem" => {
                let id = attr(e, "id")?.unwrap_or_default();
                match attr(e, "experimentalMassToCharge")? {
                    None => self.messages.push(format!(
                        "SpectrumIdentificationItem '{}' has no experimentalMassToCharge attribute",
                        id
                    )),
                    Some(v) if v.trim().parse::<f64>().is_err() => self.messages.push(format!(
                        "SpectrumIdentificationItem '{}' has a non-numeric experimentalMassToCharge '{}'",
                        id, v
                    )),
                    Some(_) => {}
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, name: &[u8]) {
        if name == b"SpectraData" {
            if let Some((id, false)) = self.spectra_data.take() {
                self.messages
                    .push(format!("SpectraData '{}' has no SpectrumIDFormat", id));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(xml: &str) -> Vec<String> {
        let schema = select_schema("1.1.0").unwrap();
        StructuralValidator
            .validate(Box::new(std::io::Cursor::new(xml.as_bytes().to_vec())), &schema)
            .unwrap()
    }

    #[test]
    fn schema_families() {
        assert_eq!(select_schema("1.1.1").unwrap().uri, MZID_1_1_SCHEMA_URI);
        assert_eq!(select_schema("1.2.0").unwrap().version, "1.2");
        assert!(select_schema("1.0.0").is_none());
    }

    #[test]
    fn reports_missing_sections_and_attributes() {
        let messages = check(
            r#"<MzIdentML version="1.1.0"><DataCollection><Inputs>
            <SpectraData id="sd1"/></Inputs></DataCollection></MzIdentML>"#,
        );
        assert!(messages.iter().any(|m| m.contains("cvList")));
        assert!(messages.iter().any(|m| m.contains("'sd1' has no location")));
        assert!(messages.iter().any(|m| m.contains("'sd1' has no SpectrumIDFormat")));
    }

    #[test]
    fn wrong_root_is_reported() {
        let messages = check("<mzML version=\"1.1.0\"/>");
        assert!(messages[0].contains("root element is 'mzML'"));
    }
}
