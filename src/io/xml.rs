use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use quick_xml::Reader;
use quick_xml::events::BytesStart;

use crate::io::open_maybe_gz;

pub type XmlReader = Reader<BufReader<Box<dyn Read>>>;

pub fn open_xml(path: &Path) -> Result<XmlReader> {
    let source =
        open_maybe_gz(path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok(xml_reader(source))
}

pub fn xml_reader(source: Box<dyn Read>) -> XmlReader {
    let mut reader = Reader::from_reader(BufReader::new(source));
    reader.config_mut().trim_text(true);
    reader
}

pub fn attr(e: &BytesStart<'_>, name: &str) -> Result<Option<String>> {
    match e.try_get_attribute(name)? {
        Some(a) => Ok(Some(a.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}
