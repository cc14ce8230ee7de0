use std::fmt;

use serde::{Deserialize, Serialize};

pub const MGF_EXT: &str = "mgf";
pub const DTA_EXT: &str = "dta";
pub const MS2_EXT: &str = "ms2";
pub const PKL_EXT: &str = "pkl";
pub const MZXML_EXT: &str = "mzxml";
pub const MZML_EXT: &str = "mzml";
pub const APL_EXT: &str = "apl";
pub const XML_EXT: &str = "xml";

pub const SPECTRUM_TITLE_ACCESSION: &str = "MS:1000796";
pub const SELECTED_ION_MZ_ACCESSION: &str = "MS:1000744";

/// How a raw file encodes the ids of its spectra.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpectrumIdFormat {
    MascotQueryNumber,
    MultiPeakListNativeId,
    SinglePeakListNativeId,
    ScanNumberNativeId,
    MzmlId,
    MzdataId,
    WiffNativeId,
    SpectrumNativeId,
    WiffMgfTitle,
    None,
}

pub const ID_FORMAT_TABLE: &[(&str, SpectrumIdFormat)] = &[
    ("MS:1001528", SpectrumIdFormat::MascotQueryNumber),
    ("MS:1000774", SpectrumIdFormat::MultiPeakListNativeId),
    ("MS:1000775", SpectrumIdFormat::SinglePeakListNativeId),
    ("MS:1001530", SpectrumIdFormat::MzmlId),
    ("MS:1000776", SpectrumIdFormat::ScanNumberNativeId),
    ("MS:1000770", SpectrumIdFormat::WiffNativeId),
    ("MS:1000777", SpectrumIdFormat::MzdataId),
    ("MS:1000768", SpectrumIdFormat::SpectrumNativeId),
    ("MS:1000796", SpectrumIdFormat::WiffMgfTitle),
];

impl SpectrumIdFormat {
    pub fn from_accession(accession: &str) -> Self {
        match accession.trim() {
            "MS:1001528" => Self::MascotQueryNumber,
            "MS:1000774" => Self::MultiPeakListNativeId,
            "MS:1000775" => Self::SinglePeakListNativeId,
            "MS:1001530" => Self::MzmlId,
            "MS:1000776" => Self::ScanNumberNativeId,
            "MS:1000770" => Self::WiffNativeId,
            "MS:1000777" => Self::MzdataId,
            "MS:1000768" => Self::SpectrumNativeId,
            "MS:1000796" => Self::WiffMgfTitle,
            _ => Self::None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::MascotQueryNumber => "Mascot query number",
            Self::MultiPeakListNativeId => "multiple peak list nativeID format",
            Self::SinglePeakListNativeId => "single peak list nativeID format",
            Self::ScanNumberNativeId => "scan number only nativeID format",
            Self::MzmlId => "mzML unique identifier",
            Self::MzdataId => "spectrum identifier nativeID format",
            Self::WiffNativeId => "WIFF nativeID format",
            Self::SpectrumNativeId => "spectrum native id",
            Self::WiffMgfTitle => "spectrum title",
            Self::None => "none",
        }
    }
}

impl fmt::Display for SpectrumIdFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classification of a raw peak file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpectrumFileFormat {
    Mgf,
    Pkl,
    Mzml,
    Mzxml,
    Ms2,
    Apl,
    Dta,
    PrideXml,
    Mzdata,
    Unknown,
}

pub const FILE_FORMAT_TABLE: &[(&str, SpectrumFileFormat)] = &[
    ("MS:1000613", SpectrumFileFormat::Dta),
    ("MS:1001062", SpectrumFileFormat::Mgf),
    ("MS:1000565", SpectrumFileFormat::Pkl),
    ("MS:1002996", SpectrumFileFormat::Apl),
    ("MS:1000584", SpectrumFileFormat::Mzml),
    ("MS:1000562", SpectrumFileFormat::Mzml),
    ("MS:1000566", SpectrumFileFormat::Mzxml),
    ("MS:1001466", SpectrumFileFormat::Ms2),
    ("MS:1002600", SpectrumFileFormat::PrideXml),
];

impl SpectrumFileFormat {
    pub fn from_accession(accession: &str) -> Self {
        match accession.trim() {
            "MS:1000613" => Self::Dta,
            "MS:1001062" => Self::Mgf,
            "MS:1000565" => Self::Pkl,
            "MS:1002996" => Self::Apl,
            "MS:1000584" | "MS:1000562" => Self::Mzml,
            "MS:1000566" => Self::Mzxml,
            "MS:1001466" => Self::Ms2,
            "MS:1002600" => Self::PrideXml,
            _ => Self::Unknown,
        }
    }

    /// Classifies by file extension, ignoring a trailing `.gz` or `.zip`.
    pub fn from_location(location: &str) -> Self {
        let lower = strip_compression(&real_file_name(location)).to_ascii_lowercase();
        let ext = match lower.rsplit_once('.') {
            Some((_, ext)) => ext,
            None => return Self::Unknown,
        };
        match ext {
            MZXML_EXT => Self::Mzxml,
            DTA_EXT => Self::Dta,
            MGF_EXT => Self::Mgf,
            MZML_EXT => Self::Mzml,
            APL_EXT => Self::Apl,
            PKL_EXT => Self::Pkl,
            MS2_EXT => Self::Ms2,
            XML_EXT => Self::Mzdata,
            _ => Self::Unknown,
        }
    }

    /// Accession first, then the location, then the declared name.
    pub fn classify(accession: Option<&str>, location: Option<&str>, name: Option<&str>) -> Self {
        if let Some(acc) = accession {
            let format = Self::from_accession(acc);
            if format != Self::Unknown {
                return format;
            }
        }
        if let Some(loc) = location.filter(|l| !l.is_empty()) {
            return Self::from_location(loc);
        }
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            return Self::from_location(name);
        }
        Self::Unknown
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Mgf => "MGF",
            Self::Pkl => "PKL",
            Self::Mzml => "MZML",
            Self::Mzxml => "MZXML",
            Self::Ms2 => "MS2",
            Self::Apl => "APL",
            Self::Dta => "DTA",
            Self::PrideXml => "PRIDE-XML",
            Self::Mzdata => "MZDATA",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for SpectrumFileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Last path component of a declared location, accepting both separators.
pub fn real_file_name(location: &str) -> String {
    let trimmed = location.strip_prefix("file://").unwrap_or(location);
    let last = trimmed.rsplit('/').next().unwrap_or(trimmed);
    last.rsplit('\\').next().unwrap_or(last).to_string()
}

pub fn strip_compression(name: &str) -> &str {
    let lower = name.to_ascii_lowercase();
    if lower.ends_with(".gz") {
        &name[..name.len() - 3]
    } else if lower.ends_with(".zip") {
        &name[..name.len() - 4]
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_agree_with_match_arms() {
        for (acc, format) in ID_FORMAT_TABLE {
            assert_eq!(SpectrumIdFormat::from_accession(acc), *format);
        }
        for (acc, format) in FILE_FORMAT_TABLE {
            assert_eq!(SpectrumFileFormat::from_accession(acc), *format);
        }
    }

    #[test]
    fn real_file_name_handles_both_separators() {
        assert_eq!(real_file_name("file:///data/run/a.mgf"), "a.mgf");
        assert_eq!(real_file_name("C:\\data\\b.mzML"), "b.mzML");
        assert_eq!(real_file_name("c.ms2"), "c.ms2");
    }
}
