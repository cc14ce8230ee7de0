//! Canonical spectrum keys derived from the source ids written by search engines.
//!
//! Query numbers and peak-list indices are 0-based at the source and 1-based in the
//! raw readers, so those schemes shift by one.

use crate::cv::SpectrumIdFormat;

pub const QUERY_PREFIX: &str = "query=";
pub const INDEX_PREFIX: &str = "index=";
pub const FILE_PREFIX: &str = "file=";
pub const MZML_ID_PREFIX: &str = "mzMLid=";
pub const SCAN_PREFIX: &str = "scan=";

impl SpectrumIdFormat {
    /// Token stripped from source ids of this scheme, if it has one.
    pub fn source_prefix(&self) -> Option<&'static str> {
        match self {
            Self::MascotQueryNumber => Some(QUERY_PREFIX),
            Self::MultiPeakListNativeId => Some(INDEX_PREFIX),
            Self::SinglePeakListNativeId => Some(FILE_PREFIX),
            Self::MzmlId => Some(MZML_ID_PREFIX),
            Self::ScanNumberNativeId => Some(SCAN_PREFIX),
            _ => None,
        }
    }

    fn key_offset(&self) -> i64 {
        match self {
            Self::MascotQueryNumber | Self::MultiPeakListNativeId => 1,
            _ => 0,
        }
    }

    /// Multi-peak-list keys are positions, everything else is looked up by id.
    pub fn fetch_by_index(&self) -> bool {
        matches!(self, Self::MultiPeakListNativeId)
    }
}

/// `[+-]?\d+`
pub fn is_signed_integer(value: &str) -> bool {
    let digits = value.strip_prefix(['+', '-']).unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Never fails: a remainder that should be numeric but is not degrades to the raw
/// source id.
pub fn resolve_spectrum_key(
    scheme: SpectrumIdFormat,
    source_id: &str,
    title: Option<&str>,
) -> String {
    let prefix = match scheme.source_prefix() {
        Some(prefix) => prefix,
        None => return title.unwrap_or(source_id).to_string(),
    };
    let stripped = source_id.replace(prefix, "");
    match scheme {
        SpectrumIdFormat::MascotQueryNumber | SpectrumIdFormat::MultiPeakListNativeId => {
            if !is_signed_integer(&stripped) {
                return source_id.to_string();
            }
            stripped
                .parse::<i64>()
                .ok()
                .and_then(|n| n.checked_add(scheme.key_offset()))
                .map(|key| key.to_string())
                .unwrap_or_else(|| source_id.to_string())
        }
        _ => stripped,
    }
}

/// Inverse of [`resolve_spectrum_key`] for prefix-based schemes.
pub fn source_id_for_key(scheme: SpectrumIdFormat, key: &str) -> Option<String> {
    let prefix = scheme.source_prefix()?;
    let offset = scheme.key_offset();
    if offset == 0 {
        return Some(format!("{prefix}{key}"));
    }
    let n: i64 = key.parse().ok()?;
    Some(format!("{prefix}{}", n.checked_sub(offset)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_integer_pattern() {
        assert!(is_signed_integer("12"));
        assert!(is_signed_integer("-3"));
        assert!(is_signed_integer("+7"));
        assert!(!is_signed_integer(""));
        assert!(!is_signed_integer("+"));
        assert!(!is_signed_integer("1.5"));
        assert!(!is_signed_integer("controllerType=0 scan=5"));
    }
}
