use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write, copy};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use tracing::{info, warn};

#[cfg(feature = "mt")]
use rayon::prelude::*;

use crate::validators::ValidatorError;

pub const PEAKS_SEPARATOR: &str = "##";

/// Main input and peak files as the validators will read them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedInput {
    pub main: PathBuf,
    pub peak_files: Vec<PathBuf>,
}

/// Expands `--peak` values and the `##`-separated `--peaks` list into files.
/// Directories contribute their regular files sorted by name; duplicates are dropped.
pub fn resolve_peak_files(peak: &[PathBuf], peaks: Option<&str>) -> Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = peak.to_vec();
    if let Some(list) = peaks {
        entries.extend(
            list.split(PEAKS_SEPARATOR)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
        );
    }

    let mut seen = HashSet::new();
    let mut files = Vec::new();
    for entry in entries {
        if entry.is_dir() {
            let mut children: Vec<PathBuf> = fs::read_dir(&entry)
                .with_context(|| format!("failed to list {}", entry.display()))?
                .filter_map(|e| e.ok().map(|e| e.path()))
                .filter(|p| p.is_file())
                .collect();
            children.sort();
            for child in children {
                if seen.insert(child.clone()) {
                    files.push(child);
                }
            }
        } else if entry.is_file() {
            if seen.insert(entry.clone()) {
                files.push(entry);
            }
        } else {
            return Err(ValidatorError::MissingFile {
                kind: "peak",
                path: entry,
            }
            .into());
        }
    }
    Ok(files)
}

pub fn is_gzip(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// Output path of an archive: its name without `.gz`, in `unpack_dir` or beside it.
pub fn unpacked_path(archive: &Path, unpack_dir: Option<&Path>) -> PathBuf {
    let stem = archive
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_default();
    match unpack_dir {
        Some(dir) => dir.join(stem),
        None => archive.with_file_name(stem),
    }
}

pub fn gunzip(archive: &Path, unpack_dir: Option<&Path>) -> Result<PathBuf> {
    let out = unpacked_path(archive, unpack_dir);
    let source =
        File::open(archive).with_context(|| format!("failed to open {}", archive.display()))?;
    let mut decoder = GzDecoder::new(source);
    let target =
        File::create(&out).with_context(|| format!("failed to create {}", out.display()))?;
    let mut writer = BufWriter::new(target);
    copy(&mut decoder, &mut writer)
        .with_context(|| format!("failed to decompress {}", archive.display()))?;
    writer.flush()?;
    Ok(out)
}

/// Decompresses every `.gz` entry, one task per archive. A failed archive is
/// logged and left out; the rest of the batch continues.
pub fn decompress_all(
    files: &[PathBuf],
    unpack_dir: Option<&Path>,
    threads: usize,
) -> Result<Vec<PathBuf>> {
    if let Some(dir) = unpack_dir {
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    }

    let task = |path: &PathBuf| -> Option<PathBuf> {
        if !is_gzip(path) {
            return Some(path.clone());
        }
        match gunzip(path, unpack_dir) {
            Ok(out) => {
                info!(archive = %path.display(), out = %out.display(), "archive_unpacked");
                Some(out)
            }
            Err(err) => {
                warn!(archive = %path.display(), error = %format!("{:#}", err), "archive_failed");
                None
            }
        }
    };

    #[cfg(feature = "mt")]
    let results: Vec<Option<PathBuf>> = {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build thread pool: {}", e))?;
        pool.install(|| files.par_iter().map(task).collect())
    };

    #[cfg(not(feature = "mt"))]
    let results: Vec<Option<PathBuf>> = {
        let _ = threads;
        files.iter().map(task).collect()
    };

    let mut seen = HashSet::new();
    Ok(results
        .into_iter()
        .flatten()
        .filter(|p| seen.insert(p.clone()))
        .collect())
}

/// Unpacks the main input and the peak files. A main input that cannot be
/// unpacked is an error; a peak archive that cannot is dropped.
pub fn prepare(
    main: &Path,
    peak_files: &[PathBuf],
    unpack_dir: Option<&Path>,
    threads: usize,
) -> Result<PreparedInput> {
    let main = if is_gzip(main) {
        if let Some(dir) = unpack_dir {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        gunzip(main, unpack_dir)?
    } else {
        main.to_path_buf()
    };
    let peak_files = decompress_all(peak_files, unpack_dir, threads)?;
    Ok(PreparedInput { main, peak_files })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpacked_names_drop_gz() {
        assert_eq!(
            unpacked_path(Path::new("/data/a.mgf.gz"), None),
            PathBuf::from("/data/a.mgf")
        );
        assert_eq!(
            unpacked_path(Path::new("/data/a.mgf.gz"), Some(Path::new("/tmp/u"))),
            PathBuf::from("/tmp/u/a.mgf")
        );
        assert!(is_gzip(Path::new("x.MZID.GZ")));
        assert!(!is_gzip(Path::new("x.mzid")));
    }
}
