use super::defaults::{CORPUS_EXTENSION, MANIFEST_SUFFIX, TABLE_EXTENSION};
use outmol::engine::config::{DiscoveryFilter, ExtractionConfig};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Fully resolved settings of one `extract` run.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub root: PathBuf,
    pub output_stem: PathBuf,
    pub write_csv: bool,
    pub extraction: ExtractionConfig,
    pub discovery: DiscoveryFilter,
}

impl AppConfig {
    pub fn manifest_path(&self) -> PathBuf {
        let mut name = OsString::from(self.output_stem.as_os_str());
        name.push(MANIFEST_SUFFIX);
        PathBuf::from(name)
    }

    pub fn corpus_path(&self) -> PathBuf {
        with_appended_extension(&self.output_stem, CORPUS_EXTENSION)
    }

    pub fn table_path(&self) -> PathBuf {
        with_appended_extension(&self.output_stem, TABLE_EXTENSION)
    }
}

/// Appends rather than replaces, so a stem like `run.v2` keeps its dot.
fn with_appended_extension(stem: &Path, extension: &str) -> PathBuf {
    let mut name = OsString::from(stem.as_os_str());
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}
