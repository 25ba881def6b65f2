pub const MANIFEST_SUFFIX: &str = "_paths.txt";
pub const CORPUS_EXTENSION: &str = "json";
pub const TABLE_EXTENSION: &str = "csv";

/// Stem used when the root directory has no usable name, e.g. `/`.
pub const FALLBACK_STEM: &str = "outmol";

pub struct DefaultsConfig {
    pub write_csv: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self { write_csv: false }
    }
}
