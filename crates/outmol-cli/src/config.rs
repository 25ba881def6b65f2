pub mod defaults;
pub mod models;

use crate::cli::ExtractArgs;
use crate::error::{CliError, Result};
use defaults::{DefaultsConfig, FALLBACK_STEM};
use models::AppConfig;
use outmol::core::units::EnergyUnit;
use outmol::engine::config::{DiscoveryFilter, ExtractionConfigBuilder};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialExtractionConfig {
    #[serde(rename = "energy-unit")]
    energy_unit: Option<EnergyUnit>,
    precision: Option<usize>,
    forces: Option<bool>,
    orbitals: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialDiscoveryConfig {
    extension: Option<String>,
    #[serde(rename = "directory-prefix")]
    directory_prefix: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialOutputConfig {
    stem: Option<PathBuf>,
    csv: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialAppConfig {
    extraction: Option<PartialExtractionConfig>,
    discovery: Option<PartialDiscoveryConfig>,
    output: Option<PartialOutputConfig>,
}

impl PartialAppConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Loads the file named by `--config`, or starts from an empty configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn merge_with_cli(mut self, args: &ExtractArgs) -> Result<AppConfig> {
        self.apply_set_values(&args.set_values)?;

        let extraction = self.extraction.take().unwrap_or_default();
        let discovery = self.discovery.take().unwrap_or_default();
        let output = self.output.take().unwrap_or_default();
        let defaults = DefaultsConfig::default();

        let mut builder = ExtractionConfigBuilder::new();
        if let Some(unit) = args.unit.or(extraction.energy_unit) {
            builder = builder.energy_unit(unit);
        }
        if let Some(precision) = args.precision.or(extraction.precision) {
            builder = builder.precision(precision);
        }
        if let Some(forces) = Self::merge_switch(args.no_forces, extraction.forces) {
            builder = builder.parse_forces(forces);
        }
        if let Some(orbitals) = Self::merge_switch(args.no_orbitals, extraction.orbitals) {
            builder = builder.parse_orbitals(orbitals);
        }
        let extraction = builder
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        let mut filter = DiscoveryFilter::default();
        if let Some(ext) = args.extension.as_ref().or(discovery.extension.as_ref()) {
            filter = filter
                .with_extension(ext)
                .map_err(|e| CliError::Config(e.to_string()))?;
        }
        if let Some(prefix) = args
            .directory_prefix
            .as_ref()
            .or(discovery.directory_prefix.as_ref())
        {
            filter = filter
                .with_directory_prefix(prefix)
                .map_err(|e| CliError::Config(e.to_string()))?;
        }

        let output_stem = args
            .output
            .clone()
            .or(output.stem)
            .unwrap_or_else(|| default_stem(&args.root));

        Ok(AppConfig {
            root: args.root.clone(),
            output_stem,
            write_csv: args.csv || output.csv.unwrap_or(defaults.write_csv),
            extraction,
            discovery: filter,
        })
    }

    /// A `--no-*` flag always wins; otherwise the file decides, and `None` leaves the
    /// library default in place.
    fn merge_switch(cli_disabled: bool, file_val: Option<bool>) -> Option<bool> {
        if cli_disabled { Some(false) } else { file_val }
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            match key {
                "extraction.energy-unit" => {
                    self.extraction
                        .get_or_insert_with(Default::default)
                        .energy_unit = Some(parse_value(key, value_str)?);
                }
                "extraction.precision" => {
                    self.extraction
                        .get_or_insert_with(Default::default)
                        .precision = Some(parse_value(key, value_str)?);
                }
                "extraction.forces" => {
                    self.extraction.get_or_insert_with(Default::default).forces =
                        Some(parse_value(key, value_str)?);
                }
                "extraction.orbitals" => {
                    self.extraction
                        .get_or_insert_with(Default::default)
                        .orbitals = Some(parse_value(key, value_str)?);
                }
                "discovery.extension" => {
                    self.discovery
                        .get_or_insert_with(Default::default)
                        .extension = Some(value_str.to_string());
                }
                "discovery.directory-prefix" => {
                    self.discovery
                        .get_or_insert_with(Default::default)
                        .directory_prefix = Some(value_str.to_string());
                }
                "output.stem" => {
                    self.output.get_or_insert_with(Default::default).stem =
                        Some(PathBuf::from(value_str));
                }
                "output.csv" => {
                    self.output.get_or_insert_with(Default::default).csv =
                        Some(parse_value(key, value_str)?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value_str: &str) -> Result<T> {
    value_str.trim().parse().map_err(|_| {
        CliError::Config(format!("Invalid value for {}: {}", key, value_str))
    })
}

/// Names the outputs after the root directory, written to the working directory.
fn default_stem(root: &Path) -> PathBuf {
    std::fs::canonicalize(root)
        .ok()
        .as_deref()
        .unwrap_or(root)
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(FALLBACK_STEM))
}
