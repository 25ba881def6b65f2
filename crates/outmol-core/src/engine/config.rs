use crate::core::io::numeric::{DEFAULT_PRECISION, MAX_PRECISION, NumericNormalizer};
use crate::core::units::EnergyUnit;
use thiserror::Error;

pub const DEFAULT_EXTENSION: &str = "outmol";
pub const DEFAULT_DIRECTORY_PREFIX: &str = "dmol3";

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Invalid precision {0}: must be at most {max} fractional digits", max = MAX_PRECISION)]
    InvalidPrecision(usize),
    #[error("Invalid {field}: {reason}")]
    InvalidFilter { field: &'static str, reason: String },
}

/// Controls which sections of a log are extracted and how numbers are stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionConfig {
    pub energy_unit: EnergyUnit,
    /// Fractional digits every extracted float is rounded to.
    pub precision: usize,
    pub parse_forces: bool,
    pub parse_orbitals: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            energy_unit: EnergyUnit::default(),
            precision: DEFAULT_PRECISION,
            parse_forces: true,
            parse_orbitals: true,
        }
    }
}

impl ExtractionConfig {
    pub fn normalizer(&self) -> NumericNormalizer {
        NumericNormalizer::new(self.precision)
    }
}

#[derive(Default)]
pub struct ExtractionConfigBuilder {
    energy_unit: Option<EnergyUnit>,
    precision: Option<usize>,
    parse_forces: Option<bool>,
    parse_orbitals: Option<bool>,
}

impl ExtractionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn energy_unit(mut self, unit: EnergyUnit) -> Self {
        self.energy_unit = Some(unit);
        self
    }
    pub fn precision(mut self, digits: usize) -> Self {
        self.precision = Some(digits);
        self
    }
    pub fn parse_forces(mut self, enabled: bool) -> Self {
        self.parse_forces = Some(enabled);
        self
    }
    pub fn parse_orbitals(mut self, enabled: bool) -> Self {
        self.parse_orbitals = Some(enabled);
        self
    }

    pub fn build(self) -> Result<ExtractionConfig, ConfigError> {
        let defaults = ExtractionConfig::default();
        let precision = self.precision.unwrap_or(defaults.precision);
        if precision > MAX_PRECISION {
            return Err(ConfigError::InvalidPrecision(precision));
        }
        Ok(ExtractionConfig {
            energy_unit: self.energy_unit.unwrap_or(defaults.energy_unit),
            precision,
            parse_forces: self.parse_forces.unwrap_or(defaults.parse_forces),
            parse_orbitals: self.parse_orbitals.unwrap_or(defaults.parse_orbitals),
        })
    }
}

/// Selects which files under a root directory are treated as logs.
///
/// A file matches when its extension equals `extension` (if set) and the name of its
/// containing directory starts with `directory_prefix` (if set).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryFilter {
    pub extension: Option<String>,
    pub directory_prefix: Option<String>,
}

impl Default for DiscoveryFilter {
    fn default() -> Self {
        Self {
            extension: Some(DEFAULT_EXTENSION.to_string()),
            directory_prefix: Some(DEFAULT_DIRECTORY_PREFIX.to_string()),
        }
    }
}

impl DiscoveryFilter {
    /// A filter that accepts every regular file.
    pub fn any() -> Self {
        Self {
            extension: None,
            directory_prefix: None,
        }
    }

    /// Accepts `"outmol"` as well as `".outmol"`; an empty string disables the check.
    pub fn with_extension(mut self, extension: &str) -> Result<Self, ConfigError> {
        let trimmed = extension.trim().trim_start_matches('.');
        if trimmed.contains(['/', '\\']) {
            return Err(ConfigError::InvalidFilter {
                field: "extension",
                reason: format!("'{}' contains a path separator", extension),
            });
        }
        self.extension = (!trimmed.is_empty()).then(|| trimmed.to_string());
        Ok(self)
    }

    /// An empty string disables the check.
    pub fn with_directory_prefix(mut self, prefix: &str) -> Result<Self, ConfigError> {
        if prefix.contains(['/', '\\']) {
            return Err(ConfigError::InvalidFilter {
                field: "directory prefix",
                reason: format!("'{}' contains a path separator", prefix),
            });
        }
        self.directory_prefix = (!prefix.is_empty()).then(|| prefix.to_string());
        Ok(self)
    }
}
