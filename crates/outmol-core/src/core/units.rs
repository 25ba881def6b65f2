use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Hartree to electron-volt factor used by the DMol3 post-processing tools.
pub const HARTREE_TO_EV: f64 = 27.212;

/// The unit an extracted total energy is stored in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnergyUnit {
    /// Raw value as printed by the SCF table.
    Hartree,
    #[default]
    #[serde(alias = "ev")]
    ElectronVolt,
}

impl EnergyUnit {
    /// Converts a value in Hartree into this unit.
    pub fn from_hartree(self, value: f64) -> f64 {
        match self {
            EnergyUnit::Hartree => value,
            EnergyUnit::ElectronVolt => value * HARTREE_TO_EV,
        }
    }

    /// Short symbol used in table headers.
    pub fn symbol(self) -> &'static str {
        match self {
            EnergyUnit::Hartree => "Ha",
            EnergyUnit::ElectronVolt => "eV",
        }
    }
}

impl fmt::Display for EnergyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown energy unit '{0}'. Expected 'hartree' (or 'ha') or 'ev'.")]
pub struct UnknownEnergyUnit(pub String);

impl FromStr for EnergyUnit {
    type Err = UnknownEnergyUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hartree" | "ha" => Ok(EnergyUnit::Hartree),
            "ev" | "electron-volt" => Ok(EnergyUnit::ElectronVolt),
            _ => Err(UnknownEnergyUnit(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hartree_is_identity() {
        assert_eq!(EnergyUnit::Hartree.from_hartree(-1.5), -1.5);
    }

    #[test]
    fn electron_volt_applies_conversion_factor() {
        assert!((EnergyUnit::ElectronVolt.from_hartree(2.0) - 54.424).abs() < 1e-12);
    }

    #[test]
    fn parses_common_spellings() {
        assert_eq!("Ha".parse::<EnergyUnit>(), Ok(EnergyUnit::Hartree));
        assert_eq!("hartree".parse::<EnergyUnit>(), Ok(EnergyUnit::Hartree));
        assert_eq!(" eV ".parse::<EnergyUnit>(), Ok(EnergyUnit::ElectronVolt));
        assert!("kcal".parse::<EnergyUnit>().is_err());
    }

    #[test]
    fn default_is_electron_volt() {
        assert_eq!(EnergyUnit::default(), EnergyUnit::ElectronVolt);
        assert_eq!(EnergyUnit::default().to_string(), "eV");
    }
}
