use super::diagnostics::ParseWarning;
use super::step::StepRecord;
use crate::core::units::EnergyUnit;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How the scan of a single file ended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "status")]
pub enum ScanOutcome {
    /// The whole file was scanned.
    #[default]
    Completed,
    /// An SCF cycle failed to converge; nothing after `line` was read.
    ScfNotConverged { line: usize },
    /// The file could not be opened or read.
    Unreadable { reason: String },
}

impl ScanOutcome {
    pub fn is_truncated(&self) -> bool {
        matches!(self, ScanOutcome::ScfNotConverged { .. })
    }
}

/// Everything extracted from one log file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Position of the file in the discovery order; doubles as the manifest key.
    pub index: usize,
    pub path: PathBuf,
    pub atom_count: usize,
    pub outcome: ScanOutcome,
    pub steps: Vec<StepRecord>,
    #[serde(default, skip_deserializing)]
    pub warnings: Vec<ParseWarning>,
}

impl FileRecord {
    pub fn unreadable(index: usize, path: PathBuf, reason: impl Into<String>) -> Self {
        Self {
            index,
            path,
            atom_count: 0,
            outcome: ScanOutcome::Unreadable {
                reason: reason.into(),
            },
            steps: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// The ordered collection of every file extracted in one batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Corpus {
    pub energy_unit: EnergyUnit,
    pub files: Vec<FileRecord>,
}

impl Corpus {
    pub fn new(energy_unit: EnergyUnit) -> Self {
        Self {
            energy_unit,
            files: Vec::new(),
        }
    }

    pub fn total_steps(&self) -> usize {
        self.files.iter().map(|f| f.steps.len()).sum()
    }

    pub fn unreadable_count(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, ScanOutcome::Unreadable { .. }))
            .count()
    }

    /// Iterates `(file index, step)` pairs in file order.
    pub fn steps(&self) -> impl Iterator<Item = (usize, &StepRecord)> {
        self.files
            .iter()
            .flat_map(|f| f.steps.iter().map(move |s| (f.index, s)))
    }
}
