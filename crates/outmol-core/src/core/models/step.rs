use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A single Kohn-Sham level from an orbital energy table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Orbital {
    pub label: String,
    pub eigenvalue: f64,
    pub occupation: f64,
}

/// One geometry-optimization iteration.
///
/// Coordinates and forces are in atomic units. `energy` uses the unit the extraction
/// was configured with and is only set when the step's SCF cycle converged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub energy: Option<f64>,
    pub step_index: Option<u32>,
    pub coordinates: Vec<Point3<f64>>,
    pub species: Vec<String>,
    /// Empty when per-atom forces were not requested.
    #[serde(default)]
    pub forces: Vec<Vector3<f64>>,
    pub max_force: f64,
    #[serde(default)]
    pub orbitals: Vec<Orbital>,
}

impl StepRecord {
    pub fn atom_count(&self) -> usize {
        self.coordinates.len()
    }

    pub fn has_forces(&self) -> bool {
        !self.forces.is_empty()
    }

    /// Checks that species and (when present) forces line up with the coordinates.
    pub fn is_consistent(&self) -> bool {
        self.species.len() == self.coordinates.len()
            && (self.forces.is_empty() || self.forces.len() == self.coordinates.len())
    }
}

/// Mutable state filled field by field while a log is scanned.
///
/// A record is complete once it holds a geometry and a max-force value. Taking it
/// clears every field except `orbitals`, which are only printed now and then and
/// therefore carry over to the following steps until a new table replaces them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepAccumulator {
    pub energy: Option<f64>,
    pub step_index: Option<u32>,
    pub coordinates: Vec<Point3<f64>>,
    pub species: Vec<String>,
    pub forces: Vec<Vector3<f64>>,
    pub max_force: Option<f64>,
    pub orbitals: Vec<Orbital>,
}

impl StepAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_complete(&self) -> bool {
        !self.coordinates.is_empty() && self.max_force.is_some()
    }

    /// Replaces the geometry of the current step in one go so the per-atom vectors
    /// can never drift apart.
    pub fn set_geometry(
        &mut self,
        species: Vec<String>,
        coordinates: Vec<Point3<f64>>,
        forces: Vec<Vector3<f64>>,
    ) {
        debug_assert_eq!(species.len(), coordinates.len());
        debug_assert!(forces.is_empty() || forces.len() == coordinates.len());
        self.species = species;
        self.coordinates = coordinates;
        self.forces = forces;
    }

    /// Emits the finished record, if any, and resets for the next step.
    pub fn take_record(&mut self) -> Option<StepRecord> {
        if !self.is_complete() {
            return None;
        }
        let carried = self.orbitals.clone();
        let finished = std::mem::replace(self, Self::carrying_orbitals(carried));

        Some(StepRecord {
            energy: finished.energy,
            step_index: finished.step_index,
            coordinates: finished.coordinates,
            species: finished.species,
            forces: finished.forces,
            max_force: finished.max_force?,
            orbitals: finished.orbitals,
        })
    }

    /// A fresh accumulator that keeps the given orbital table.
    fn carrying_orbitals(orbitals: Vec<Orbital>) -> Self {
        Self {
            orbitals,
            ..Self::default()
        }
    }
}
