//! Reader for DMol3 `.outmol` geometry-optimization logs.
//!
//! The log has no explicit step delimiter. Each iteration prints (some of) an orbital
//! table, an SCF energy table, the atomic coordinates with their derivatives and a boxed
//! convergence table, in that order. The reader makes a single forward pass, feeds
//! every recognized section into a [`StepAccumulator`] and emits a record as soon as
//! the accumulator holds both a geometry and a max-force value. The convergence table
//! is the last thing written per step, so that condition closes a step even when the
//! energy or orbital sections were skipped for it.

use super::atom_count::resolve_atom_count;
use super::numeric::{NumericNormalizer, split_glued_numbers};
use super::traits::LogFile;
use crate::core::models::corpus::{FileRecord, ScanOutcome};
use crate::core::models::diagnostics::{ParseWarning, ParseWarningKind};
use crate::core::models::step::{Orbital, StepAccumulator, StepRecord};
use crate::engine::config::ExtractionConfig;
use crate::engine::error::ExtractError;
use nalgebra::{Point3, Vector3};
use regex::Regex;
use std::io::{BufRead, Read};
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::LazyLock;
use tracing::trace;

const ENERGY_HEADER: [&str; 7] = [
    "Total",
    "Energy",
    "Binding",
    "E",
    "Cnvgnce",
    "Time",
    "Iter",
];
const GEOMETRY_HEADER: [&str; 3] = ["ATOMIC", "COORDINATES", "(au)"];
const SCF_CONVERGED: &str = "Message: SCF converged";
const SCF_NOT_CONVERGED: &str = "Error: SCF iterations not converged";
const STEP_MARKER: &str = "Step";
const MAX_FORCE_MARKER: &str = "|F|max";

/// Atom rows start this many lines below the coordinate header.
const GEOMETRY_ROW_OFFSET: usize = 2;
/// Orbital rows start this many lines below the table header (units line, blank line).
const ORBITAL_ROW_OFFSET: usize = 3;

static STEP_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Step\s+(\d+)").expect("Failed to compile step pattern"));
static MAX_FORCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\|\s*\|F\|max\s*\|\s*(-?\d+\.\d+(?:[Ee][+-]?\d*)?)")
        .expect("Failed to compile max-force pattern")
});

/// The structured content of one `.outmol` file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutmolLog {
    pub atom_count: usize,
    pub steps: Vec<StepRecord>,
    pub outcome: ScanOutcome,
    pub warnings: Vec<ParseWarning>,
}

impl OutmolLog {
    pub fn into_file_record(self, index: usize, path: PathBuf) -> FileRecord {
        FileRecord {
            index,
            path,
            atom_count: self.atom_count,
            outcome: self.outcome,
            steps: self.steps,
            warnings: self.warnings,
        }
    }
}

pub struct OutmolFile;

impl OutmolFile {
    /// Parses a log that is already in memory.
    pub fn parse_str(text: &str, config: &ExtractionConfig) -> OutmolLog {
        let lines: Vec<&str> = text.lines().collect();
        Scanner::new(&lines, config).run()
    }
}

impl LogFile for OutmolFile {
    type Output = OutmolLog;
    type Error = ExtractError;

    fn read_from(
        reader: &mut impl BufRead,
        config: &ExtractionConfig,
    ) -> Result<Self::Output, Self::Error> {
        // DMol3 occasionally writes Latin-1 bytes into free-text lines; those must not
        // cost us the whole file.
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let text = String::from_utf8_lossy(&bytes);
        Ok(Self::parse_str(&text, config))
    }
}

struct AtomRow {
    species: String,
    position: Point3<f64>,
    force: Option<Vector3<f64>>,
}

struct Scanner<'a> {
    lines: &'a [&'a str],
    config: &'a ExtractionConfig,
    normalizer: NumericNormalizer,
    atom_count: usize,
    accumulator: StepAccumulator,
    steps: Vec<StepRecord>,
    warnings: Vec<ParseWarning>,
    reported_missing_atom_count: bool,
}

impl<'a> Scanner<'a> {
    fn new(lines: &'a [&'a str], config: &'a ExtractionConfig) -> Self {
        Self {
            lines,
            config,
            normalizer: config.normalizer(),
            atom_count: resolve_atom_count(lines),
            accumulator: StepAccumulator::new(),
            steps: Vec::new(),
            warnings: Vec::new(),
            reported_missing_atom_count: false,
        }
    }

    fn run(mut self) -> OutmolLog {
        let mut outcome = ScanOutcome::Completed;

        for idx in 0..self.lines.len() {
            if let ControlFlow::Break(line) = self.handle_line(idx) {
                outcome = ScanOutcome::ScfNotConverged { line };
                break;
            }
            if let Some(record) = self.accumulator.take_record() {
                trace!(
                    "Step record {} closed at line {}",
                    self.steps.len(),
                    idx + 1
                );
                self.steps.push(record);
            }
        }

        OutmolLog {
            atom_count: self.atom_count,
            steps: self.steps,
            outcome,
            warnings: self.warnings,
        }
    }

    /// Dispatches one line to the first marker that recognizes it. Breaks with the
    /// 1-based line number of an SCF failure message.
    fn handle_line(&mut self, idx: usize) -> ControlFlow<usize> {
        let line = self.lines[idx];

        if contains_tokens(line, &ENERGY_HEADER) {
            return self.read_energy(idx);
        }
        if self.config.parse_orbitals && is_orbital_header(line) {
            self.read_orbitals(idx);
        } else if contains_tokens(line, &GEOMETRY_HEADER) {
            self.read_geometry(idx);
        } else if line.contains(STEP_MARKER) {
            self.read_step_index(idx);
        } else if line.contains(MAX_FORCE_MARKER) {
            self.read_max_force(idx);
        }
        ControlFlow::Continue(())
    }

    fn warn(&mut self, idx: usize, kind: ParseWarningKind) {
        self.warnings.push(ParseWarning::new(idx + 1, kind));
    }

    fn read_energy(&mut self, header_idx: usize) -> ControlFlow<usize> {
        for idx in header_idx + 1..self.lines.len() {
            let line = self.lines[idx];
            if line.contains(SCF_CONVERGED) {
                self.accumulator.energy = self.parse_energy_line(idx - 1);
                trace!("SCF converged at line {}", idx + 1);
                return ControlFlow::Continue(());
            }
            if line.contains(SCF_NOT_CONVERGED) {
                trace!("SCF failed at line {}, abandoning the rest of the file", idx + 1);
                return ControlFlow::Break(idx + 1);
            }
        }
        ControlFlow::Continue(())
    }

    /// The total energy is the second column of the last SCF iteration, e.g.
    /// `Ef  -113.234567Ha  -0.422346Ha  5.2E-07  0.2m  2`.
    fn parse_energy_line(&mut self, idx: usize) -> Option<f64> {
        let line = self.lines[idx];
        let Some(token) = line.split_whitespace().nth(1) else {
            let found = line.split_whitespace().count();
            self.warn(
                idx,
                ParseWarningKind::UnexpectedTokenCount {
                    record: "SCF energy line",
                    found,
                    expected: "at least 2",
                },
            );
            return None;
        };

        let value = token.strip_suffix("Ha").unwrap_or(token);
        match value.parse::<f64>().ok().filter(|v| v.is_finite()) {
            Some(hartree) => Some(
                self.normalizer
                    .canonicalize(self.config.energy_unit.from_hartree(hartree)),
            ),
            None => {
                self.warn(
                    idx,
                    ParseWarningKind::MalformedNumber {
                        field: "total energy",
                        value: token.to_string(),
                    },
                );
                None
            }
        }
    }

    fn read_orbitals(&mut self, header_idx: usize) {
        let mut orbitals = Vec::new();

        for idx in header_idx + ORBITAL_ROW_OFFSET..self.lines.len() {
            let tokens: Vec<&str> = self.lines[idx].split_whitespace().collect();
            match tokens.first() {
                Some(first) if first.parse::<f64>().is_ok() => {}
                _ => break,
            }
            if tokens.len() < 7 {
                self.warn(
                    idx,
                    ParseWarningKind::UnexpectedTokenCount {
                        record: "orbital row",
                        found: tokens.len(),
                        expected: "at least 7",
                    },
                );
                continue;
            }

            match (
                self.normalizer.parse(tokens[5]),
                self.normalizer.parse(tokens[6]),
            ) {
                (Some(eigenvalue), Some(occupation)) => orbitals.push(Orbital {
                    label: tokens[..4].join(" "),
                    eigenvalue,
                    occupation,
                }),
                (None, _) => self.warn(
                    idx,
                    ParseWarningKind::MalformedNumber {
                        field: "orbital eigenvalue",
                        value: tokens[5].to_string(),
                    },
                ),
                (_, None) => self.warn(
                    idx,
                    ParseWarningKind::MalformedNumber {
                        field: "orbital occupation",
                        value: tokens[6].to_string(),
                    },
                ),
            }
        }

        trace!(
            "Orbital table at line {} yielded {} levels",
            header_idx + 1,
            orbitals.len()
        );
        if !orbitals.is_empty() {
            self.accumulator.orbitals = orbitals;
        }
    }

    fn read_geometry(&mut self, header_idx: usize) {
        if self.atom_count == 0 && !self.reported_missing_atom_count {
            self.reported_missing_atom_count = true;
            self.warn(header_idx, ParseWarningKind::MissingAtomCount);
        }

        // The declared count comes straight from the file and may be arbitrarily large.
        let start = header_idx
            .saturating_add(GEOMETRY_ROW_OFFSET)
            .min(self.lines.len());
        let end = start.saturating_add(self.atom_count).min(self.lines.len());
        let available = end - start;
        if available < self.atom_count {
            self.warn(
                header_idx,
                ParseWarningKind::TruncatedGeometry {
                    expected: self.atom_count,
                    found: available,
                },
            );
        }

        let mut species = Vec::with_capacity(available);
        let mut coordinates = Vec::with_capacity(available);
        let mut forces = Vec::new();

        for idx in start..end {
            match self.parse_atom_row(self.lines[idx]) {
                Ok(row) => {
                    species.push(row.species);
                    coordinates.push(row.position);
                    if let Some(force) = row.force {
                        forces.push(force);
                    }
                }
                Err(kind) => self.warn(idx, kind),
            }
        }

        trace!(
            "Geometry at line {} yielded {} of {} atoms",
            header_idx + 1,
            coordinates.len(),
            self.atom_count
        );
        self.accumulator.set_geometry(species, coordinates, forces);
    }

    /// Parses `df  C  x  y  z  fx  fy  fz`, or `df  C  x  y  z` when forces are off.
    fn parse_atom_row(&self, raw: &str) -> Result<AtomRow, ParseWarningKind> {
        let repaired = split_glued_numbers(raw);
        let tokens: Vec<&str> = repaired.split_whitespace().collect();

        match (tokens.len(), self.config.parse_forces) {
            (8, _) | (5, false) => {}
            (found, true) => {
                return Err(ParseWarningKind::UnexpectedTokenCount {
                    record: "atom row",
                    found,
                    expected: "8",
                });
            }
            (found, false) => {
                return Err(ParseWarningKind::UnexpectedTokenCount {
                    record: "atom row",
                    found,
                    expected: "5 or 8",
                });
            }
        }

        let number = |pos: usize, field: &'static str| {
            self.normalizer
                .parse(tokens[pos])
                .ok_or_else(|| ParseWarningKind::MalformedNumber {
                    field,
                    value: tokens[pos].to_string(),
                })
        };

        let position = Point3::new(
            number(2, "x coordinate")?,
            number(3, "y coordinate")?,
            number(4, "z coordinate")?,
        );
        let force = if self.config.parse_forces {
            Some(Vector3::new(
                number(5, "x force")?,
                number(6, "y force")?,
                number(7, "z force")?,
            ))
        } else {
            None
        };

        Ok(AtomRow {
            species: tokens[1].to_string(),
            position,
            force,
        })
    }

    fn read_step_index(&mut self, idx: usize) {
        let Some(caps) = STEP_PATTERN.captures(self.lines[idx]) else {
            return;
        };
        let digits = &caps[1];
        match digits.parse::<u32>() {
            Ok(step) => self.accumulator.step_index = Some(step),
            Err(_) => self.warn(
                idx,
                ParseWarningKind::MalformedNumber {
                    field: "step index",
                    value: digits.to_string(),
                },
            ),
        }
    }

    fn read_max_force(&mut self, idx: usize) {
        let Some(caps) = MAX_FORCE_PATTERN.captures(self.lines[idx]) else {
            return;
        };
        let raw = &caps[1];
        self.accumulator.max_force = self.normalizer.parse_scientific(raw);
        if self.accumulator.max_force.is_none() {
            self.warn(
                idx,
                ParseWarningKind::MalformedNumber {
                    field: "max force",
                    value: raw.to_string(),
                },
            );
        }
    }
}

/// True when the whitespace-separated tokens of `line` contain `needle` as a run.
/// DMol3 pads its headers with a varying number of spaces.
fn contains_tokens(line: &str, needle: &[&str]) -> bool {
    if !line.contains(needle[0]) {
        return false;
    }
    let tokens: Vec<&str> = line.split_whitespace().collect();
    tokens.windows(needle.len()).any(|window| window == needle)
}

fn is_orbital_header(line: &str) -> bool {
    line.split_whitespace().next() == Some("state")
        && line.contains("eigenvalue")
        && line.contains("occupation")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::numeric::canonicalize;
    use crate::core::units::{EnergyUnit, HARTREE_TO_EV};
    use crate::engine::config::ExtractionConfigBuilder;
    use std::io::Cursor;

    const HEADER: &str = "\
 DMol3/2020 geometry optimization
 N_atoms =     2   N_atom_types =     2

";

    fn orbital_table(levels: &[(f64, f64)]) -> String {
        let mut s = String::from(
            "    state                         eigenvalue        occupation\n\
             \x20                                 (au)            (ev)\n\n",
        );
        for (n, (ev, occupation)) in levels.iter().enumerate() {
            s.push_str(&format!(
                "   {:>2} +    1  a      {:>12.6}  {:>10.3}   {:.3}\n",
                n + 1,
                ev / 27.2114,
                ev,
                occupation
            ));
        }
        s.push('\n');
        s
    }

    fn energy_block(energy_ha: f64, converged: bool) -> String {
        let mut s = String::from(
            "        Total Energy           Binding E       Cnvgnce     Time   Iter\n",
        );
        s.push_str(&format!(
            "Ef    {:.6}Ha    -0.412346Ha   1.1E-03      0.1m    1\n",
            energy_ha + 0.01
        ));
        s.push_str(&format!(
            "Ef    {:.6}Ha    -0.422346Ha   5.2E-07      0.2m    2\n",
            energy_ha
        ));
        if converged {
            s.push_str(" Message: SCF converged\n\n");
        } else {
            s.push_str(" Error: SCF iterations not converged\n\n");
        }
        s
    }

    fn geometry_block(rows: &[String]) -> String {
        let mut s = String::from(
            "df              ATOMIC  COORDINATES (au)                              DERIVATIVES (au)\n\
             df              x          y          z                        x          y          z\n",
        );
        for row in rows {
            s.push_str(row);
            s.push('\n');
        }
        s.push_str("df  binding energy      -0.4223460Ha\n\n");
        s
    }

    fn co_rows(z: f64, fz: f64) -> Vec<String> {
        vec![
            format!(
                "df  C     0.000000   0.000000  {:>10.6}      0.000000   0.000000  {:>10.6}",
                -z, fz
            ),
            format!(
                "df  O     0.000000   0.000000  {:>10.6}      0.000000   0.000000  {:>10.6}",
                z, -fz
            ),
        ]
    }

    fn convergence_table(step: u32, max_force: &str) -> String {
        format!(
            "opt==  Step {step}\n |  |F|max   |   {max_force}  |   0.002000  | No  |\n\n"
        )
    }

    fn full_step(step: u32, energy_ha: f64, z: f64, max_force: &str) -> String {
        let mut s = energy_block(energy_ha, true);
        s.push_str(&geometry_block(&co_rows(z, 0.012345)));
        s.push_str(&convergence_table(step, max_force));
        s
    }

    fn parse(text: &str) -> OutmolLog {
        OutmolFile::parse_str(text, &ExtractionConfig::default())
    }

    fn assert_consistent(log: &OutmolLog) {
        for step in &log.steps {
            assert!(step.is_consistent(), "inconsistent step: {:?}", step);
            assert!(step.atom_count() <= log.atom_count);
        }
    }

    #[test]
    fn complete_steps_are_emitted_in_file_order() {
        let text = format!(
            "{HEADER}{}{}",
            full_step(1, -113.234567, 1.065, "0.012345"),
            full_step(2, -113.245678, 1.060, "0.004512")
        );
        let log = parse(&text);

        assert_eq!(log.atom_count, 2);
        assert_eq!(log.outcome, ScanOutcome::Completed);
        assert_eq!(log.steps.len(), 2);
        assert_consistent(&log);

        let first = &log.steps[0];
        assert_eq!(first.step_index, Some(1));
        assert_eq!(
            first.energy,
            Some(canonicalize(-113.234567 * HARTREE_TO_EV, 8))
        );
        assert_eq!(first.species, vec!["C".to_string(), "O".to_string()]);
        assert_eq!(first.coordinates[0], Point3::new(0.0, 0.0, -1.065));
        assert_eq!(first.coordinates[1], Point3::new(0.0, 0.0, 1.065));
        assert_eq!(first.forces[0], Vector3::new(0.0, 0.0, 0.012345));
        assert_eq!(first.max_force, 0.012345);

        let second = &log.steps[1];
        assert_eq!(second.step_index, Some(2));
        assert_eq!(second.max_force, 0.004512);
        assert_eq!(second.coordinates[1], Point3::new(0.0, 0.0, 1.06));
    }

    #[test]
    fn energy_can_be_kept_in_hartree() {
        let config = ExtractionConfigBuilder::new()
            .energy_unit(EnergyUnit::Hartree)
            .build()
            .unwrap();
        let text = format!("{HEADER}{}", full_step(1, -113.234567, 1.065, "0.01"));
        let log = OutmolFile::parse_str(&text, &config);
        assert_eq!(log.steps[0].energy, Some(-113.234567));
    }

    #[test]
    fn scf_failure_truncates_the_file() {
        let mut text = format!("{HEADER}{}", full_step(1, -113.234567, 1.065, "0.012345"));
        text.push_str(&energy_block(-113.3, false));
        text.push_str(&geometry_block(&co_rows(1.06, 0.01)));
        text.push_str(&convergence_table(2, "0.004512"));

        let log = parse(&text);
        assert_eq!(log.steps.len(), 1);
        assert_eq!(log.steps[0].step_index, Some(1));

        let failure_line = text
            .lines()
            .position(|l| l.contains(SCF_NOT_CONVERGED))
            .unwrap()
            + 1;
        assert_eq!(
            log.outcome,
            ScanOutcome::ScfNotConverged { line: failure_line }
        );
    }

    #[test]
    fn immediate_scf_failure_yields_no_steps() {
        let text = format!("{HEADER}{}", energy_block(-113.0, false));
        let log = parse(&text);
        assert!(log.steps.is_empty());
        assert!(log.outcome.is_truncated());
    }

    #[test]
    fn log_without_markers_yields_empty_sequence() {
        let log = parse("just some text\nwith nothing interesting\n");
        assert!(log.steps.is_empty());
        assert_eq!(log.outcome, ScanOutcome::Completed);
        assert_eq!(log.atom_count, 0);

        let log = parse("");
        assert!(log.steps.is_empty());
    }

    #[test]
    fn step_without_scf_convergence_has_no_energy() {
        let mut text = String::from(HEADER);
        text.push_str(&geometry_block(&co_rows(1.065, 0.01)));
        text.push_str(&convergence_table(4, "0.02"));
        let log = parse(&text);
        assert_eq!(log.steps.len(), 1);
        assert_eq!(log.steps[0].energy, None);
        assert_eq!(log.steps[0].step_index, Some(4));
    }

    #[test]
    fn glued_force_column_is_repaired() {
        let rows = vec![
            "df  C     0.000000   0.000000  68.559875-107.243239   0.000000   0.000000".to_string(),
            "df  O     1.000000   0.000000   0.000000      0.500000   0.000000   0.000000".to_string(),
        ];
        let text = format!(
            "{HEADER}{}{}",
            geometry_block(&rows),
            convergence_table(1, "0.5")
        );
        let log = parse(&text);
        assert_eq!(log.steps.len(), 1);
        assert_eq!(log.steps[0].coordinates[0], Point3::new(0.0, 0.0, 68.559875));
        assert_eq!(log.steps[0].forces[0], Vector3::new(-107.243239, 0.0, 0.0));
        assert!(log.warnings.is_empty());
    }

    #[test]
    fn truncated_exponent_in_max_force_is_repaired() {
        let text = format!(
            "{HEADER}{}{}",
            geometry_block(&co_rows(1.0, 0.1)),
            convergence_table(1, "0.1234E-")
        );
        let log = parse(&text);
        assert_eq!(log.steps[0].max_force, 0.1234);
    }

    #[test]
    fn scientific_max_force_is_parsed() {
        let text = format!(
            "{HEADER}{}{}",
            geometry_block(&co_rows(1.0, 0.1)),
            convergence_table(1, "4.512E-03")
        );
        let log = parse(&text);
        assert_eq!(log.steps[0].max_force, 0.004512);
    }

    #[test]
    fn malformed_atom_rows_are_dropped_individually() {
        let header = " N_atoms =     3\n";
        let mut rows = co_rows(1.0, 0.1);
        rows.push("df  N     0.000000   abc   0.000000      0.000000   0.000000   0.000000".into());
        let text = format!(
            "{header}{}{}",
            geometry_block(&rows),
            convergence_table(1, "0.1")
        );
        let log = parse(&text);

        assert_eq!(log.steps.len(), 1);
        assert_eq!(log.steps[0].atom_count(), 2);
        assert_consistent(&log);
        assert!(log.warnings.iter().any(|w| matches!(
            w.kind,
            ParseWarningKind::MalformedNumber {
                field: "y coordinate",
                ..
            }
        )));
    }

    #[test]
    fn short_geometry_block_at_end_of_file_keeps_partial_atoms() {
        let header = " N_atoms =     3\n";
        let text = format!(
            "{header}{}df              ATOMIC  COORDINATES (au)\ndf   x y z\n{}\n",
            convergence_table(7, "0.3"),
            co_rows(1.0, 0.1)[0]
        );
        let log = parse(&text);

        assert_eq!(log.steps.len(), 1);
        assert_eq!(log.steps[0].atom_count(), 1);
        assert_eq!(log.steps[0].species, vec!["C".to_string()]);
        assert_consistent(&log);
        assert!(log.warnings.iter().any(|w| {
            w.kind
                == ParseWarningKind::TruncatedGeometry {
                    expected: 3,
                    found: 1,
                }
        }));
    }

    #[test]
    fn missing_atom_count_yields_no_geometry() {
        let text = format!(
            "{}{}",
            geometry_block(&co_rows(1.0, 0.1)),
            convergence_table(1, "0.1")
        );
        let log = parse(&text);
        assert_eq!(log.atom_count, 0);
        assert!(log.steps.is_empty());
        assert_eq!(log.warnings[0].kind, ParseWarningKind::MissingAtomCount);
    }

    #[test]
    fn orbitals_are_sticky_until_replaced() {
        let mut text = String::from(HEADER);
        text.push_str(&orbital_table(&[(-514.893, 2.0), (-3.359, 0.0)]));
        text.push_str(&full_step(1, -113.2, 1.065, "0.03"));
        text.push_str(&full_step(2, -113.3, 1.062, "0.02"));
        text.push_str(&orbital_table(&[(-515.0, 2.0)]));
        text.push_str(&full_step(3, -113.4, 1.061, "0.01"));

        let log = parse(&text);
        assert_eq!(log.steps.len(), 3);

        let first = &log.steps[0].orbitals;
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].label, "1 + 1 a");
        assert_eq!(first[0].eigenvalue, -514.893);
        assert_eq!(first[0].occupation, 2.0);
        assert_eq!(first[1].label, "2 + 1 a");
        assert_eq!(first[1].occupation, 0.0);

        assert_eq!(&log.steps[1].orbitals, first);
        assert_eq!(log.steps[2].orbitals.len(), 1);
        assert_eq!(log.steps[2].orbitals[0].eigenvalue, -515.0);
    }

    #[test]
    fn oversized_atom_count_reads_to_end_of_file() {
        let text = format!(
            " N_atoms = {}\n{}{}",
            usize::MAX,
            geometry_block(&co_rows(1.0, 0.1)),
            convergence_table(1, "0.1")
        );
        let log = parse(&text);

        assert_eq!(log.atom_count, usize::MAX);
        assert_eq!(log.steps.len(), 1);
        assert_eq!(log.steps[0].species, vec!["C".to_string(), "O".to_string()]);
        assert_eq!(log.steps[0].step_index, Some(1));
        assert_consistent(&log);
        assert!(log.warnings.iter().any(|w| matches!(
            w.kind,
            ParseWarningKind::TruncatedGeometry { expected, .. } if expected == usize::MAX
        )));
    }

    #[test]
    fn malformed_energy_is_cleared_with_a_warning() {
        let mut text = String::from(HEADER);
        text.push_str(
            "        Total Energy           Binding E       Cnvgnce     Time   Iter\n\
             Ef    -113.2x4Ha    -0.422346Ha   5.2E-07      0.2m    2\n\
             \x20Message: SCF converged\n\n",
        );
        text.push_str(&geometry_block(&co_rows(1.065, 0.01)));
        text.push_str(&convergence_table(1, "0.02"));

        let log = parse(&text);
        assert_eq!(log.steps.len(), 1);
        assert_eq!(log.steps[0].energy, None);
        assert!(log.warnings.iter().any(|w| {
            w.kind
                == ParseWarningKind::MalformedNumber {
                    field: "total energy",
                    value: "-113.2x4Ha".to_string(),
                }
        }));
    }

    #[test]
    fn malformed_orbital_row_is_dropped_alone() {
        let table = orbital_table(&[(-514.893, 2.0), (-3.359, 0.0), (-1.5, 0.0)])
            .replacen("-3.359", "xx", 1);
        let text = format!("{HEADER}{table}{}", full_step(1, -113.2, 1.065, "0.03"));

        let log = parse(&text);
        let orbitals = &log.steps[0].orbitals;
        assert_eq!(orbitals.len(), 2);
        assert_eq!(orbitals[0].eigenvalue, -514.893);
        assert_eq!(orbitals[1].label, "3 + 1 a");
        assert!(log.warnings.iter().any(|w| {
            w.kind
                == ParseWarningKind::MalformedNumber {
                    field: "orbital eigenvalue",
                    value: "xx".to_string(),
                }
        }));
    }

    #[test]
    fn table_without_valid_rows_keeps_previous_orbitals() {
        let garbage_table = "    state                         eigenvalue        occupation\n\
             \x20                                 (au)            (ev)\n\n\
             \x20   1 +    1  a      zz      zz   zz\n\n";
        let mut text = String::from(HEADER);
        text.push_str(&orbital_table(&[(-27.2, 2.0)]));
        text.push_str(&full_step(1, -113.2, 1.065, "0.03"));
        text.push_str(garbage_table);
        text.push_str(&full_step(2, -113.3, 1.062, "0.02"));

        let log = parse(&text);
        assert_eq!(log.steps.len(), 2);
        assert_eq!(log.steps[1].orbitals, log.steps[0].orbitals);
        assert_eq!(log.steps[1].orbitals[0].label, "1 + 1 a");
        assert_eq!(log.steps[1].orbitals[0].eigenvalue, -27.2);
        assert!(log.warnings.iter().any(|w| matches!(
            w.kind,
            ParseWarningKind::MalformedNumber { field: "orbital eigenvalue", .. }
        )));
    }

    #[test]
    fn orbitals_are_skipped_when_disabled() {
        let config = ExtractionConfigBuilder::new()
            .parse_orbitals(false)
            .build()
            .unwrap();
        let mut text = String::from(HEADER);
        text.push_str(&orbital_table(&[(-514.893, 2.0)]));
        text.push_str(&full_step(1, -113.2, 1.065, "0.03"));

        let log = OutmolFile::parse_str(&text, &config);
        assert_eq!(log.steps.len(), 1);
        assert!(log.steps[0].orbitals.is_empty());
    }

    #[test]
    fn coordinates_only_rows_are_accepted_without_forces() {
        let config = ExtractionConfigBuilder::new()
            .parse_forces(false)
            .build()
            .unwrap();
        let rows = vec![
            "df  C     0.000000   0.000000  -1.065000".to_string(),
            "df  O     0.000000   0.000000   1.065000      0.000000   0.000000  -0.012345".to_string(),
        ];
        let text = format!(
            "{HEADER}{}{}",
            geometry_block(&rows),
            convergence_table(1, "0.01")
        );
        let log = OutmolFile::parse_str(&text, &config);
        assert_eq!(log.steps.len(), 1);
        assert_eq!(log.steps[0].atom_count(), 2);
        assert!(!log.steps[0].has_forces());
    }

    #[test]
    fn coordinates_only_rows_are_rejected_when_forces_are_expected() {
        let rows = vec![
            "df  C     0.000000   0.000000  -1.065000".to_string(),
            "df  O     0.000000   0.000000   1.065000".to_string(),
        ];
        let text = format!(
            "{HEADER}{}{}",
            geometry_block(&rows),
            convergence_table(1, "0.01")
        );
        let log = parse(&text);
        assert!(log.steps.is_empty());
        assert_eq!(
            log.warnings
                .iter()
                .filter(|w| matches!(w.kind, ParseWarningKind::UnexpectedTokenCount { .. }))
                .count(),
            2
        );
    }

    #[test]
    fn last_step_marker_before_emission_wins() {
        let mut text = String::from(HEADER);
        text.push_str("opt==  Step 3\n");
        text.push_str(&geometry_block(&co_rows(1.0, 0.1)));
        text.push_str(&convergence_table(4, "0.1"));
        let log = parse(&text);
        assert_eq!(log.steps[0].step_index, Some(4));
    }

    #[test]
    fn parsing_is_deterministic() {
        let mut text = String::from(HEADER);
        text.push_str(&orbital_table(&[(-514.893, 2.0)]));
        text.push_str(&full_step(1, -113.234567891, 1.0654321987, "1.2345678912E-"));
        text.push_str(&full_step(2, -113.3, 1.062, "0.02"));

        let first = parse(&text);
        let second = parse(&text);
        assert_eq!(first, second);
    }

    #[test]
    fn read_from_tolerates_invalid_utf8() {
        let mut bytes = HEADER.as_bytes().to_vec();
        bytes.extend_from_slice(b"Comment: caf\xe9\n");
        bytes.extend_from_slice(full_step(1, -113.2, 1.065, "0.03").as_bytes());

        let log = OutmolFile::read_from(&mut Cursor::new(bytes), &ExtractionConfig::default())
            .unwrap();
        assert_eq!(log.steps.len(), 1);
    }

    #[test]
    fn read_from_path_reports_missing_files() {
        let result =
            OutmolFile::read_from_path("/no/such/dir/dmol.outmol", &ExtractionConfig::default());
        assert!(matches!(result, Err(ExtractError::Io(_))));
    }

    #[test]
    fn into_file_record_keeps_everything() {
        let text = format!("{HEADER}{}", full_step(1, -113.2, 1.065, "0.03"));
        let log = parse(&text);
        let record = log.clone().into_file_record(5, PathBuf::from("/runs/dmol3_a/dmol.outmol"));
        assert_eq!(record.index, 5);
        assert_eq!(record.atom_count, log.atom_count);
        assert_eq!(record.steps, log.steps);
        assert_eq!(record.outcome, ScanOutcome::Completed);
    }
}
