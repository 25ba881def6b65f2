//! Writers for the artifacts produced by a batch: the path manifest, the JSON corpus
//! and the one-row-per-step CSV table.

use crate::core::models::corpus::Corpus;
use crate::core::models::step::{Orbital, StepRecord};
use crate::engine::error::ExtractError;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

const MISSING: &str = "N/A";
const LIST_SEPARATOR: &str = "; ";

/// Writes one `"{index} {path}"` line per file in corpus order.
pub fn write_manifest(corpus: &Corpus, writer: &mut impl Write) -> Result<(), ExtractError> {
    for file in &corpus.files {
        writeln!(writer, "{} {}", file.index, file.path.display())?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_manifest_to_path<P: AsRef<Path>>(corpus: &Corpus, path: P) -> Result<(), ExtractError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_manifest(corpus, &mut writer)
}

pub fn write_corpus_json(corpus: &Corpus, writer: impl Write) -> Result<(), ExtractError> {
    serde_json::to_writer(writer, corpus)?;
    Ok(())
}

pub fn write_corpus_json_to_path<P: AsRef<Path>>(
    corpus: &Corpus,
    path: P,
) -> Result<(), ExtractError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_corpus_json(corpus, &mut writer)?;
    writer.flush()?;
    Ok(())
}

pub fn read_corpus_json(reader: impl Read) -> Result<Corpus, ExtractError> {
    Ok(serde_json::from_reader(reader)?)
}

pub fn read_corpus_json_from_path<P: AsRef<Path>>(path: P) -> Result<Corpus, ExtractError> {
    read_corpus_json(BufReader::new(File::open(path)?))
}

/// Header row of the step table. The energy column carries the corpus unit.
pub fn table_header(corpus: &Corpus) -> [String; 8] {
    [
        "Index".to_string(),
        format!("Energy ({})", corpus.energy_unit),
        "Step".to_string(),
        "Max Force (au)".to_string(),
        "Coordinates (au)".to_string(),
        "Species".to_string(),
        "Forces (au)".to_string(),
        "Orbitals (label, eV, occupation)".to_string(),
    ]
}

/// Renders one step as a table row. Missing scalars become `N/A`.
pub fn table_row(file_index: usize, step: &StepRecord) -> [String; 8] {
    [
        file_index.to_string(),
        step.energy.map_or_else(|| MISSING.to_string(), |e| e.to_string()),
        step.step_index
            .map_or_else(|| MISSING.to_string(), |s| s.to_string()),
        step.max_force.to_string(),
        join_triples(step.coordinates.iter().map(|p| [p.x, p.y, p.z])),
        step.species.join(LIST_SEPARATOR),
        join_triples(step.forces.iter().map(|f| [f.x, f.y, f.z])),
        step.orbitals
            .iter()
            .map(render_orbital)
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR),
    ]
}

/// Writes every step of the corpus as CSV, one row per step.
pub fn write_table(corpus: &Corpus, writer: impl Write) -> Result<(), ExtractError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(table_header(corpus))?;
    for (file_index, step) in corpus.steps() {
        csv_writer.write_record(table_row(file_index, step))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_table_to_path<P: AsRef<Path>>(corpus: &Corpus, path: P) -> Result<(), ExtractError> {
    let writer = BufWriter::new(File::create(path)?);
    write_table(corpus, writer)
}

fn join_triples(triples: impl Iterator<Item = [f64; 3]>) -> String {
    triples
        .map(|[x, y, z]| format!("({}, {}, {})", x, y, z))
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR)
}

fn render_orbital(orbital: &Orbital) -> String {
    format!(
        "({}, {}, {})",
        orbital.label, orbital.eigenvalue, orbital.occupation
    )
}
