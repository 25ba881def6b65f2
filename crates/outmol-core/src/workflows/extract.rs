use crate::core::io::outmol::OutmolFile;
use crate::core::io::traits::LogFile;
use crate::core::models::corpus::{Corpus, FileRecord, ScanOutcome};
use crate::engine::config::ExtractionConfig;
use crate::engine::progress::{Progress, ProgressReporter};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Parses every log in `paths` and assembles the results into a [`Corpus`].
///
/// Files are parsed in parallel but the corpus keeps the input order, and each file's
/// position in `paths` becomes its index. A file that cannot be read is kept as an
/// unreadable record with no steps so the indices stay aligned with the input.
#[instrument(skip_all, name = "extraction_workflow")]
pub fn run(paths: &[PathBuf], config: &ExtractionConfig, reporter: &ProgressReporter) -> Corpus {
    reporter.report(Progress::PhaseStart { name: "Extraction" });
    reporter.report(Progress::BatchStart {
        total_files: paths.len() as u64,
    });
    info!(
        "Extracting {} file(s) with energies in {}.",
        paths.len(),
        config.energy_unit
    );

    let files: Vec<FileRecord> = paths
        .par_iter()
        .enumerate()
        .map(|(index, path)| {
            let record = extract_file(index, path, config);
            if matches!(record.outcome, ScanOutcome::Unreadable { .. }) {
                reporter.report(Progress::FileSkipped { index });
            } else {
                if record.outcome.is_truncated() {
                    reporter.report(Progress::Message(format!(
                        "SCF not converged in {}, kept {} step(s)",
                        path.display(),
                        record.steps.len()
                    )));
                }
                reporter.report(Progress::FileParsed {
                    index,
                    steps: record.steps.len(),
                });
            }
            record
        })
        .collect();

    reporter.report(Progress::BatchFinish);
    reporter.report(Progress::PhaseFinish);

    let corpus = Corpus {
        energy_unit: config.energy_unit,
        files,
    };
    info!(
        "Extracted {} step(s) from {} file(s); {} unreadable.",
        corpus.total_steps(),
        corpus.files.len(),
        corpus.unreadable_count()
    );
    corpus
}

/// Parses a single log into its corpus record.
pub fn extract_file(index: usize, path: &Path, config: &ExtractionConfig) -> FileRecord {
    let log = match OutmolFile::read_from_path(path, config) {
        Ok(log) => log,
        Err(e) => {
            warn!("Skipping unreadable file {:?}: {}", path, e);
            return FileRecord::unreadable(index, path.to_path_buf(), e.to_string());
        }
    };

    if let ScanOutcome::ScfNotConverged { line } = log.outcome {
        warn!(
            "SCF did not converge in {:?} at line {}; keeping {} earlier step(s).",
            path,
            line,
            log.steps.len()
        );
    }
    for warning in &log.warnings {
        debug!("{:?}: {}", path, warning);
    }
    debug!(
        "Parsed {:?}: {} atom(s), {} step(s), {} warning(s).",
        path,
        log.atom_count,
        log.steps.len(),
        log.warnings.len()
    );

    log.into_file_record(index, path.to_path_buf())
}
