use crate::cli::ExtractArgs;
use crate::config::PartialAppConfig;
use crate::config::models::AppConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use outmol::core::io::export;
use outmol::core::models::corpus::Corpus;
use outmol::engine::progress::ProgressReporter;
use outmol::workflows::{discover::discover, extract};
use tracing::{info, warn};

pub fn run(args: ExtractArgs) -> Result<()> {
    let partial_config = PartialAppConfig::load(args.config.as_deref())?;
    info!("Merging configuration from file and CLI arguments...");
    let config = partial_config.merge_with_cli(&args)?;

    info!("Discovering logs under {:?}", &config.root);
    let paths = discover(&config.root, &config.discovery)?;
    if paths.is_empty() {
        warn!("No files under {:?} matched the discovery filter.", &config.root);
        println!(
            "Warning: no matching logs found under {}.",
            config.root.display()
        );
    }

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Extracting {} log file(s)...", paths.len());
    let corpus = extract::run(&paths, &config.extraction, &reporter);

    write_outputs(&corpus, &config)?;
    print_summary(&corpus, &config);
    Ok(())
}

fn write_outputs(corpus: &Corpus, config: &AppConfig) -> Result<()> {
    let manifest_path = config.manifest_path();
    info!("Writing path manifest to {:?}", &manifest_path);
    export::write_manifest_to_path(corpus, &manifest_path).map_err(|e| {
        CliError::FileParsing {
            path: manifest_path.clone(),
            source: e.into(),
        }
    })?;

    let corpus_path = config.corpus_path();
    info!("Writing JSON corpus to {:?}", &corpus_path);
    export::write_corpus_json_to_path(corpus, &corpus_path).map_err(|e| {
        CliError::FileParsing {
            path: corpus_path.clone(),
            source: e.into(),
        }
    })?;

    if config.write_csv {
        let table_path = config.table_path();
        info!("Writing step table to {:?}", &table_path);
        export::write_table_to_path(corpus, &table_path).map_err(|e| CliError::FileParsing {
            path: table_path.clone(),
            source: e.into(),
        })?;
    }
    Ok(())
}

fn print_summary(corpus: &Corpus, config: &AppConfig) {
    let truncated = corpus
        .files
        .iter()
        .filter(|f| f.outcome.is_truncated())
        .count();

    println!(
        "✓ Extracted {} step(s) from {} file(s) (energies in {}).",
        corpus.total_steps(),
        corpus.files.len(),
        corpus.energy_unit
    );
    if truncated > 0 {
        println!("  {} file(s) stopped early at a non-converged SCF cycle.", truncated);
    }
    if corpus.unreadable_count() > 0 {
        println!(
            "  {} file(s) could not be read and have no steps.",
            corpus.unreadable_count()
        );
    }
    println!("  Manifest: {}", config.manifest_path().display());
    println!("  Corpus:   {}", config.corpus_path().display());
    if config.write_csv {
        println!("  Table:    {}", config.table_path().display());
    }
}
