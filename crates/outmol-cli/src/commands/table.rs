use crate::cli::TableArgs;
use crate::config::defaults::TABLE_EXTENSION;
use crate::error::{CliError, Result};
use outmol::core::io::export;
use std::path::{Path, PathBuf};
use tracing::info;

pub fn run(args: TableArgs) -> Result<()> {
    info!("Loading JSON corpus from {:?}", &args.input);
    let corpus = export::read_corpus_json_from_path(&args.input).map_err(|e| {
        CliError::FileParsing {
            path: args.input.clone(),
            source: e.into(),
        }
    })?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_table_path(&args.input));
    info!("Writing {} step(s) to {:?}", corpus.total_steps(), &output);
    export::write_table_to_path(&corpus, &output)?;

    println!(
        "✓ Wrote {} step(s) from {} file(s) to {}",
        corpus.total_steps(),
        corpus.files.len(),
        output.display()
    );
    Ok(())
}

fn default_table_path(input: &Path) -> PathBuf {
    input.with_extension(TABLE_EXTENSION)
}
