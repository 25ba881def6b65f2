//! # Workflows Module
//!
//! The top-level entry points of the library.
//!
//! - **Discovery** ([`discover`]) - Finds the logs under a root directory in a stable order
//! - **Batch Extraction** ([`extract`]) - Parses a list of logs in parallel into a corpus
//!
//! A typical batch chains the two and hands the corpus to
//! [`export`](crate::core::io::export):
//!
//! ```no_run
//! use outmol::engine::config::{DiscoveryFilter, ExtractionConfig};
//! use outmol::engine::progress::ProgressReporter;
//! use outmol::workflows::{discover::discover, extract};
//!
//! let paths = discover("runs", &DiscoveryFilter::default())?;
//! let corpus = extract::run(&paths, &ExtractionConfig::default(), &ProgressReporter::new());
//! println!("{} steps", corpus.total_steps());
//! # Ok::<(), outmol::engine::error::ExtractError>(())
//! ```

pub mod discover;
pub mod extract;
