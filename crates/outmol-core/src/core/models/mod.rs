//! # Core Models Module
//!
//! Data structures produced by the extractor.
//!
//! ## Key Components
//!
//! - [`step`] - One optimization iteration ([`step::StepRecord`]) and the mutable accumulator
//!   the reader fills while scanning
//! - [`corpus`] - The per-file result ([`corpus::FileRecord`]) and the ordered collection of them
//! - [`diagnostics`] - Recoverable warnings collected while parsing a file
//!
//! ## Usage
//!
//! ```ignore
//! use outmol::core::io::{outmol::OutmolFile, traits::LogFile};
//! use outmol::engine::config::ExtractionConfig;
//!
//! let log = OutmolFile::read_from_path("dmol3_run/dmol.outmol", &ExtractionConfig::default())?;
//! for step in &log.steps {
//!     println!("{:?} {:?} {}", step.step_index, step.energy, step.max_force);
//! }
//! ```

pub mod corpus;
pub mod diagnostics;
pub mod step;
