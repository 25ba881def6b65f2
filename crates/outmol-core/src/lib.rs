//! # outmol Core Library
//!
//! Extraction of per-iteration structured data (energy, geometry, forces, convergence
//! metric and orbital levels) from DMol3 `.outmol` geometry-optimization logs.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer layout so that the parser stays independent of
//! how files are found and where results end up.
//!
//! - **[`core`]: The Foundation.** Step and file data models, the numeric normalizer,
//!   the atom count resolver and the step record builder that scans a single log.
//!
//! - **[`engine`]: Settings and Signals.** Extraction configuration, library error types
//!   and the progress reporting hook used by long-running batches.
//!
//! - **[`workflows`]: The Public API.** Directory discovery and parallel batch extraction
//!   that assemble a [`Corpus`](core::models::corpus::Corpus) ready for export.

pub mod core;
pub mod engine;
pub mod workflows;
