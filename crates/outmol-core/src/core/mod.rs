//! # Core Module
//!
//! The stateless building blocks of the extractor.
//!
//! ## Architecture
//!
//! - **Data Models** ([`models`]) - Step records, orbital levels, per-file results and the corpus
//! - **File I/O** ([`io`]) - The `.outmol` reader, its numeric repair helpers and the exporters
//! - **Units** ([`units`]) - The energy units a record can be expressed in
//!
//! Everything in here works on a single file at a time and never shares state between
//! files, so callers are free to run several readers in parallel.

pub mod io;
pub mod models;
pub mod units;
