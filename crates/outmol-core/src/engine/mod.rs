//! # Engine Module
//!
//! Settings and signals shared by the reader and the batch workflows.
//!
//! - **Configuration** ([`config`]) - Extraction switches, numeric precision and discovery filters
//! - **Error Handling** ([`error`]) - The hard failures a batch can run into
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress reporting

pub mod config;
pub mod error;
pub mod progress;
