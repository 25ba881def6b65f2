use std::path::PathBuf;
use thiserror::Error;

/// Hard failures of the library.
///
/// Problems inside a single log never surface here; they become
/// [`ParseWarning`](crate::core::models::diagnostics::ParseWarning)s or a
/// [`ScanOutcome`](crate::core::models::corpus::ScanOutcome) on the file's record.
/// Configuration mistakes are reported by the builders as
/// [`ConfigError`](super::config::ConfigError) before any work starts.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Discovery root is not a directory: {path}", path = path.display())]
    InvalidRoot { path: PathBuf },

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON corpus (de)serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
