use serde::Serialize;
use thiserror::Error;

/// A recoverable problem found while scanning a log.
///
/// Warnings never stop the scan; the offending field is left empty or the offending
/// row is dropped. Callers decide whether a step built alongside warnings is usable.
///
/// Warnings are written into the JSON corpus as `{"line": .., "kind": "..", ..}` but are
/// not read back; a reloaded corpus carries none.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[error("line {line}: {kind}")]
pub struct ParseWarning {
    /// 1-based line number in the source file.
    pub line: usize,
    #[serde(flatten)]
    pub kind: ParseWarningKind,
}

impl ParseWarning {
    pub fn new(line: usize, kind: ParseWarningKind) -> Self {
        Self { line, kind }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum ParseWarningKind {
    #[error("no 'N_atoms =' declaration found, geometry blocks will be empty")]
    MissingAtomCount,
    #[error("invalid number for {field} (value: '{value}')")]
    MalformedNumber { field: &'static str, value: String },
    #[error("{record} has {found} tokens, expected {expected}")]
    UnexpectedTokenCount {
        record: &'static str,
        found: usize,
        expected: &'static str,
    },
    #[error("geometry block ends after {found} of {expected} atom rows")]
    TruncatedGeometry { expected: usize, found: usize },
}
