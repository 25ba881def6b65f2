use crate::engine::config::ExtractionConfig;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Defines the interface for reading simulation log formats.
///
/// Implementors turn a whole log into a structured result in one forward pass.
/// Recoverable problems belong in the output; `Error` is reserved for failures that
/// prevent reading the input at all.
pub trait LogFile {
    /// The structured result of one log.
    type Output;

    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Reads and parses a log from a buffered reader.
    ///
    /// # Arguments
    ///
    /// * `reader` - The buffered reader to read from.
    /// * `config` - Which sections to extract and how to store numbers.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read.
    fn read_from(
        reader: &mut impl BufRead,
        config: &ExtractionConfig,
    ) -> Result<Self::Output, Self::Error>;

    /// Reads and parses a log from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or read.
    fn read_from_path<P: AsRef<Path>>(
        path: P,
        config: &ExtractionConfig,
    ) -> Result<Self::Output, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader, config)
    }
}
