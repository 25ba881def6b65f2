use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

pub const ATOM_COUNT_MARKER: &str = "N_atoms =";

/// Returns the count declared by the first `N_atoms =` line, or 0 when none is found.
///
/// The count is the third whitespace-separated token of the line. A malformed token
/// resolves to 0 as well, which makes every geometry block of the file empty.
pub fn resolve_atom_count<S: AsRef<str>>(lines: &[S]) -> usize {
    lines
        .iter()
        .map(AsRef::<str>::as_ref)
        .find(|line| line.contains(ATOM_COUNT_MARKER))
        .map(parse_declaration)
        .unwrap_or(0)
}

/// Path-based variant that tolerates unreadable files by resolving to 0.
pub fn resolve_atom_count_from_path<P: AsRef<Path>>(path: P) -> usize {
    let path = path.as_ref();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            debug!("Cannot open {:?} to resolve atom count: {}", path, e);
            return 0;
        }
    };

    // Bytes rather than `lines()` so a stray non-UTF-8 byte in the header does not
    // abort the search.
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) | Err(_) => return 0,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                if line.contains(ATOM_COUNT_MARKER) {
                    return parse_declaration(&line);
                }
            }
        }
    }
}

fn parse_declaration(line: &str) -> usize {
    line.split_whitespace()
        .nth(2)
        .and_then(|token| token.parse().ok())
        .unwrap_or(0)
}
