use crate::engine::config::DiscoveryFilter;
use crate::engine::error::ExtractError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Collects every file under `root` that passes `filter`.
///
/// The walk is recursive and visits directory entries in name order, so the result is
/// stable across runs and platforms. Paths are returned absolute. Sub-directories that
/// cannot be listed are skipped with a warning.
///
/// # Errors
///
/// Returns [`ExtractError::InvalidRoot`] if `root` is not a directory, or an I/O error
/// if the root itself cannot be resolved or listed.
#[instrument(skip_all, name = "discovery")]
pub fn discover<P: AsRef<Path>>(
    root: P,
    filter: &DiscoveryFilter,
) -> Result<Vec<PathBuf>, ExtractError> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(ExtractError::InvalidRoot {
            path: root.to_path_buf(),
        });
    }
    let root = fs::canonicalize(root)?;

    let mut found = Vec::new();
    let entries = sorted_entries(&root)?;
    walk(entries, filter, &mut found);

    info!("Discovered {} log file(s).", found.len());
    Ok(found)
}

fn walk(entries: Vec<PathBuf>, filter: &DiscoveryFilter, found: &mut Vec<PathBuf>) {
    for path in entries {
        if path.is_dir() {
            match sorted_entries(&path) {
                Ok(children) => walk(children, filter, found),
                Err(e) => warn!("Skipping unreadable directory {:?}: {}", path, e),
            }
        } else if path.is_file() && matches_filter(&path, filter) {
            debug!("Matched {:?}", path);
            found.push(path);
        }
    }
}

fn sorted_entries(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort();
    Ok(entries)
}

/// Applies the extension and parent-directory checks of `filter` to a single path.
pub fn matches_filter(path: &Path, filter: &DiscoveryFilter) -> bool {
    let extension_ok = filter.extension.as_deref().is_none_or(|wanted| {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == wanted)
    });

    let directory_ok = filter.directory_prefix.as_deref().is_none_or(|prefix| {
        path.parent()
            .and_then(Path::file_name)
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(prefix))
    });

    extension_ok && directory_ok
}
