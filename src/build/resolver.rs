//! Entry module resolution.
//!
//! An entry path must resolve to exactly one source module. A declared path
//! that exists is taken as-is; otherwise the extension list is probed in
//! order and the probe must produce a single match.

use std::path::{Path, PathBuf};

/// Error during entry resolution.
#[derive(Debug)]
pub enum EntryResolveError {
    /// No source module matched the entry path
    NotFound(PathBuf),
    /// More than one source module matched the entry path
    Ambiguous(PathBuf, Vec<PathBuf>),
}

impl std::fmt::Display for EntryResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryResolveError::NotFound(entry) => {
                write!(f, "Entry module not found: {}", entry.display())
            }
            EntryResolveError::Ambiguous(entry, matches) => {
                let names: Vec<_> = matches.iter().map(|p| p.display().to_string()).collect();
                write!(
                    f,
                    "Entry '{}' is ambiguous, matches: {}",
                    entry.display(),
                    names.join(", ")
                )
            }
        }
    }
}

impl std::error::Error for EntryResolveError {}

/// Resolve an entry path to exactly one source module.
///
/// # Arguments
/// - `root` - Project root relative entries resolve against
/// - `entry` - Declared entry path
/// - `extensions` - Extension probe list (e.g. `[".js", ".json", ".ts"]`),
///   tried when the declared path itself does not exist
pub fn resolve_entry(
    root: &Path,
    entry: &Path,
    extensions: &[String],
) -> Result<PathBuf, EntryResolveError> {
    let base = if entry.is_absolute() { entry.to_path_buf() } else { root.join(entry) };

    // The declared path wins outright when it names a file.
    if base.is_file() {
        return Ok(base);
    }

    let mut matches = Vec::new();
    for ext in extensions {
        let mut candidate = base.clone().into_os_string();
        candidate.push(ext);
        let candidate = PathBuf::from(candidate);
        if candidate.is_file() {
            matches.push(candidate);
        }
    }
    matches.sort();
    matches.dedup();

    match matches.len() {
        0 => Err(EntryResolveError::NotFound(entry.to_path_buf())),
        1 => Ok(matches.remove(0)),
        _ => Err(EntryResolveError::Ambiguous(entry.to_path_buf(), matches)),
    }
}
