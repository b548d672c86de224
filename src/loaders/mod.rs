//! Loaders for the two record families found in a data directory.
//!
//! Both loaders visit files in ascending file-name order so results never
//! depend on how the file system happens to enumerate the directory.

pub mod environment;
pub mod growth;

pub use environment::{load_environment, read_environment_rows};
pub use growth::load_growth;

use std::path::{Path, PathBuf};

use crate::error::{DashboardError, Result};

/// Regular files in `dir` whose extension equals `ext` (ASCII case-insensitive),
/// sorted by file name.
pub(crate) fn files_with_extension(dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let entries = std::fs::read_dir(dir).map_err(|e| DashboardError::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| DashboardError::io(dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(ext));
        if matches {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
