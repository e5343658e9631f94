//! Atomic output writer.
//!
//! ## `write_output` protocol
//!
//! 1. Normalise line endings to LF.
//! 2. Compare with the file on disk → skip if identical (mtime preserved).
//! 3. In dry-run mode, report and stop.
//! 4. Create parent directories.
//! 5. Write to `<path>.topostamp.tmp`.
//! 6. Rename to the final path (atomic on POSIX).

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{io_err, InstantiateError};

/// Outcome of an individual file write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// File was skipped — on-disk content already matches.
    Unchanged { path: PathBuf },
    /// `--dry-run` mode: the file *would* have been written.
    WouldWrite { path: PathBuf },
}

pub(crate) fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n")
}

/// Current content of `path`, or `None` if it does not exist.
pub(crate) fn read_existing(path: &Path) -> Result<Option<String>, InstantiateError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_err(path, err)),
    }
}

/// Atomically write one rendered file.
pub(crate) fn write_output(
    path: &Path,
    content: &str,
    dry_run: bool,
) -> Result<WriteResult, InstantiateError> {
    let tmp = PathBuf::from(format!("{}.topostamp.tmp", path.display()));
    write_output_with_tmp(path, content, dry_run, &tmp)
}

fn write_output_with_tmp(
    path: &Path,
    content: &str,
    dry_run: bool,
    tmp: &Path,
) -> Result<WriteResult, InstantiateError> {
    let normalized = normalize_line_endings(content);
    let content = normalized.as_str();

    if read_existing(path)?.as_deref() == Some(content) {
        tracing::debug!("unchanged: {}", path.display());
        return Ok(WriteResult::Unchanged {
            path: path.to_path_buf(),
        });
    }

    if dry_run {
        tracing::info!("[dry-run] would write: {}", path.display());
        return Ok(WriteResult::WouldWrite {
            path: path.to_path_buf(),
        });
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    if let Some(tmp_parent) = tmp.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(tmp_parent).map_err(|e| io_err(tmp_parent, e))?;
    }
    if let Err(e) = std::fs::write(tmp, content) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(tmp, e));
    }

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }

    tracing::info!("wrote: {}", path.display());
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
