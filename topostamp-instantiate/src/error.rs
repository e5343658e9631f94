//! Error types for topostamp-instantiate.

use std::path::PathBuf;

use thiserror::Error;

use topostamp_core::{RequestError, ScanError};
use topostamp_renderer::RenderError;

/// Any failure that aborts an instantiation run.
#[derive(Debug, Error)]
pub enum InstantiateError {
    /// Template syntax, undefined reference, or other rendering failure.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// Invalid request or unreadable template / instance table.
    #[error("request error: {0}")]
    Request(#[from] RequestError),

    /// Include scanning failed.
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),

    /// An I/O error while writing outputs, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`InstantiateError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> InstantiateError {
    InstantiateError::Io {
        path: path.into(),
        source,
    }
}
