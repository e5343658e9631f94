//! Error types for topostamp-renderer.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from template rendering operations.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Malformed template control construct.
    #[error("template syntax error in {path}: {detail}")]
    Syntax {
        path: PathBuf,
        detail: String,
        #[source]
        source: tera::Error,
    },

    /// The template names a variable the instance context does not provide.
    #[error("undefined reference in {path}: {detail}")]
    UndefinedReference {
        path: PathBuf,
        detail: String,
        #[source]
        source: tera::Error,
    },

    /// Any other rendering failure (bad filter argument, missing include, ...).
    #[error("failed to render {path}: {detail}")]
    Render {
        path: PathBuf,
        detail: String,
        #[source]
        source: tera::Error,
    },

    /// Instance context could not be converted into a tera context.
    #[error("context serialization error: {0}")]
    Context(#[source] tera::Error),

    /// Filesystem error while loading the template library.
    #[error("template io error at {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
}

/// Flatten a tera error and its sources into one line.
///
/// Tera's top-level message only names the template; the cause is further
/// down the chain.
pub(crate) fn describe(err: &tera::Error) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        parts.push(cause.to_string());
        source = std::error::Error::source(cause);
    }
    parts.join(": ")
}

/// Classify a failure raised while rendering `path`.
pub(crate) fn classify_render(path: impl Into<PathBuf>, source: tera::Error) -> RenderError {
    let path = path.into();
    let detail = describe(&source);
    if detail.contains("not found in context") {
        RenderError::UndefinedReference { path, detail, source }
    } else {
        RenderError::Render { path, detail, source }
    }
}

pub(crate) fn syntax_err(path: impl Into<PathBuf>, source: tera::Error) -> RenderError {
    RenderError::Syntax {
        path: path.into(),
        detail: describe(&source),
        source,
    }
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io { path: path.into(), source }
}
