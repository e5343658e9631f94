//! Error types for topostamp-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating an instantiation request.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Underlying I/O failure, annotated with the offending path.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Instance table YAML could not be parsed; carries serde_yaml line context.
    #[error("failed to parse instance table at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `offset_multiple` must be a positive integer.
    #[error("offset multiple must be greater than zero")]
    ZeroOffsetMultiple,

    /// `ordinal × offset_multiple` does not fit in a `u64`.
    #[error("identifier offset for instance #{ordinal} overflows (offset multiple {offset_multiple})")]
    OffsetOverflow { ordinal: usize, offset_multiple: u64 },

    /// Instance names become part of a file name.
    #[error("invalid instance name '{name}': {reason}")]
    InvalidInstanceName { name: String, reason: &'static str },

    /// Two table rows share a name, so their outputs would collide.
    #[error("duplicate instance name '{name}' in instance table")]
    DuplicateInstance { name: String },

    /// The same template was listed twice.
    #[error("template {path} listed more than once")]
    DuplicateTemplate { path: PathBuf },

    /// A per-instance parameter would shadow a built-in context field.
    #[error("instance '{instance}' parameter '{key}' shadows a built-in context field")]
    ReservedParam { instance: String, key: String },

    /// Two (template, instance) pairs derive the same output path, or an
    /// output would overwrite a template being rendered.
    #[error("output {path} is produced more than once or overwrites a template")]
    OutputCollision { path: PathBuf },
}

/// Errors raised while scanning topology files for template invocations.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Underlying I/O failure, annotated with the offending path.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No search location provides the invoked template definition.
    #[error("no template for {invocation} found in any of: {candidates}")]
    TemplateNotFound {
        invocation: PathBuf,
        candidates: String,
    },

    /// More than one search location provides the template definition.
    #[error("multiple template definitions for {invocation}: {matches}")]
    AmbiguousTemplate { invocation: PathBuf, matches: String },

    /// Invocation file name is not `<template>.<instance>.fppt`.
    #[error("malformed template invocation {path}: {reason}")]
    MalformedInvocation { path: PathBuf, reason: String },

    /// A file (transitively) includes itself.
    #[error("include cycle detected at {path}")]
    IncludeCycle { path: PathBuf },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RequestError {
    RequestError::Io {
        path: path.into(),
        source,
    }
}

pub(crate) fn scan_io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ScanError {
    ScanError::Io {
        path: path.into(),
        source,
    }
}
