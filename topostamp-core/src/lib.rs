//! topostamp core library — request types, instance tables, include scanning.
//!
//! Public API surface:
//! - [`types`] — templates, instances, contexts, manifest
//! - [`error`] — [`RequestError`], [`ScanError`]
//! - [`config`] — instance table loading
//! - [`scan`] — template invocation discovery in topology files

pub mod config;
pub mod error;
pub mod scan;
pub mod types;

pub use error::{RequestError, ScanError};
pub use types::{
    InstanceContext, InstanceName, InstanceSet, InstanceSpec, InstantiationRequest, Manifest,
    OutputFile, TemplateFile,
};
