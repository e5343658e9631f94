//! # topostamp-instantiate
//!
//! Instantiation orchestrator: computes each instance's identifier offset,
//! renders every template for it, writes the results atomically, and returns
//! the [`Manifest`] of generated paths.
//!
//! Call [`instantiate`] for the manifest only, [`run`] for per-file write
//! outcomes (and dry runs), or [`run_scan`] to derive instances from
//! `include` directives in topology files.
//!
//! [`Manifest`]: topostamp_core::types::Manifest

pub mod diff;
pub mod error;
pub mod pipeline;
pub mod writer;

pub use diff::{diff_request, FileDiff};
pub use error::InstantiateError;
pub use pipeline::{instantiate, instantiate_invocations, run, run_scan, RunReport};
pub use writer::WriteResult;
