//! Instance table loading.
//!
//! # File format
//!
//! ```yaml
//! instances:
//!   - name: primary
//!     params:
//!       queue_depth: 10
//!   - name: backup
//! ```
//!
//! Row order is kept: it decides each instance's ordinal and therefore its
//! identifier offset.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{io_err, RequestError};
use crate::types::InstanceSpec;

/// Root of an instance table file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstanceTable {
    #[serde(default)]
    pub instances: Vec<InstanceSpec>,
}

/// Parse an instance table from YAML text. `path` is only used for error context.
pub fn parse_instance_table(path: &Path, contents: &str) -> Result<InstanceTable, RequestError> {
    if contents.trim().is_empty() {
        return Ok(InstanceTable::default());
    }
    serde_yaml::from_str(contents).map_err(|e| RequestError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load the instance rows from the table at `path`.
///
/// Returns `RequestError::Io` if the file cannot be read and
/// `RequestError::Parse` (with line context) if it is malformed.
pub fn load_instance_table(path: &Path) -> Result<Vec<InstanceSpec>, RequestError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    Ok(parse_instance_table(path, &contents)?.instances)
}
