//! Domain types for template instantiation.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! Per-instance parameters are JSON objects so they bind directly into a
//! template context.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{io_err, RequestError};

/// File extension of topology templates.
pub const TEMPLATE_SUFFIX: &str = "fppt";

/// Directory under each search location holding the shared template library.
pub const TEMPLATE_LIBRARY_DIR: &str = "topology-templates";

/// Context fields bound by the engine itself. Instance parameters may not reuse them.
pub const RESERVED_CONTEXT_KEYS: &[&str] = &[
    "index",
    "name",
    "idOffset",
    "instance_count",
    "search_locations",
    "params",
    "template_name",
    "template_index",
    "template_offset",
];

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Name of one instance; substituted into generated file names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceName(pub String);

impl InstanceName {
    /// Check that the name can be spliced into `<base>.<name>.<ext>`.
    pub fn validate(&self) -> Result<(), RequestError> {
        let reason = if self.0.is_empty() {
            Some("name is empty")
        } else if self.0.contains(['/', '\\']) {
            Some("name contains a path separator")
        } else if self.0.contains('.') {
            Some("name contains '.'")
        } else if self.0.chars().any(char::is_whitespace) {
            Some("name contains whitespace")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(RequestError::InvalidInstanceName {
                name: self.0.clone(),
                reason,
            }),
            None => Ok(()),
        }
    }
}

impl fmt::Display for InstanceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for InstanceName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for InstanceName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Templates and outputs
// ---------------------------------------------------------------------------

/// A template source file. Identity is its path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    pub path: PathBuf,
    pub content: String,
}

impl TemplateFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Read a template from disk.
    pub fn load(path: &Path) -> Result<Self, RequestError> {
        let content = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        Ok(Self::new(path, content))
    }

    /// File name without its final extension (`subsystem.fppt` → `subsystem`).
    pub fn base_name(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Final extension, if any.
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .map(|s| s.to_string_lossy().into_owned())
    }

    /// Output path for `instance`: `<dir>/<base>.<instance>.<ext>`.
    ///
    /// `<dir>` is `output_dir` when given, otherwise the template's own directory.
    pub fn output_path_for(&self, instance: &InstanceName, output_dir: Option<&Path>) -> PathBuf {
        let file_name = match self.extension() {
            Some(ext) => format!("{}.{}.{}", self.base_name(), instance, ext),
            None => format!("{}.{}", self.base_name(), instance),
        };
        let dir = output_dir
            .map(Path::to_path_buf)
            .or_else(|| self.path.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        dir.join(file_name)
    }
}

/// One rendered file, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub path: PathBuf,
    pub content: String,
}

// ---------------------------------------------------------------------------
// Instances
// ---------------------------------------------------------------------------

/// One row of an explicit instance table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstanceSpec {
    pub name: InstanceName,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl InstanceSpec {
    pub fn named(name: impl Into<InstanceName>) -> Self {
        Self {
            name: name.into(),
            params: Map::new(),
        }
    }
}

/// How the instances of a request are declared.
#[derive(Debug, Clone, PartialEq)]
pub enum InstanceSet {
    /// Instances `0..n`, each named by its ordinal.
    Count(usize),
    /// Explicit table; row order is significant.
    Table(Vec<InstanceSpec>),
}

impl InstanceSet {
    pub fn len(&self) -> usize {
        match self {
            InstanceSet::Count(n) => *n,
            InstanceSet::Table(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Materialise the instance rows in ordinal order.
    pub fn resolve(&self) -> Vec<InstanceSpec> {
        match self {
            InstanceSet::Count(n) => (0..*n).map(|k| InstanceSpec::named(k.to_string())).collect(),
            InstanceSet::Table(rows) => rows.clone(),
        }
    }
}

/// Identifier base for the instance at `ordinal`. `None` on overflow.
pub fn id_offset(ordinal: usize, offset_multiple: u64) -> Option<u64> {
    u64::try_from(ordinal)
        .ok()
        .and_then(|k| k.checked_mul(offset_multiple))
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Everything needed for one instantiation run.
#[derive(Debug, Clone, PartialEq)]
pub struct InstantiationRequest {
    /// Templates rendered for every instance, in order.
    pub template_files: Vec<PathBuf>,
    /// Identifier step between consecutive instances. The caller guarantees
    /// it exceeds the identifiers any one instance declares; not checked.
    pub offset_multiple: u64,
    pub instances: InstanceSet,
    /// Passed through to templates and used to locate the template library.
    pub search_locations: Vec<PathBuf>,
    /// Write outputs here instead of next to each template.
    pub output_dir: Option<PathBuf>,
}

impl InstantiationRequest {
    /// Check offsets, names and parameters without touching the filesystem.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.offset_multiple == 0 {
            return Err(RequestError::ZeroOffsetMultiple);
        }
        if let Some(last) = self.instances.len().checked_sub(1) {
            if id_offset(last, self.offset_multiple).is_none() {
                return Err(RequestError::OffsetOverflow {
                    ordinal: last,
                    offset_multiple: self.offset_multiple,
                });
            }
        }

        let mut seen_templates = HashSet::new();
        for path in &self.template_files {
            if !seen_templates.insert(path) {
                return Err(RequestError::DuplicateTemplate { path: path.clone() });
            }
        }

        let mut seen_names = HashSet::new();
        for spec in self.instances.resolve() {
            spec.name.validate()?;
            if let Some(key) = spec
                .params
                .keys()
                .find(|k| RESERVED_CONTEXT_KEYS.contains(&k.as_str()))
            {
                return Err(RequestError::ReservedParam {
                    instance: spec.name.0.clone(),
                    key: key.clone(),
                });
            }
            if !seen_names.insert(spec.name.clone()) {
                return Err(RequestError::DuplicateInstance { name: spec.name.0 });
            }
        }
        Ok(())
    }

    /// Validate, then build one [`InstanceContext`] per instance in ordinal order.
    pub fn contexts(&self) -> Result<Vec<InstanceContext>, RequestError> {
        self.validate()?;
        let count = self.instances.len();
        let locations = search_location_strings(&self.search_locations);
        self.instances
            .resolve()
            .into_iter()
            .enumerate()
            .map(|(ordinal, spec)| {
                let offset = id_offset(ordinal, self.offset_multiple).ok_or(
                    RequestError::OffsetOverflow {
                        ordinal,
                        offset_multiple: self.offset_multiple,
                    },
                )?;
                Ok(InstanceContext {
                    index: ordinal,
                    name: spec.name,
                    id_offset: offset,
                    instance_count: count,
                    search_locations: locations.clone(),
                    params: spec.params,
                })
            })
            .collect()
    }
}

pub fn search_location_strings(locations: &[PathBuf]) -> Vec<String> {
    locations.iter().map(|p| p.display().to_string()).collect()
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Values bound into a template for one instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceContext {
    /// 0-based ordinal among the instances sharing this context's template.
    pub index: usize,
    pub name: InstanceName,
    /// Identifier base for this instance.
    #[serde(rename = "idOffset")]
    pub id_offset: u64,
    pub instance_count: usize,
    pub search_locations: Vec<String>,
    pub params: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

/// Ordered list of files produced by one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    paths: Vec<PathBuf>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.paths.iter()
    }

    /// Newline-separated form consumed by build integrations.
    pub fn to_lines(&self) -> String {
        self.paths
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl IntoIterator for Manifest {
    type Item = PathBuf;
    type IntoIter = std::vec::IntoIter<PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.into_iter()
    }
}

impl From<Vec<PathBuf>> for Manifest {
    fn from(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
