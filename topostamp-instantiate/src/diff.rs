//! Unified diff preview for `topostamp diff`.

use std::path::PathBuf;

use similar::TextDiff;

use topostamp_core::types::InstantiationRequest;

use crate::{
    pipeline::{plan_request, render_plan},
    writer::{normalize_line_endings, read_existing},
    InstantiateError,
};

/// A single rendered file diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub path: PathBuf,
    pub unified_diff: String,
}

/// Render what `request` would generate and compare it to current on-disk content.
///
/// Files that would not change are omitted. No files are written.
pub fn diff_request(request: &InstantiationRequest) -> Result<Vec<FileDiff>, InstantiateError> {
    let plan = plan_request(request)?;
    let mut diffs = Vec::new();
    for output in render_plan(&plan)? {
        let rendered = normalize_line_endings(&output.content);
        let existing = read_existing(&output.path)?
            .map(|s| normalize_line_endings(&s))
            .unwrap_or_default();
        if existing == rendered {
            continue;
        }

        let name = output
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| output.path.display().to_string());
        let old_header = format!("a/{name}");
        let new_header = format!("b/{name}");
        let unified = TextDiff::from_lines(&existing, &rendered)
            .unified_diff()
            .header(&old_header, &new_header)
            .context_radius(3)
            .to_string();

        diffs.push(FileDiff {
            path: output.path,
            unified_diff: unified,
        });
    }
    Ok(diffs)
}
