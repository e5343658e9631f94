//! Template invocation discovery.
//!
//! A topology file requests a template instance by including a file named
//! `<template>.<instance>.fppt`:
//!
//! ```text
//! include "subsystems/radio.uhf.fppt"
//! ```
//!
//! The include both names the instance (`uhf`) and is the path the rendered
//! output is written to. The template definition `radio.fppt` is looked up in
//! `<search location>/topology-templates/`. Plain includes and template
//! definitions are scanned recursively, depth-first, in file order.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{scan_io_err, ScanError};
use crate::types::{InstanceName, TEMPLATE_LIBRARY_DIR, TEMPLATE_SUFFIX};

/// One `include "<template>.<instance>.fppt"` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Included path; the rendered output is written here.
    pub path: PathBuf,
    /// Resolved template definition.
    pub template: PathBuf,
    pub instance: InstanceName,
}

fn include_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"^ *include +['"]([^'"]+)['"]"#).expect("include pattern is valid")
    })
}

/// Targets of every include directive in `contents`, in line order.
pub fn include_targets(contents: &str) -> Vec<String> {
    contents
        .lines()
        .filter_map(|line| include_pattern().captures(line))
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Split an invocation path into `(template file name, instance name)`.
pub fn parse_invocation(path: &Path) -> Result<(String, InstanceName), ScanError> {
    let malformed = |reason: &str| ScanError::MalformedInvocation {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };
    let stem = path
        .file_stem()
        .map(Path::new)
        .ok_or_else(|| malformed("missing file name"))?;
    let instance = stem
        .extension()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| malformed("expected <template>.<instance>.fppt"))?;
    let template = stem
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| malformed("missing template name"))?;

    let instance = InstanceName::from(instance);
    instance
        .validate()
        .map_err(|e| malformed(&e.to_string()))?;
    Ok((format!("{template}.{TEMPLATE_SUFFIX}"), instance))
}

/// Find the unique definition of `template_file` across `search_locations`.
pub fn resolve_template(
    invocation: &Path,
    template_file: &str,
    search_locations: &[PathBuf],
) -> Result<PathBuf, ScanError> {
    let candidates: Vec<PathBuf> = search_locations
        .iter()
        .map(|loc| loc.join(TEMPLATE_LIBRARY_DIR).join(template_file))
        .collect();
    let mut found: Vec<PathBuf> = candidates.iter().filter(|p| p.is_file()).cloned().collect();

    match found.len() {
        0 => Err(ScanError::TemplateNotFound {
            invocation: invocation.to_path_buf(),
            candidates: join_paths(&candidates),
        }),
        1 => Ok(found.remove(0)),
        _ => Err(ScanError::AmbiguousTemplate {
            invocation: invocation.to_path_buf(),
            matches: join_paths(&found),
        }),
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Collect template invocations reachable from `topology_files`.
///
/// Every file is scanned once; an invocation path seen twice is reported once
/// (first occurrence wins) so no output is rendered twice per run.
pub fn find_invocations(
    topology_files: &[PathBuf],
    search_locations: &[PathBuf],
) -> Result<Vec<Invocation>, ScanError> {
    let mut scanner = Scanner {
        search_locations,
        stack: Vec::new(),
        scanned: HashSet::new(),
        seen: HashSet::new(),
        found: Vec::new(),
    };
    for file in topology_files {
        scanner.scan(file)?;
    }
    Ok(scanner.found)
}

struct Scanner<'a> {
    search_locations: &'a [PathBuf],
    stack: Vec<PathBuf>,
    scanned: HashSet<PathBuf>,
    seen: HashSet<PathBuf>,
    found: Vec<Invocation>,
}

impl Scanner<'_> {
    fn scan(&mut self, path: &Path) -> Result<(), ScanError> {
        let key = std::fs::canonicalize(path).map_err(|e| scan_io_err(path, e))?;
        if self.stack.contains(&key) {
            return Err(ScanError::IncludeCycle {
                path: path.to_path_buf(),
            });
        }
        if self.scanned.contains(&key) {
            return Ok(());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| scan_io_err(path, e))?;
        let base = path.parent().unwrap_or(Path::new(""));
        let suffix = format!(".{TEMPLATE_SUFFIX}");

        let mut definitions = Vec::new();
        let mut includes = Vec::new();
        for target in include_targets(&contents) {
            let target_path = base.join(&target);
            if !target.ends_with(&suffix) {
                includes.push(target_path);
                continue;
            }
            let (template_file, instance) = parse_invocation(&target_path)?;
            let template = resolve_template(&target_path, &template_file, self.search_locations)?;
            definitions.push(template.clone());
            if self.seen.insert(target_path.clone()) {
                self.found.push(Invocation {
                    path: target_path,
                    template,
                    instance,
                });
            }
        }

        self.stack.push(key.clone());
        for nested in definitions.iter().chain(includes.iter()) {
            self.scan(nested)?;
        }
        self.stack.pop();
        self.scanned.insert(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn include_targets_match_leading_spaces_and_both_quotes() {
        let src = "module Top {\n  include \"a.x.fppt\"\ninclude 'b.fpp'\n# include \"c.fpp\"\n}\n";
        assert_eq!(include_targets(src), ["a.x.fppt", "b.fpp"]);
    }

    #[test]
    fn parse_invocation_splits_template_and_instance() {
        let (template, instance) = parse_invocation(Path::new("dir/radio.uhf.fppt")).unwrap();
        assert_eq!(template, "radio.fppt");
        assert_eq!(instance, InstanceName::from("uhf"));
    }

    #[test]
    fn parse_invocation_requires_instance_segment() {
        let err = parse_invocation(Path::new("radio.fppt")).unwrap_err();
        assert!(matches!(err, ScanError::MalformedInvocation { .. }), "got: {err}");
    }

    #[test]
    fn resolve_template_reports_candidates() {
        let err = resolve_template(
            Path::new("a.x.fppt"),
            "a.fppt",
            &[PathBuf::from("/nonexistent/one"), PathBuf::from("/nonexistent/two")],
        )
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("/nonexistent/one/topology-templates/a.fppt"), "{msg}");
        assert!(msg.contains("/nonexistent/two/topology-templates/a.fppt"), "{msg}");
    }
}
