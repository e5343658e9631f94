//! Tera rendering engine — [`Renderer`] and the shared template library.
//!
//! # Template names
//!
//! | Source                                        | Registered as                  |
//! |-----------------------------------------------|--------------------------------|
//! | `<loc>/topology-templates/<rel>.fppt`         | `<rel>.fppt` (`/` separators)  |
//! | request template at `<path>`                  | `<path>` as given              |
//!
//! Library names are what templates use in `{% include %}`, `{% import %}`
//! and `{% extends %}`. When two search locations provide the same name, the
//! earlier location wins.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tera::Tera;

use topostamp_core::types::{
    InstanceContext, TemplateFile, TEMPLATE_LIBRARY_DIR, TEMPLATE_SUFFIX,
};

use crate::context::to_tera_context;
use crate::error::{classify_render, io_err, syntax_err, RenderError};

// ---------------------------------------------------------------------------
// Template library loading
// ---------------------------------------------------------------------------

fn normalize_template_name(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Recursively collect files under `dir`, following symlinks. Directories are
/// keyed by canonical path so a symlink loop is entered only once.
fn collect_template_files(
    dir: &Path,
    visited: &mut HashSet<PathBuf>,
    out: &mut Vec<PathBuf>,
) -> Result<(), RenderError> {
    let canonical = dir.canonicalize().map_err(|e| io_err(dir, e))?;
    if !visited.insert(canonical) {
        return Ok(());
    }
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let meta = std::fs::metadata(&path).map_err(|e| io_err(&path, e))?;
        if meta.is_dir() {
            collect_template_files(&path, visited, out)?;
        } else if meta.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

/// One library template: registered name, source path, content.
type LibraryEntry = (String, PathBuf, String);

fn load_library_dir(dir: &Path) -> Result<Vec<LibraryEntry>, RenderError> {
    let mut files = Vec::new();
    collect_template_files(dir, &mut HashSet::new(), &mut files)?;
    files.sort();

    let mut templates = Vec::new();
    for path in files {
        if path.extension().and_then(|s| s.to_str()) != Some(TEMPLATE_SUFFIX) {
            continue;
        }
        let rel = path.strip_prefix(dir).unwrap_or(path.as_path());
        let name = normalize_template_name(rel);
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        templates.push((name, path, contents));
    }
    Ok(templates)
}

/// Library directories (`<loc>/topology-templates`) that exist, in search order.
pub fn library_dirs(search_locations: &[PathBuf]) -> Vec<PathBuf> {
    search_locations
        .iter()
        .map(|loc| loc.join(TEMPLATE_LIBRARY_DIR))
        .filter(|dir| dir.is_dir())
        .collect()
}

fn load_library(search_locations: &[PathBuf]) -> Result<Vec<LibraryEntry>, RenderError> {
    let mut seen = HashSet::new();
    let mut library = Vec::new();
    for dir in library_dirs(search_locations) {
        for (name, path, content) in load_library_dir(&dir)? {
            if seen.insert(name.clone()) {
                library.push((name, path, content));
            }
        }
    }
    Ok(library)
}

fn build_tera(library: Vec<LibraryEntry>) -> Result<Tera, RenderError> {
    let mut tera = Tera::default();
    tera.autoescape_on(vec![]);

    let sources: Vec<(String, PathBuf)> = library
        .iter()
        .map(|(name, path, _)| (name.clone(), path.clone()))
        .collect();
    let items: Vec<(String, String)> = library
        .into_iter()
        .map(|(name, _, content)| (name, content))
        .collect();

    tera.add_raw_templates(items).map_err(|e| {
        let detail = crate::error::describe(&e);
        // Tera names the failing template in its message; fall back to the
        // first library file when it cannot be matched.
        let path = sources
            .iter()
            .find(|(name, _)| detail.contains(&format!("'{name}'")))
            .or_else(|| sources.first())
            .map(|(_, path)| path.clone())
            .unwrap_or_default();
        syntax_err(path, e)
    })?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Tera-based renderer for one instantiation run.
///
/// All request templates are parsed by [`Renderer::new`], so syntax errors
/// surface before anything is rendered or written. Rendering never touches
/// the filesystem.
pub struct Renderer {
    tera: Tera,
    names: HashMap<PathBuf, String>,
}

impl Renderer {
    /// Load the template library from `search_locations` and parse `templates`.
    pub fn new(search_locations: &[PathBuf], templates: &[TemplateFile]) -> Result<Self, RenderError> {
        let mut tera = build_tera(load_library(search_locations)?)?;
        let mut names = HashMap::with_capacity(templates.len());
        for template in templates {
            let name = normalize_template_name(&template.path);
            tera.add_raw_template(&name, &template.content)
                .map_err(|e| syntax_err(&template.path, e))?;
            names.insert(template.path.clone(), name);
        }
        Ok(Renderer { tera, names })
    }

    /// Renderer without a template library.
    pub fn standalone(templates: &[TemplateFile]) -> Result<Self, RenderError> {
        Self::new(&[], templates)
    }

    /// Names of every registered template, sorted.
    pub fn template_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tera.get_template_names().collect();
        names.sort_unstable();
        names
    }

    /// Render `template` against `ctx`.
    ///
    /// `template` must have been passed to [`Renderer::new`]; an unknown
    /// template is reported as a render failure.
    pub fn render(&self, template: &TemplateFile, ctx: &InstanceContext) -> Result<String, RenderError> {
        let tera_ctx = to_tera_context(ctx)?;
        let name = self
            .names
            .get(&template.path)
            .cloned()
            .unwrap_or_else(|| normalize_template_name(&template.path));
        self.tera
            .render(&name, &tera_ctx)
            .map_err(|e| classify_render(&template.path, e))
    }
}

/// Render a single template with no library, in one call.
pub fn render(template: &TemplateFile, ctx: &InstanceContext) -> Result<String, RenderError> {
    Renderer::standalone(std::slice::from_ref(template))?.render(template, ctx)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
