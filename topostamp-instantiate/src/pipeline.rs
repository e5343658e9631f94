//! Instantiation orchestration: offsets, render, write, manifest.
//!
//! Two entry points share one render/write path:
//!
//! - [`run`] / [`instantiate`] — every template × every instance of an
//!   [`InstantiationRequest`], instance-major.
//! - [`run_scan`] / [`instantiate_invocations`] — one render per
//!   `include "<template>.<instance>.fppt"` found in topology files.
//!
//! All outputs are rendered before the first write, so a template error
//! leaves the filesystem untouched. Write failures are not rolled back;
//! rerun the whole request to recover.

use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};

use topostamp_core::{
    scan::{self, Invocation},
    types::{
        id_offset, search_location_strings, InstanceContext, InstantiationRequest, Manifest,
        OutputFile, TemplateFile,
    },
    RequestError,
};
use topostamp_renderer::Renderer;

use crate::error::InstantiateError;
use crate::writer::{write_output, WriteResult};

/// One (template, instance) pair to render.
#[derive(Debug, Clone)]
pub(crate) struct RenderJob {
    /// Index into [`Plan::templates`].
    pub template: usize,
    pub context: InstanceContext,
    pub output: PathBuf,
}

/// Loaded templates plus the ordered jobs of one run.
#[derive(Debug, Clone)]
pub(crate) struct Plan {
    pub search_locations: Vec<PathBuf>,
    pub templates: Vec<TemplateFile>,
    pub jobs: Vec<RenderJob>,
}

/// Outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Every output path, in render order.
    pub manifest: Manifest,
    /// Per-file outcome, same order as the manifest.
    pub writes: Vec<WriteResult>,
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

pub(crate) fn plan_request(request: &InstantiationRequest) -> Result<Plan, InstantiateError> {
    let contexts = request.contexts()?;
    let templates = request
        .template_files
        .iter()
        .map(|path| TemplateFile::load(path))
        .collect::<Result<Vec<_>, _>>()?;

    let output_dir = request.output_dir.as_deref();
    let jobs: Vec<RenderJob> = contexts
        .into_iter()
        .flat_map(|ctx| {
            templates.iter().enumerate().map(move |(i, tpl)| RenderJob {
                template: i,
                output: tpl.output_path_for(&ctx.name, output_dir),
                context: ctx.clone(),
            })
        })
        .collect();

    let plan = Plan {
        search_locations: request.search_locations.clone(),
        templates,
        jobs,
    };
    check_output_collisions(&plan)?;
    Ok(plan)
}

pub(crate) fn plan_invocations(
    invocations: &[Invocation],
    offset_multiple: u64,
    search_locations: &[PathBuf],
) -> Result<Plan, InstantiateError> {
    if offset_multiple == 0 {
        return Err(RequestError::ZeroOffsetMultiple.into());
    }

    let locations = search_location_strings(search_locations);
    let mut templates: Vec<TemplateFile> = Vec::new();
    let mut template_slots: HashMap<PathBuf, usize> = HashMap::new();
    let mut per_template_count: HashMap<usize, usize> = HashMap::new();
    let mut jobs = Vec::with_capacity(invocations.len());

    for (ordinal, invocation) in invocations.iter().enumerate() {
        let slot = match template_slots.get(&invocation.template) {
            Some(slot) => *slot,
            None => {
                templates.push(TemplateFile::load(&invocation.template)?);
                template_slots.insert(invocation.template.clone(), templates.len() - 1);
                templates.len() - 1
            }
        };
        let index = per_template_count.entry(slot).or_insert(0);
        let offset = id_offset(ordinal, offset_multiple).ok_or(RequestError::OffsetOverflow {
            ordinal,
            offset_multiple,
        })?;

        jobs.push(RenderJob {
            template: slot,
            context: InstanceContext {
                index: *index,
                name: invocation.instance.clone(),
                id_offset: offset,
                instance_count: invocations.len(),
                search_locations: locations.clone(),
                params: Default::default(),
            },
            output: invocation.path.clone(),
        });
        *index += 1;
    }

    let plan = Plan {
        search_locations: search_locations.to_vec(),
        templates,
        jobs,
    };
    check_output_collisions(&plan)?;
    Ok(plan)
}

/// Resolve `.` and `..` without touching the filesystem.
fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Key under which two spellings of the same file compare equal.
///
/// Existing files (and the existing parent of a new file) are canonicalised;
/// anything else is made absolute and normalised lexically.
fn comparable_path(path: &Path) -> PathBuf {
    if let Ok(real) = path.canonicalize() {
        return real;
    }
    let absolute = match std::env::current_dir() {
        Ok(cwd) if path.is_relative() => cwd.join(path),
        _ => path.to_path_buf(),
    };
    let absolute = lexical_normalize(&absolute);
    if let (Some(parent), Some(name)) = (absolute.parent(), absolute.file_name()) {
        if let Ok(real) = parent.canonicalize() {
            return real.join(name);
        }
    }
    absolute
}

/// Every output must be distinct and must not overwrite a loaded template.
fn check_output_collisions(plan: &Plan) -> Result<(), RequestError> {
    let sources: HashSet<PathBuf> = plan
        .templates
        .iter()
        .map(|tpl| comparable_path(&tpl.path))
        .collect();
    let mut outputs = HashSet::with_capacity(plan.jobs.len());
    for job in &plan.jobs {
        let key = comparable_path(&job.output);
        if sources.contains(&key) || !outputs.insert(key) {
            return Err(RequestError::OutputCollision {
                path: job.output.clone(),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Render every job of `plan`, in order, without writing anything.
pub(crate) fn render_plan(plan: &Plan) -> Result<Vec<OutputFile>, InstantiateError> {
    let renderer = Renderer::new(&plan.search_locations, &plan.templates)?;
    tracing::debug!("templates: {}", renderer.template_names().join(", "));
    plan.jobs
        .iter()
        .map(|job| {
            let template = &plan.templates[job.template];
            let content = renderer.render(template, &job.context)?;
            tracing::debug!(
                "rendered {} for instance '{}' (idOffset {})",
                template.path.display(),
                job.context.name,
                job.context.id_offset
            );
            Ok(OutputFile {
                path: job.output.clone(),
                content,
            })
        })
        .collect()
}

fn execute(plan: &Plan, dry_run: bool) -> Result<RunReport, InstantiateError> {
    let outputs = render_plan(plan)?;
    let mut manifest = Manifest::new();
    let mut writes = Vec::with_capacity(outputs.len());
    for output in outputs {
        let result = write_output(&output.path, &output.content, dry_run)?;
        manifest.push(output.path);
        writes.push(result);
    }
    Ok(RunReport { manifest, writes })
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Render and write every (instance, template) pair of `request`.
pub fn run(request: &InstantiationRequest, dry_run: bool) -> Result<RunReport, InstantiateError> {
    let plan = plan_request(request)?;
    tracing::debug!(
        "instantiating {} template(s) × {} instance(s), offset multiple {}",
        plan.templates.len(),
        request.instances.len(),
        request.offset_multiple
    );
    execute(&plan, dry_run)
}

/// Instantiate `request` and return the manifest of written files.
pub fn instantiate(request: &InstantiationRequest) -> Result<Manifest, InstantiateError> {
    Ok(run(request, false)?.manifest)
}

/// Render each invocation to its own path. The k-th invocation gets
/// `idOffset = k × offset_multiple`; `index` counts invocations per template.
pub fn instantiate_invocations(
    invocations: &[Invocation],
    offset_multiple: u64,
    search_locations: &[PathBuf],
    dry_run: bool,
) -> Result<RunReport, InstantiateError> {
    let plan = plan_invocations(invocations, offset_multiple, search_locations)?;
    execute(&plan, dry_run)
}

/// Scan `topology_files` for template invocations, then instantiate them.
pub fn run_scan(
    topology_files: &[PathBuf],
    search_locations: &[PathBuf],
    offset_multiple: u64,
    dry_run: bool,
) -> Result<RunReport, InstantiateError> {
    let invocations = scan::find_invocations(topology_files, search_locations)?;
    tracing::debug!("found {} template invocation(s)", invocations.len());
    instantiate_invocations(&invocations, offset_multiple, search_locations, dry_run)
}
