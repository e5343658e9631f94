pub mod diff;
pub mod generate;
pub mod scan;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use topostamp_core::{
    config::load_instance_table,
    types::{InstanceSet, InstantiationRequest, Manifest},
};

/// Request arguments shared by `generate` and `diff`.
#[derive(Args, Debug)]
pub struct RequestArgs {
    /// Package/library locations; `<loc>/topology-templates` holds shared templates.
    #[arg(long, num_args = 1.., value_name = "DIR")]
    pub search_locations: Vec<PathBuf>,

    /// Template files rendered once per instance.
    #[arg(long, num_args = 1.., required = true, value_name = "FILE")]
    pub templates: Vec<PathBuf>,

    /// Identifier step between consecutive instances. Must exceed the
    /// identifier span of one instance; this is not checked.
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub offset_multiple: u64,

    /// Number of instances, named 0..N-1.
    #[arg(long, value_name = "N", required_unless_present = "config", conflicts_with = "config")]
    pub count: Option<usize>,

    /// YAML instance table naming each instance and its parameters.
    #[arg(long, value_name = "YAML")]
    pub config: Option<PathBuf>,

    /// Write outputs here instead of next to each template.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

impl RequestArgs {
    pub fn into_request(self) -> Result<InstantiationRequest> {
        let instances = match (self.count, self.config) {
            (Some(n), _) => InstanceSet::Count(n),
            (None, Some(path)) => InstanceSet::Table(
                load_instance_table(&path)
                    .with_context(|| format!("failed to load instance table '{}'", path.display()))?,
            ),
            (None, None) => anyhow::bail!("provide --count or --config"),
        };
        Ok(InstantiationRequest {
            template_files: self.templates,
            offset_multiple: self.offset_multiple,
            instances,
            search_locations: self.search_locations,
            output_dir: self.output_dir,
        })
    }
}

/// Emit the manifest on stdout, one path per line. Nothing else goes to stdout.
pub fn print_manifest(manifest: &Manifest) {
    for path in manifest.iter() {
        println!("{}", path.display());
    }
}
