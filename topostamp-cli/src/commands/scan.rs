//! `topostamp scan` — instantiate templates named by include directives.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use topostamp_instantiate::run_scan;

use super::print_manifest;

/// Arguments for `topostamp scan`.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Package/library locations searched for `topology-templates/<name>.fppt`.
    #[arg(long, num_args = 1.., required = true, value_name = "DIR")]
    pub search_locations: Vec<PathBuf>,

    /// Main topology files to scan for `include "<template>.<instance>.fppt"`.
    #[arg(long, num_args = 1.., required = true, value_name = "FILE")]
    pub topology_files: Vec<PathBuf>,

    /// Identifier step between consecutive invocations.
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub offset_multiple: u64,

    /// Render and report paths without writing any files.
    #[arg(long)]
    pub dry_run: bool,
}

impl ScanArgs {
    pub fn run(self) -> Result<()> {
        let report = run_scan(
            &self.topology_files,
            &self.search_locations,
            self.offset_multiple,
            self.dry_run,
        )
        .context("template invocation processing failed")?;
        print_manifest(&report.manifest);
        Ok(())
    }
}
