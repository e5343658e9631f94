//! `topostamp generate` — render every template for every instance.

use anyhow::{Context, Result};
use clap::Args;

use topostamp_instantiate::{run, WriteResult};

use super::{print_manifest, RequestArgs};

/// Arguments for `topostamp generate`.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// Render and report paths without writing any files.
    #[arg(long)]
    pub dry_run: bool,
}

impl GenerateArgs {
    pub fn run(self) -> Result<()> {
        let dry_run = self.dry_run;
        let request = self.request.into_request()?;
        let report = run(&request, dry_run).context("template instantiation failed")?;

        let written = report
            .writes
            .iter()
            .filter(|w| matches!(w, WriteResult::Written { .. } | WriteResult::WouldWrite { .. }))
            .count();
        log::info!(
            "{}{} file(s) generated ({} written, {} unchanged)",
            if dry_run { "[dry-run] " } else { "" },
            report.manifest.len(),
            written,
            report.writes.len() - written
        );

        print_manifest(&report.manifest);
        Ok(())
    }
}
