//! `topostamp diff` — show unified diffs for what `generate` would write.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use topostamp_instantiate::diff_request;

use super::RequestArgs;

/// Arguments for `topostamp diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    #[command(flatten)]
    pub request: RequestArgs,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let request = self.request.into_request()?;
        let diffs = diff_request(&request).context("diff failed")?;

        if diffs.is_empty() {
            println!("No differences.");
            return Ok(());
        }

        for diff in diffs {
            for line in diff.unified_diff.lines() {
                if line.starts_with("+++") || line.starts_with("---") {
                    println!("{}", line.bold());
                } else if line.starts_with('+') {
                    println!("{}", line.green());
                } else if line.starts_with('-') {
                    println!("{}", line.red());
                } else if line.starts_with("@@") {
                    println!("{}", line.cyan());
                } else {
                    println!("{line}");
                }
            }
        }

        Ok(())
    }
}
