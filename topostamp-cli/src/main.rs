//! topostamp — stamp out repeated topology fragments from templates.
//!
//! # Usage
//!
//! ```text
//! topostamp generate --templates <FILE>... --offset-multiple <N> (--count <N> | --config <YAML>)
//!                    [--search-locations <DIR>...] [--output-dir <DIR>] [--dry-run]
//! topostamp scan --search-locations <DIR>... --topology-files <FILE>... --offset-multiple <N> [--dry-run]
//! topostamp diff --templates <FILE>... --offset-multiple <N> (--count <N> | --config <YAML>)
//! ```
//!
//! `generate` and `scan` print the generated paths to stdout, one per line.
//! Diagnostics go to stderr; any failure exits non-zero.

mod commands;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use commands::{diff::DiffArgs, generate::GenerateArgs, scan::ScanArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "topostamp",
    version,
    about = "Instantiate topology templates with non-colliding identifier offsets",
    long_about = None,
)]
struct Cli {
    /// Increase log verbosity on stderr (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render every template once per instance and print the generated paths.
    Generate(GenerateArgs),

    /// Render templates requested by `include "<template>.<instance>.fppt"` directives.
    Scan(ScanArgs),

    /// Show unified diff of what `generate` would write.
    Diff(DiffArgs),
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    // env_logger writes to stderr; stdout is reserved for the manifest.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Commands::Generate(args) => args.run(),
        Commands::Scan(args) => args.run(),
        Commands::Diff(args) => args.run(),
    }
}
