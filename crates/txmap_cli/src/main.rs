//! txmap CLI
//!
//! Runs a script of per-context map commands against a fresh transactional
//! map and prints the final shared state.
//!
//! ```text
//! # seed
//! 0 put A 1
//! 1 begin
//! 1 put B 2
//! 1 get B
//! 1 commit
//! 0 size
//! ```

mod runner;
mod script;

use clap::{Parser, ValueEnum};
use runner::{Report, ScriptMap};
use std::io::Read;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use txmap_core::{Config, ReopenPolicy};

/// Run a txmap command script.
#[derive(Parser)]
#[command(name = "txmap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Script file (reads stdin if omitted)
    script: Option<PathBuf>,

    /// Output format for the final state
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Fail `begin` when the context already has an open transaction
    #[arg(long)]
    reject_reopen: bool,

    /// Include operation counters in the report
    #[arg(short, long)]
    stats: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let source = match &cli.script {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let lines = script::parse(&source)?;
    info!(commands = lines.len(), "script parsed");

    let policy = if cli.reject_reopen {
        ReopenPolicy::Reject
    } else {
        ReopenPolicy::Replace
    };
    let map = ScriptMap::with_config(Config::new().reopen_policy(policy));

    for line in runner::run(&map, &lines)? {
        println!("{line}");
    }

    let report = Report::capture(&map, cli.stats);
    match cli.format {
        Format::Text => print!("{}", report.to_text()),
        Format::Json => println!("{}", report.to_json()?),
    }

    Ok(())
}
