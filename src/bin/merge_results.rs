use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use clap_verbosity_flag::Verbosity;
use log::error;

use solver_batch::aggregator;
use solver_batch::datastructures::{Alignment, MergeConfig};

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Result logs to merge, the first one fixes the instance order
    /// (defaults to the logs of all configured solvers)
    #[arg(value_name = "LOG")]
    logs: Vec<PathBuf>,
    /// Path to a json config
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Path of the merged table
    #[arg(short, long, value_name = "FILE")]
    out: Option<PathBuf>,
    /// Match rows by position instead of by instance name
    #[arg(short, long)]
    positional: bool,
    #[command(flatten)]
    verbosity: Verbosity,
}

fn merge_config(args: &Args) -> Result<MergeConfig> {
    let mut config = match &args.config {
        Some(path) => serde_json::from_str(
            &fs::read_to_string(path)
                .with_context(|| format!("reading {path:?}"))?,
        )?,
        None => MergeConfig::default(),
    };
    if !args.logs.is_empty() {
        config.result_logs = args.logs.clone();
    }
    if let Some(out) = &args.out {
        config.out = out.to_path_buf();
    }
    if args.positional {
        config.alignment = Alignment::Positional;
    }
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbosity.log_level_filter())
        .init();
    let config = match merge_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("{e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };
    aggregator::merge_results(&config)?;
    Ok(())
}
