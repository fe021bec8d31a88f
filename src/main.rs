use anyhow::Result;
use clap::Parser;
use log::{error, info, warn};

use solver_batch::batch_runner::BatchRunner;
use solver_batch::datastructures::*;
use solver_batch::process::SystemRunner;

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbosity.log_level_filter())
        .init();
    let config = match BatchConfig::from_cli(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            std::process::exit(exitcode::CONFIG);
        }
    };
    let mut batch = BatchRunner::new(config, SystemRunner);
    let report = match batch.run() {
        Ok(report) => report,
        Err(e) if e.is_invocation_failure() => {
            error!("Stopped at the first failed solver run: {e}");
            std::process::exit(exitcode::SOFTWARE);
        }
        Err(e) => return Err(e.into()),
    };
    if report.is_success() {
        info!("All {} solver runs succeeded", report.invocations);
        return Ok(());
    }
    for failure in &report.failures {
        warn!(
            "{} on {:?}: {}",
            failure.method, failure.instance, failure.error
        );
    }
    std::process::exit(exitcode::SOFTWARE);
}
