#![warn(missing_docs)]
//! Run a portfolio of external combinatorial optimization solvers over a
//! directory of problem instances and merge their result logs into a single
//! comparison table.
//!
//! Two pipelines share a working directory:
//!
//! - [`batch_runner::BatchRunner`] calls every configured solver method on
//!   every instance file, one process at a time. Each solver appends a
//!   `<instance>;<value>;...` row to its own result log.
//! - [`aggregator::merge_results`] reads those logs and writes one
//!   semicolon separated table with an `instance` column and one column per
//!   log, using a comma as decimal separator.
//!
//! The solvers are opaque executables. Modeling-system backends (Gurobi,
//! LocalSolver through GAMS) need their instance converted first; the
//! converter leaves temporary files behind that are removed by
//! [`cleaner::ArtifactCleaner`], which retries while the converter still
//! holds them open.
//!
//! Example
//! ```rust,no_run
//! use solver_batch::aggregator;
//! use solver_batch::batch_runner::BatchRunner;
//! use solver_batch::datastructures::*;
//! use solver_batch::process::SystemRunner;
//! # use anyhow::Result;
//!
//! fn example() -> Result<()> {
//!     let config = BatchConfig {
//!         instance_dir: "j60".into(),
//!         time_limit: TimeLimit::new(30.0).map_err(anyhow::Error::msg)?,
//!         ..BatchConfig::default() // all nine methods, bounded cleanup retries
//!     };
//!     let report = BatchRunner::new(config, SystemRunner).run()?;
//!     println!("{} solver runs failed", report.failures.len());
//!
//!     // GUROBI_Results.txt, BranchAndBoundResults.txt, ... -> merged.txt
//!     let merged = aggregator::merge_results(&MergeConfig::default())?;
//!     println!("{merged}");
//!     Ok(())
//! }
//! ```

/// Merges per-solver result logs into one table.
pub mod aggregator;

/// Runs every solver method on every instance of a directory.
pub mod batch_runner;

/// Deletion of intermediate files with bounded retries.
pub mod cleaner;

/// Configuration and command line types.
pub mod datastructures;

/// Error types shared by both pipelines.
pub mod error;

/// Boundary to external solver processes.
pub mod process;

/// Parsing of `;` delimited solver result logs.
pub mod result_parser;

#[cfg(test)]
mod test_utils;
