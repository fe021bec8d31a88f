use core::fmt;
use std::{fs, path::PathBuf, str::FromStr, time::Duration};

use clap::Parser;
use clap_verbosity_flag::Verbosity;
use serde::{Deserialize, Serialize};

use crate::error::{BatchError, Result};

/// Time budget handed to every solver, in seconds.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(try_from = "f64", into = "f64")]
pub struct TimeLimit(f64);

impl TimeLimit {
    pub fn new(seconds: f64) -> std::result::Result<Self, String> {
        if seconds.is_finite() && seconds > 0.0 {
            Ok(Self(seconds))
        } else {
            Err(format!(
                "time limit must be a positive number of seconds, got {seconds}"
            ))
        }
    }

    pub fn seconds(&self) -> f64 {
        self.0
    }
}

impl Default for TimeLimit {
    fn default() -> Self {
        Self(10.0)
    }
}

impl TryFrom<f64> for TimeLimit {
    type Error = String;

    fn try_from(value: f64) -> std::result::Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TimeLimit> for f64 {
    fn from(value: TimeLimit) -> Self {
        value.0
    }
}

impl FromStr for TimeLimit {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let seconds: f64 = s
            .trim()
            .parse()
            .map_err(|_| format!("`{s}` is not a number"))?;
        Self::new(seconds)
    }
}

// Solvers receive the limit as a float literal, so 10 is passed as `10.0`.
impl fmt::Display for TimeLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// How a solver method is reached from the command line.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recipe {
    /// `<executable> <method> <time-limit> <instance>`; the executable appends
    /// its own row to the method's result log.
    Direct { executable: String, method: String },
    /// Convert the instance to the modeling system's exchange format, then run
    /// `<driver> <model> --timelimit=.. --solver=.. --instname=..`.
    ModelingSystem {
        converter: String,
        driver: String,
        model: String,
        solver: String,
        /// Side files the converter leaves in the working directory.
        artifacts: Vec<PathBuf>,
        /// The converted file is `<instance>.<exchange_extension>`.
        exchange_extension: String,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MethodDescriptor {
    pub name: String,
    #[serde(flatten)]
    pub recipe: Recipe,
}

impl MethodDescriptor {
    pub fn direct(method: &str) -> Self {
        Self {
            name: method.to_string(),
            recipe: Recipe::Direct {
                executable: "Solver.exe".to_string(),
                method: method.to_string(),
            },
        }
    }

    pub fn modeling_system(solver: &str) -> Self {
        Self {
            name: format!("gams-{solver}"),
            recipe: Recipe::ModelingSystem {
                converter: "Convert.exe".to_string(),
                driver: "gams".to_string(),
                model: "modelcli.gms".to_string(),
                solver: solver.to_string(),
                artifacts: vec![
                    "_gams_net_gdb0.gdx".into(),
                    "_gams_net_gjo0.gms".into(),
                    "_gams_net_gjo0.lst".into(),
                ],
                exchange_extension: "gdx".to_string(),
            },
        }
    }
}

/// Retry schedule for deleting files another process may still hold open.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// `None` retries forever.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: Option<u32>,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Treat a file that is already gone as deleted.
    #[serde(default)]
    pub missing_is_success: bool,
}

impl RetryPolicy {
    /// Delay after the `attempt`-th failure, doubling from the initial backoff.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1_u64 << attempt.saturating_sub(1).min(20);
        let millis = self
            .initial_backoff_ms
            .saturating_mul(factor)
            .min(self.max_backoff_ms);
        Duration::from_millis(millis)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            missing_is_success: false,
        }
    }
}

fn default_max_attempts() -> Option<u32> {
    Some(10)
}

fn default_initial_backoff_ms() -> u64 {
    50
}

fn default_max_backoff_ms() -> u64 {
    2000
}

/// What the batch does after a solver or cleanup failure.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    #[default]
    Continue,
    FailFast,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BatchConfig {
    #[serde(default = "default_instance_dir")]
    pub instance_dir: PathBuf,
    #[serde(default)]
    pub time_limit: TimeLimit,
    #[serde(default = "default_methods")]
    pub methods: Vec<MethodDescriptor>,
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    #[serde(default)]
    pub retry: RetryPolicy,
    #[serde(default)]
    pub on_error: ErrorPolicy,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            instance_dir: default_instance_dir(),
            time_limit: TimeLimit::default(),
            methods: default_methods(),
            working_dir: None,
            retry: RetryPolicy::default(),
            on_error: ErrorPolicy::default(),
        }
    }
}

impl BatchConfig {
    pub fn from_cli(args: &Args) -> Result<BatchConfig> {
        let mut config = match &args.config {
            Some(config_path) => {
                let config_str = fs::read_to_string(config_path)
                    .map_err(|e| BatchError::io(config_path, e))?;
                serde_json::from_str(&config_str).map_err(|e| {
                    BatchError::Config(format!("{config_path:?}: {e}"))
                })?
            }
            None => BatchConfig::default(),
        };
        if let (Some(directory), Some(time_limit)) =
            (&args.directory, args.time_limit)
        {
            config.instance_dir = directory.to_path_buf();
            config.time_limit = time_limit;
        }
        if args.fail_fast {
            config.on_error = ErrorPolicy::FailFast;
        }
        if config.methods.is_empty() {
            return Err(BatchError::Config(
                "no solver methods configured".into(),
            ));
        }
        Ok(config)
    }
}

fn default_instance_dir() -> PathBuf {
    PathBuf::from("j30")
}

/// Invocation order per instance: the two modeling-system backends, branch
/// and bound, the local search, then the five GA configurations.
pub fn default_methods() -> Vec<MethodDescriptor> {
    let mut methods = vec![
        MethodDescriptor::modeling_system("Gurobi"),
        MethodDescriptor::modeling_system("LocalSolver"),
        MethodDescriptor::direct("BranchAndBound"),
        MethodDescriptor::direct("LocalSolver"),
    ];
    methods.extend((0..5).map(|i| MethodDescriptor::direct(&format!("GA{i}"))));
    methods
}

/// How rows of different result logs are matched up.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    /// Join on instance identity, in the order of the first log.
    #[default]
    Keyed,
    /// Row `i` of every log belongs to row `i` of the first log.
    Positional,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MergeConfig {
    #[serde(default = "default_result_logs")]
    pub result_logs: Vec<PathBuf>,
    #[serde(default = "default_merged_out")]
    pub out: PathBuf,
    #[serde(default)]
    pub alignment: Alignment,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            result_logs: default_result_logs(),
            out: default_merged_out(),
            alignment: Alignment::default(),
        }
    }
}

pub fn default_result_logs() -> Vec<PathBuf> {
    let mut logs = vec![
        PathBuf::from("GUROBI_Results.txt"),
        "BranchAndBoundResults.txt".into(),
        "LocalSolverResults.txt".into(),
    ];
    logs.extend((0..5).map(|i| PathBuf::from(format!("GA{i}Results.txt"))));
    logs
}

fn default_merged_out() -> PathBuf {
    PathBuf::from("merged.txt")
}

#[derive(Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Directory containing the instance files (requires TIME_LIMIT)
    #[arg(requires = "time_limit")]
    pub directory: Option<PathBuf>,
    /// Time limit per solver run in seconds (requires DIRECTORY)
    #[arg(requires = "directory", value_parser)]
    pub time_limit: Option<TimeLimit>,
    /// Path to a json config with solver methods and retry settings
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Stop at the first failed solver run or cleanup
    #[arg(long)]
    pub fail_fast: bool,
    #[command(flatten)]
    pub verbosity: Verbosity,
}
