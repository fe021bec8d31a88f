use core::fmt;
use std::{path::PathBuf, process::Command};

use itertools::Itertools;
use log::{debug, info};

use crate::error::{BatchError, Result};

/// A fully resolved external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
    pub current_dir: Option<PathBuf>,
}

impl CommandLine {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            current_dir: None,
        }
    }

    pub fn in_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.current_dir = dir;
        self
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            write!(f, "{}", self.program)
        } else {
            write!(f, "{} {}", self.program, self.args.iter().join(" "))
        }
    }
}

/// Exit status and captured output of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    pub code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutcome {
    /// Turns a non-zero exit into [`BatchError::ProcessFailed`].
    pub fn into_result(self, command: &CommandLine) -> Result<ProcessOutcome> {
        if self.success {
            Ok(self)
        } else {
            Err(BatchError::ProcessFailed {
                command: command.to_string(),
                status: match self.code {
                    Some(code) => format!("exit code {code}"),
                    None => "no exit code (terminated by signal)".to_string(),
                },
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Runs external commands to completion, one at a time.
pub trait CommandRunner {
    fn run(&mut self, command: &CommandLine) -> Result<ProcessOutcome>;
}

/// Spawns real processes, inheriting the current environment.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, command: &CommandLine) -> Result<ProcessOutcome> {
        info!("Running `{command}`");
        let mut process = Command::new(&command.program);
        process.args(&command.args);
        if let Some(dir) = &command.current_dir {
            process.current_dir(dir);
        }
        let output =
            process.output().map_err(|source| BatchError::ProcessSpawn {
                command: command.to_string(),
                source,
            })?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !stdout.trim().is_empty() {
            debug!("`{}` stdout:\n{}", command.program, stdout.trim_end());
        }
        Ok(ProcessOutcome {
            code: output.status.code(),
            success: output.status.success(),
            stdout,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
