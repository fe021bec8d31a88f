use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, BatchError>;

/// Everything that can go wrong while running solvers or merging their logs.
#[derive(Error, Debug)]
pub enum BatchError {
    /// Reading or writing a file outside of artifact cleanup.
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unreadable or inconsistent configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The program could not be started at all, e.g. it is not on `PATH`.
    #[error("failed to start `{command}`: {source}")]
    ProcessSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The program ran but reported failure. `stderr` is its captured
    /// error output.
    #[error("`{command}` exited with {status}: {stderr}")]
    ProcessFailed {
        command: String,
        status: String,
        stderr: String,
    },

    /// A file stayed locked or missing through every delete attempt.
    #[error("could not delete {path:?} after {attempts} attempts: {source}")]
    CleanupExhausted {
        path: PathBuf,
        attempts: u32,
        #[source]
        source: std::io::Error,
    },

    /// A result log line without an instance and a value. `line` is 1-based.
    #[error("{file:?}, line {line}: expected `<instance>;<value>`, found {content:?}")]
    MalformedRow {
        file: PathBuf,
        line: usize,
        content: String,
    },

    /// Result logs do not cover the same instances.
    #[error("result logs are not aligned: {0}")]
    AlignmentMismatch(String),

    /// Two result logs, or a log and the instance column, share a header.
    #[error("result logs {first:?} and {second:?} map to the same column `{column}`")]
    DuplicateColumn {
        column: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// Nothing to merge.
    #[error("no result logs configured")]
    NoResultLogs,

    /// Building the merged table failed.
    #[error(transparent)]
    Table(#[from] polars::prelude::PolarsError),
}

impl BatchError {
    /// A solver run or its cleanup failed, as opposed to the batch itself
    /// being unable to start.
    pub fn is_invocation_failure(&self) -> bool {
        matches!(
            self,
            BatchError::ProcessSpawn { .. }
                | BatchError::ProcessFailed { .. }
                | BatchError::CleanupExhausted { .. }
        )
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BatchError::Io {
            path: path.into(),
            source,
        }
    }
}
