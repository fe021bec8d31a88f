use std::{fs, path::PathBuf};

use crate::datastructures::*;
use crate::error::Result;
use crate::process::{CommandLine, CommandRunner, ProcessOutcome};

pub fn default_config() -> BatchConfig {
    BatchConfig {
        instance_dir: PathBuf::from("j30"),
        time_limit: TimeLimit::default(),
        methods: vec![
            MethodDescriptor::direct("BranchAndBound"),
            MethodDescriptor::direct("LocalSolver"),
            MethodDescriptor::direct("GA0"),
        ],
        working_dir: None,
        retry: RetryPolicy {
            max_attempts: Some(3),
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
            missing_is_success: false,
        },
        on_error: ErrorPolicy::Continue,
    }
}

/// Records every command instead of running it. `Convert.exe` calls leave
/// behind the files the real converter would.
pub struct RecordingRunner {
    pub calls: Vec<CommandLine>,
    fail_if: Box<dyn Fn(&CommandLine) -> bool>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::failing_when(|_| false)
    }

    pub fn failing_when(fail_if: impl Fn(&CommandLine) -> bool + 'static) -> Self {
        Self {
            calls: Vec::new(),
            fail_if: Box::new(fail_if),
        }
    }

    pub fn rendered_calls(&self) -> Vec<String> {
        self.calls.iter().map(|c| c.to_string()).collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&mut self, command: &CommandLine) -> Result<ProcessOutcome> {
        self.calls.push(command.clone());
        let failed = (self.fail_if)(command);
        if !failed && command.program == "Convert.exe" {
            let dir = command.current_dir.clone().unwrap_or_default();
            for artifact in
                ["_gams_net_gdb0.gdx", "_gams_net_gjo0.gms", "_gams_net_gjo0.lst"]
            {
                fs::write(dir.join(artifact), b"").unwrap();
            }
            fs::write(dir.join(format!("{}.gdx", command.args[0])), b"").unwrap();
        }
        Ok(ProcessOutcome {
            code: Some(if failed { 1 } else { 0 }),
            success: !failed,
            stdout: String::new(),
            stderr: if failed { "solver crashed".into() } else { String::new() },
        })
    }
}
