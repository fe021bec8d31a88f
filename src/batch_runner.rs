use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

use log::{info, warn};

use crate::cleaner::ArtifactCleaner;
use crate::datastructures::*;
use crate::error::{BatchError, Result};
use crate::process::{CommandLine, CommandRunner, ProcessOutcome};

/// A solver run that did not complete cleanly.
#[derive(Debug)]
pub struct Failure {
    /// Instance path as handed to the solver.
    pub instance: PathBuf,
    /// [`MethodDescriptor::name`] of the failed method.
    pub method: String,
    /// First error of the run.
    pub error: BatchError,
}

/// Outcome of a batch under [`ErrorPolicy::Continue`].
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Instances visited.
    pub instances: usize,
    /// Method runs attempted, one per instance and method.
    pub invocations: usize,
    /// Failed method runs in the order they happened.
    pub failures: Vec<Failure>,
}

impl BatchReport {
    /// No method run failed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Regular files directly inside `dir`, sorted by name.
pub fn list_instances(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut instances = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| BatchError::io(dir, e))? {
        let entry = entry.map_err(|e| BatchError::io(dir, e))?;
        let file_type =
            entry.file_type().map_err(|e| BatchError::io(entry.path(), e))?;
        if file_type.is_file() {
            instances.push(entry.file_name());
        }
    }
    instances.sort();
    Ok(instances.into_iter().map(PathBuf::from).collect())
}

/// Runs every configured method on every instance, strictly one process at
/// a time.
pub struct BatchRunner<R> {
    config: BatchConfig,
    runner: R,
    cleaner: ArtifactCleaner,
}

impl<R: CommandRunner> BatchRunner<R> {
    pub fn new(config: BatchConfig, runner: R) -> Self {
        let cleaner = ArtifactCleaner::new(config.retry.clone());
        Self {
            config,
            runner,
            cleaner,
        }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn into_runner(self) -> R {
        self.runner
    }

    /// Lists the instance directory and runs every method on every instance.
    pub fn run(&mut self) -> Result<BatchReport> {
        let instance_dir = self.config.instance_dir.clone();
        let instances = list_instances(&self.resolve(&instance_dir))?;
        info!(
            "Solving {} instances from {:?} with {} methods, time limit {}s",
            instances.len(),
            instance_dir,
            self.config.methods.len(),
            self.config.time_limit
        );
        let mut report = BatchReport::default();
        for file_name in instances {
            self.solve_instance(&instance_dir.join(file_name), &mut report)?;
        }
        info!(
            "Finished {} instances with {} solver runs, {} failed",
            report.instances,
            report.invocations,
            report.failures.len()
        );
        Ok(report)
    }

    /// Runs all methods on one instance in configured order. Returns an
    /// error only under [`ErrorPolicy::FailFast`].
    pub fn solve_instance(
        &mut self,
        instance: &Path,
        report: &mut BatchReport,
    ) -> Result<()> {
        report.instances += 1;
        let methods = self.config.methods.clone();
        for method in &methods {
            report.invocations += 1;
            info!("Solving {instance:?} with {}", method.name);
            if let Err(error) = self.solve_with_method(method, instance) {
                match self.config.on_error {
                    ErrorPolicy::FailFast => return Err(error),
                    ErrorPolicy::Continue => {
                        warn!("{} failed on {instance:?}: {error}", method.name);
                        report.failures.push(Failure {
                            instance: instance.to_path_buf(),
                            method: method.name.clone(),
                            error,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn solve_with_method(
        &mut self,
        method: &MethodDescriptor,
        instance: &Path,
    ) -> Result<()> {
        let instance_arg = instance.to_string_lossy().into_owned();
        let time_limit = self.config.time_limit.to_string();
        match &method.recipe {
            Recipe::Direct {
                executable,
                method: variant,
            } => {
                let command = CommandLine::new(
                    executable,
                    [variant.clone(), time_limit, instance_arg],
                );
                self.execute(&command)?;
                Ok(())
            }
            Recipe::ModelingSystem {
                converter,
                driver,
                model,
                solver,
                artifacts,
                exchange_extension,
            } => {
                let convert =
                    CommandLine::new(converter, [instance_arg.clone()]);
                self.execute(&convert)?;
                // the converted file exists from here on and is always removed
                let solved = self.clean_artifacts(artifacts).and_then(|()| {
                    let solve = CommandLine::new(
                        driver,
                        [
                            model.clone(),
                            format!("--timelimit={time_limit}"),
                            format!("--solver={solver}"),
                            format!("--instname={instance_arg}"),
                        ],
                    );
                    self.execute(&solve).map(|_| ())
                });
                let converted =
                    self.resolve(&exchange_file(instance, exchange_extension));
                let cleaned = self.cleaner.delete(&converted);
                solved?;
                cleaned?;
                Ok(())
            }
        }
    }

    fn clean_artifacts(&mut self, artifacts: &[PathBuf]) -> Result<()> {
        for artifact in artifacts {
            let artifact = self.resolve(artifact);
            self.cleaner.delete(&artifact)?;
        }
        Ok(())
    }

    fn execute(&mut self, command: &CommandLine) -> Result<ProcessOutcome> {
        let command = command.clone().in_dir(self.config.working_dir.clone());
        self.runner.run(&command)?.into_result(&command)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.config.working_dir {
            Some(dir) => dir.join(path),
            None => path.to_path_buf(),
        }
    }
}

/// `<instance>.<extension>`, keeping the instance's own extension.
fn exchange_file(instance: &Path, extension: &str) -> PathBuf {
    let mut name = OsString::from(instance.as_os_str());
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}
