use std::{fs, io, path::Path, thread};

use log::{debug, warn};

use crate::datastructures::RetryPolicy;
use crate::error::{BatchError, Result};

/// Deletes intermediate files that a just-finished process may not have
/// released yet, retrying with exponential backoff.
pub struct ArtifactCleaner<F = fn(&Path) -> io::Result<()>> {
    policy: RetryPolicy,
    remove: F,
}

impl ArtifactCleaner {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            remove: |path: &Path| fs::remove_file(path),
        }
    }
}

impl<F> ArtifactCleaner<F>
where
    F: FnMut(&Path) -> io::Result<()>,
{
    pub fn with_remover(policy: RetryPolicy, remove: F) -> Self {
        Self { policy, remove }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Deletes `path` and returns the number of attempts it took.
    ///
    /// Blocks between attempts. With `max_attempts: None` this only returns
    /// once the file is gone.
    pub fn delete(&mut self, path: &Path) -> Result<u32> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match (self.remove)(path) {
                Ok(()) => {
                    debug!("Deleted {path:?} (attempt {attempt})");
                    return Ok(attempt);
                }
                Err(e)
                    if e.kind() == io::ErrorKind::NotFound
                        && self.policy.missing_is_success =>
                {
                    debug!("{path:?} is already gone");
                    return Ok(attempt);
                }
                Err(e) => {
                    if let Some(max_attempts) = self.policy.max_attempts {
                        if attempt >= max_attempts {
                            return Err(BatchError::CleanupExhausted {
                                path: path.to_path_buf(),
                                attempts: attempt,
                                source: e,
                            });
                        }
                    }
                    let backoff = self.policy.backoff(attempt);
                    warn!(
                        "Deleting {path:?} failed ({e}), retrying in {}ms",
                        backoff.as_millis()
                    );
                    thread::sleep(backoff);
                }
            }
        }
    }
}
