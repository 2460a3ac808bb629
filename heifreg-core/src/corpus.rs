use crate::error::{HarnessError, Result};
use camino::Utf8Path;
use std::process::{Command, Stdio};
use tracing::{info, warn};

/// Something that can materialize the corpus at a local path.
pub trait CorpusFetcher {
    fn fetch(&self, remote: &str, target: &Utf8Path) -> Result<()>;
}

impl<T: CorpusFetcher + ?Sized> CorpusFetcher for &T {
    fn fetch(&self, remote: &str, target: &Utf8Path) -> Result<()> {
        (**self).fetch(remote, target)
    }
}

/// Fetches the corpus with `git clone`.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitFetcher;

impl CorpusFetcher for GitFetcher {
    fn fetch(&self, remote: &str, target: &Utf8Path) -> Result<()> {
        let status = Command::new("git")
            .arg("clone")
            .arg(remote)
            .arg(target.as_str())
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .status()
            .map_err(|e| HarnessError::Provision {
                target: target.to_owned(),
                reason: format!("could not run git: {e}"),
            })?;

        if !status.success() {
            return Err(HarnessError::Provision {
                target: target.to_owned(),
                reason: format!("git clone {remote} exited with {status}"),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    AlreadyPresent,
    Fetched,
}

/// Makes sure the conformance corpus exists before any case runs.
///
/// Existence of the target directory is the only check; its contents are
/// never inspected or touched once it is there.
#[derive(Debug, Clone)]
pub struct CorpusProvisioner<F = GitFetcher> {
    remote: String,
    fetcher: F,
}

impl CorpusProvisioner<GitFetcher> {
    pub fn git(remote: impl Into<String>) -> Self {
        Self::new(remote, GitFetcher)
    }
}

impl<F: CorpusFetcher> CorpusProvisioner<F> {
    pub fn new(remote: impl Into<String>, fetcher: F) -> Self {
        Self {
            remote: remote.into(),
            fetcher,
        }
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    pub fn ensure(&self, target: &Utf8Path) -> Result<ProvisionOutcome> {
        if target.exists() && !target.is_dir() {
            return Err(HarnessError::Provision {
                target: target.to_owned(),
                reason: "path exists but is not a directory".to_owned(),
            });
        }
        if target.is_dir() {
            info!("Conformance corpus present at {}", target);
            return Ok(ProvisionOutcome::AlreadyPresent);
        }

        info!("Fetching conformance corpus from {} into {}", self.remote, target);
        if let Err(e) = self.fetcher.fetch(&self.remote, target) {
            // A half-written clone would pass the existence check next time.
            if target.exists() {
                warn!("Removing partial corpus at {}", target);
                if let Err(cleanup) = std::fs::remove_dir_all(target) {
                    warn!("Failed to remove {}: {}", target, cleanup);
                }
            }
            return Err(e);
        }

        if !target.is_dir() {
            return Err(HarnessError::Provision {
                target: target.to_owned(),
                reason: "fetch reported success but the directory does not exist".to_owned(),
            });
        }
        Ok(ProvisionOutcome::Fetched)
    }
}
