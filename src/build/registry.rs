//! Watch registrations: which directories trigger which steps.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::ResolvedSite;

use super::paths::canonical_or_self;
use super::pipeline::Pipeline;

#[derive(thiserror::Error, Debug)]
pub enum RegistryError {
    #[error("watch entry '{path}' refers to unknown step '{step}'")]
    UnknownStep { path: PathBuf, step: String },

    #[error("none of the configured watch directories exist")]
    NothingToWatch,
}

/// A watched directory and the steps it triggers (as pipeline indices).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub path: PathBuf,
    pub recursive: bool,
    pub steps: Vec<usize>,
}

impl Registration {
    /// Whether a change at `path` belongs to this registration.
    ///
    /// Recursive registrations match anything below their directory;
    /// non-recursive ones only the directory and its direct children.
    pub fn matches(&self, path: &Path) -> bool {
        if self.recursive {
            path.starts_with(&self.path)
        } else {
            path == self.path || path.parent() == Some(self.path.as_path())
        }
    }
}

#[derive(Debug, Default)]
pub struct WatchRegistry {
    registrations: Vec<Registration>,
}

impl WatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the watch entries configured for a site.
    ///
    /// Entries whose directory does not exist are skipped with a warning.
    /// At least one entry must remain.
    pub fn from_site(site: &ResolvedSite, pipeline: &Pipeline) -> Result<Self, RegistryError> {
        let mut registry = Self::new();

        for entry in &site.config.watch {
            let path = site.source_path(&entry.path);
            if !path.is_dir() {
                warn!("Not watching {}: directory does not exist", path.display());
                continue;
            }

            let steps = entry
                .steps
                .iter()
                .map(|step| {
                    pipeline
                        .index_of(step)
                        .ok_or_else(|| RegistryError::UnknownStep {
                            path: entry.path.clone(),
                            step: step.clone(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;

            registry.register(path, entry.recursive, steps);
        }

        if registry.is_empty() {
            return Err(RegistryError::NothingToWatch);
        }

        Ok(registry)
    }

    /// Associate `path` with a set of steps.
    ///
    /// The path is canonicalized so it matches the paths the filesystem
    /// watcher reports.
    pub fn register(&mut self, path: PathBuf, recursive: bool, steps: Vec<usize>) {
        let path = canonical_or_self(&path);
        info!("Watching: {}", path.display());
        self.registrations.push(Registration {
            path,
            recursive,
            steps,
        });
    }

    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// The steps to run for a batch of changed paths.
    ///
    /// Every registration matching any of the paths contributes its steps.
    /// The result holds each step once, in pipeline order.
    pub fn steps_for(&self, paths: &[PathBuf]) -> Vec<usize> {
        let mut steps: Vec<usize> = self
            .registrations
            .iter()
            .filter(|reg| paths.iter().any(|p| reg.matches(p)))
            .flat_map(|reg| reg.steps.iter().copied())
            .collect();

        steps.sort_unstable();
        steps.dedup();
        steps
    }
}
