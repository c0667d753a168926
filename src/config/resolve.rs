//! Validation and path resolution.
//!
//! A `Config` only names paths relative to the config file and steps by
//! name. Resolving checks the cross references and turns every path into
//! an absolute one, producing a `ResolvedSite` the build layer can use
//! without looking at the config file again.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::{Config, ConfigError};
use crate::build::paths::{base_path_from_config, resolve_against};

/// A validated config with its directories resolved.
#[derive(Debug, Clone)]
pub struct ResolvedSite {
    pub config: Config,
    /// Directory containing the config file; command steps run here.
    pub root: PathBuf,
    /// The web source directory.
    pub source_dir: PathBuf,
    /// The output directory.
    pub output_dir: PathBuf,
}

impl ResolvedSite {
    /// Resolve a path from the config against the web source directory.
    pub fn source_path(&self, path: &Path) -> PathBuf {
        resolve_against(&self.source_dir, path)
    }
}

impl Config {
    /// Validate this config and resolve its paths against `config_path`.
    pub fn resolve(self, config_path: &Path) -> Result<ResolvedSite, ConfigError> {
        self.validate()?;

        let root = base_path_from_config(config_path);
        let source_dir = resolve_against(&root, &self.site.source);
        let output_dir = resolve_against(&root, &self.site.output);

        Ok(ResolvedSite {
            config: self,
            root,
            source_dir,
            output_dir,
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.steps.is_empty() {
            return Err(ConfigError::Validation(
                "invalid config: at least one build step is required\n\nExample:\n  steps:\n    - name: pages\n      command: make pages".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for step in &self.steps {
            if step.name.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "invalid config: every step needs a non-empty 'name'".to_string(),
                ));
            }
            if !names.insert(step.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "invalid config: step '{}' is defined more than once",
                    step.name
                )));
            }
        }

        for entry in &self.watch {
            if entry.steps.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "invalid config: watch entry '{}' does not name any steps",
                    entry.path.display()
                )));
            }
            if let Some(unknown) = entry.steps.iter().find(|s| !names.contains(s.as_str())) {
                return Err(ConfigError::Validation(format!(
                    "invalid config: watch entry '{}' refers to unknown step '{}'",
                    entry.path.display(),
                    unknown
                )));
            }
        }

        Ok(())
    }
}
