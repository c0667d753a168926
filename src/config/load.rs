//! Configuration loading from files.
//!
//! The YAML file is layered with `SITEWATCH_*` environment overrides, so
//! `SITEWATCH_DEV__WATCH__POLL=true` flips `dev.watch.poll` for one run.

use std::path::{Path, PathBuf};

use config::{Environment, File, FileFormat};

use super::{Config, ConfigError};

/// Config file name used when none is given on the command line.
pub const DEFAULT_CONFIG_FILE: &str = "sitewatch.yaml";

impl Config {
    /// Resolve the config path from the command line argument, defaulting to
    /// `sitewatch.yaml` in the current directory.
    pub fn path_from_arg(config_file: Option<&Path>) -> Result<PathBuf, ConfigError> {
        let config_file = config_file.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
        if config_file.is_relative() {
            Ok(std::env::current_dir()
                .map_err(ConfigError::CwdFailure)?
                .join(config_file))
        } else {
            Ok(config_file.to_path_buf())
        }
    }

    /// Load the config from a file path, applying environment overrides.
    pub async fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with_env(path, None).await
    }

    /// Load the config, taking environment overrides from `env` instead of
    /// the process environment when given.
    pub(crate) async fn load_with_env(
        path: &Path,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let environment = Environment::with_prefix("SITEWATCH")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(env);

        let layered = config::Config::builder()
            .add_source(File::from_str(&content, FileFormat::Yaml))
            .add_source(environment)
            .build()?;

        Ok(layered.try_deserialize()?)
    }
}
