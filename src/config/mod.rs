//! Configuration loading and types for sitewatch.
//!
//! This module handles all aspects of configuration:
//! - Type definitions for config structures (`types`)
//! - Loading configs from files and the environment (`load`)
//! - Validating and resolving paths into a `ResolvedSite` (`resolve`)

mod load;
mod resolve;
mod types;

pub use load::DEFAULT_CONFIG_FILE;
pub use resolve::ResolvedSite;
pub use types::{
    BuiltinStep, CommandSpec, Config, ContextConfig, CopySpec, DevConfig, ProgramSpec,
    SiteConfig, StepAction, StepConfig, WatchConfig, WatchEntry,
};

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Deserialize(#[from] config::ConfigError),

    #[error("failed to get current working directory: {0}")]
    CwdFailure(std::io::Error),

    #[error("{0}")]
    Validation(String),
}
