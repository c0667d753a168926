//! Configuration type definitions.
//!
//! This module contains all the data structures used in `sitewatch.yaml`.
//! These types are pure data - no I/O or complex logic.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// =============================================================================
// Top-level config
// =============================================================================

/// The full project configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    /// Build steps, in the order a full build runs them.
    pub steps: Vec<StepConfig>,
    /// Which directories trigger which steps.
    #[serde(default)]
    pub watch: Vec<WatchEntry>,
    #[serde(default)]
    pub context: ContextConfig,
    /// Development-specific settings (watch mode, etc.)
    #[serde(default)]
    pub dev: DevConfig,
}

// =============================================================================
// Site configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    /// Web source directory (relative to the config file)
    #[serde(default = "default_source")]
    pub source: PathBuf,
    /// Output directory (relative to the config file)
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

fn default_source() -> PathBuf {
    PathBuf::from(".")
}

fn default_output() -> PathBuf {
    PathBuf::from("_site")
}

// =============================================================================
// Build steps
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepConfig {
    /// Unique identifier, referenced from `watch` entries
    pub name: String,
    /// Display title for log output (defaults to name if not set)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// What the step does
    #[serde(flatten)]
    pub action: StepAction,
}

/// What a build step does when it runs.
///
/// YAML formats:
/// ```yaml
/// - name: pages
///   command: make pages
/// - name: resources
///   copy:
///     from: resources
///     to: resources
/// - name: context
///   builtin: refresh-context
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepAction {
    /// Run an external builder program
    Command { command: CommandSpec },
    /// Mirror a source directory into the output
    Copy { copy: CopySpec },
    /// A step implemented by sitewatch itself
    Builtin { builtin: BuiltinStep },
}

/// An external command, either a shell line or an explicit program + args.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandSpec {
    /// Compact format: "make pages", run through the platform shell
    Shell(String),
    /// Expanded format with program, args, working dir and environment
    Program(ProgramSpec),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramSpec {
    pub program: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    /// Working directory (relative to the config file)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopySpec {
    /// Directory to copy from (relative to `site.source`)
    pub from: PathBuf,
    /// Destination inside the output directory
    #[serde(default)]
    pub to: PathBuf,
    /// Remove the destination before copying, so deleted files disappear
    #[serde(default = "default_clean")]
    pub clean: bool,
}

fn default_clean() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuiltinStep {
    /// Rescan the site context (collections)
    RefreshContext,
}

impl StepConfig {
    /// The title used in log output.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }
}

// =============================================================================
// Watch registrations
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchEntry {
    /// Directory to watch (relative to `site.source`)
    pub path: PathBuf,
    /// Watch subdirectories too
    #[serde(default = "default_recursive")]
    pub recursive: bool,
    /// Names of the steps to run when something under `path` changes
    pub steps: Vec<String>,
}

fn default_recursive() -> bool {
    true
}

// =============================================================================
// Site context
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Named directories (relative to `site.source`) indexed into the context
    #[serde(default)]
    pub collections: BTreeMap<String, PathBuf>,
}

// =============================================================================
// Development configuration
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DevConfig {
    /// File watching configuration
    #[serde(default)]
    pub watch: WatchConfig,
}

/// Configuration for file watching during development.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Use polling-based watcher instead of native file system events.
    /// Useful for network filesystems, Docker volumes, or other situations
    /// where native events are unreliable.
    #[serde(default)]
    pub poll: bool,
    /// Poll interval in milliseconds (only used if poll=true).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Debounce timeout in milliseconds.
    /// Changes within this window are batched together.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_debounce_ms() -> u64 {
    100
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll: false,
            poll_interval_ms: default_poll_interval_ms(),
            debounce_ms: default_debounce_ms(),
        }
    }
}
