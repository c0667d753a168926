use std::path::PathBuf;
use std::process::ExitStatus;

use super::context::{ContextError, SiteContext};

#[derive(thiserror::Error, Debug)]
pub enum StepError {
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}")]
    CommandFailed { command: String, status: ExitStatus },

    #[error("source directory does not exist: {0}")]
    SourceMissing(PathBuf),

    #[error("failed to copy {path}: {source}")]
    Copy {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("context error: {0}")]
    Context(#[from] ContextError),

    #[error("step '{step}' failed: {message}")]
    Failed { step: String, message: String },
}

impl StepError {
    /// Create a step-specific error.
    pub fn failed(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            step: step.into(),
            message: message.into(),
        }
    }
}

/// A unit of work that regenerates part of the output site.
///
/// Steps run one at a time on the watcher thread, so `run` may block. The
/// context is shared by all steps of a pipeline; only steps that rebuild it
/// should mutate it.
pub trait BuildStep: Send {
    /// Unique name, as referenced by watch registrations.
    fn name(&self) -> &str;

    /// Human readable title for log output.
    fn title(&self) -> &str {
        self.name()
    }

    fn run(&self, ctx: &mut SiteContext) -> Result<(), StepError>;
}
