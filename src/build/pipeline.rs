//! The ordered list of build steps.
//!
//! Declaration order matters: a full build runs every step in order, and a
//! rebuild triggered by the watcher runs its selected steps in the same
//! relative order. Put steps that others depend on (context refresh,
//! guides before the pages that link to them) first.

use std::time::{Duration, Instant};

use tracing::info;

use crate::config::ResolvedSite;
use crate::util::format_elapsed;

use super::context::SiteContext;
use super::step::{BuildStep, StepError};
use super::steps;

#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error("step '{step}' failed: {source}")]
    Step { step: String, source: StepError },
}

/// Summary of a completed full build.
#[derive(Debug)]
pub struct BuildReport {
    pub steps: usize,
    pub elapsed: Duration,
}

pub struct Pipeline {
    steps: Vec<Box<dyn BuildStep>>,
}

impl Pipeline {
    /// Create an empty pipeline with no steps.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Create the pipeline configured for a site.
    pub fn from_site(site: &ResolvedSite) -> Self {
        let mut pipeline = Self::new();
        for step in &site.config.steps {
            pipeline.steps.push(steps::from_config(step, site));
        }
        pipeline
    }

    /// Add a step to the end of the pipeline.
    #[cfg(test)]
    pub fn add_step<S: BuildStep + 'static>(&mut self, step: S) -> &mut Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Get the names of all steps in order.
    pub fn names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Position of the step called `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.name() == name)
    }

    /// Name of the step at `index`.
    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.steps.get(index).map(|s| s.name())
    }

    /// Run a single step, logging its title and how long it took.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn execute(&self, index: usize, ctx: &mut SiteContext) -> Result<(), BuildError> {
        let step = &self.steps[index];
        info!("{}...", step.title());

        let start = Instant::now();
        step.run(ctx).map_err(|source| BuildError::Step {
            step: step.name().to_string(),
            source,
        })?;

        info!("{} done in {}", step.title(), format_elapsed(start.elapsed()));
        Ok(())
    }

    /// Run every step in order, stopping at the first failure.
    pub fn build_all(&self, ctx: &mut SiteContext) -> Result<BuildReport, BuildError> {
        let start = Instant::now();
        for index in 0..self.steps.len() {
            self.execute(index, ctx)?;
        }

        Ok(BuildReport {
            steps: self.steps.len(),
            elapsed: start.elapsed(),
        })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
