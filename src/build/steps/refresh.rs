use crate::build::context::SiteContext;
use crate::build::step::{BuildStep, StepError};

/// Step that rescans the site context, e.g. after guides were added or
/// removed. Register it ahead of the steps that read the context.
pub struct RefreshContextStep {
    name: String,
    title: String,
}

impl RefreshContextStep {
    pub fn new(name: String, title: String) -> Self {
        Self { name, title }
    }
}

impl BuildStep for RefreshContextStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn run(&self, ctx: &mut SiteContext) -> Result<(), StepError> {
        ctx.refresh()?;
        Ok(())
    }
}
