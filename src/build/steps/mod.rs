//! Build step implementations.
//!
//! 1. **CommandStep** - Run an external builder program
//! 2. **CopyStep** - Mirror a source directory into the output
//! 3. **RefreshContextStep** - Rescan the site context

mod command;
mod copy;
mod refresh;

pub use command::CommandStep;
pub use copy::CopyStep;
pub use refresh::RefreshContextStep;

use crate::config::{BuiltinStep, ResolvedSite, StepAction, StepConfig};

use super::paths::resolve_against;
use super::step::BuildStep;

/// Create the step described by `config`.
pub fn from_config(config: &StepConfig, site: &ResolvedSite) -> Box<dyn BuildStep> {
    let name = config.name.clone();
    let title = config.display_title().to_string();

    match &config.action {
        StepAction::Command { command } => Box::new(CommandStep::new(
            name,
            title,
            command.clone(),
            site.root.clone(),
        )),
        StepAction::Copy { copy } => Box::new(CopyStep::new(
            name,
            title,
            site.source_path(&copy.from),
            resolve_against(&site.output_dir, &copy.to),
            copy.clean,
        )),
        StepAction::Builtin {
            builtin: BuiltinStep::RefreshContext,
        } => Box::new(RefreshContextStep::new(name, title)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::test_support::{resolved_site, site_context};

    #[test]
    fn test_from_config_builds_each_kind() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("web-src/resources")).unwrap();
        std::fs::write(dir.path().join("web-src/resources/app.js"), "").unwrap();

        let site = resolved_site(dir.path());
        let steps: Vec<_> = site
            .config
            .steps
            .iter()
            .map(|step| from_config(step, &site))
            .collect();

        let names: Vec<_> = steps.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["context", "resources", "guides", "pages"]);
        assert_eq!(steps[1].title(), "Resources");

        // The copy step writes below the output directory
        let mut ctx = site_context(dir.path());
        steps[1].run(&mut ctx).unwrap();
        assert!(dir.path().join("_site/resources/app.js").exists());
    }
}
