//! Mirror a source directory into the output.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::build::context::SiteContext;
use crate::build::paths::canonical_or_self;
use crate::build::step::{BuildStep, StepError};

/// Step that copies a directory tree (resources, images, scripts) into the
/// output directory.
pub struct CopyStep {
    name: String,
    title: String,
    from: PathBuf,
    to: PathBuf,
    clean: bool,
}

impl CopyStep {
    /// `from` and `to` must already be resolved to absolute paths.
    pub fn new(name: String, title: String, from: PathBuf, to: PathBuf, clean: bool) -> Self {
        Self {
            name,
            title,
            from,
            to,
            clean,
        }
    }
}

impl BuildStep for CopyStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn run(&self, ctx: &mut SiteContext) -> Result<(), StepError> {
        if !self.from.is_dir() {
            return Err(StepError::SourceMissing(self.from.clone()));
        }

        // Cleaning the output root would wipe what every other step wrote
        if self.clean && canonical_or_self(&self.to) == canonical_or_self(&ctx.output_dir) {
            return Err(StepError::failed(
                &self.name,
                format!(
                    "refusing to clean the output directory {}; set 'to' to a subdirectory or use 'clean: false'",
                    self.to.display()
                ),
            ));
        }

        if self.clean && self.to.exists() {
            std::fs::remove_dir_all(&self.to).map_err(|source| StepError::Copy {
                path: self.to.clone(),
                source,
            })?;
        }

        let copied = copy_tree(&self.from, &self.to, &self.to)?;
        debug!(
            "copied {} file(s) from {} to {}",
            copied,
            self.from.display(),
            self.to.display()
        );
        Ok(())
    }
}

fn copy_error(path: &Path) -> impl FnOnce(std::io::Error) -> StepError {
    let path = path.to_path_buf();
    move |source| StepError::Copy { path, source }
}

/// Recursively copy non-hidden files from `from` into `to`.
///
/// `dest_root` is never descended into, so a destination that lies inside
/// the source tree does not copy into itself.
fn copy_tree(from: &Path, to: &Path, dest_root: &Path) -> Result<usize, StepError> {
    std::fs::create_dir_all(to).map_err(copy_error(to))?;

    let mut copied = 0;
    for entry in std::fs::read_dir(from).map_err(copy_error(from))? {
        let entry = entry.map_err(copy_error(from))?;
        let file_name = entry.file_name();

        // Skip hidden files and directories
        if file_name.to_string_lossy().starts_with('.') {
            continue;
        }

        let source = entry.path();
        if source == dest_root {
            debug!("skipping destination {} inside source", source.display());
            continue;
        }
        let target = to.join(&file_name);

        if source.is_dir() {
            copied += copy_tree(&source, &target, dest_root)?;
        } else if source.is_file() {
            std::fs::copy(&source, &target).map_err(copy_error(&source))?;
            copied += 1;
        }
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::test_support::site_context;
    use pretty_assertions::assert_eq;

    fn setup() -> (tempfile::TempDir, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("web-src/resources");
        std::fs::create_dir_all(from.join("css")).unwrap();
        std::fs::write(from.join("logo.svg"), "<svg/>").unwrap();
        std::fs::write(from.join("css/site.css"), "body {}").unwrap();
        std::fs::write(from.join(".DS_Store"), "").unwrap();
        let to = dir.path().join("_site/resources");
        (dir, from, to)
    }

    #[test]
    fn test_copies_tree() {
        let (dir, from, to) = setup();
        let mut ctx = site_context(dir.path());

        let step = CopyStep::new("resources".into(), "Resources".into(), from, to.clone(), true);
        step.run(&mut ctx).unwrap();

        assert_eq!(std::fs::read_to_string(to.join("logo.svg")).unwrap(), "<svg/>");
        assert_eq!(
            std::fs::read_to_string(to.join("css/site.css")).unwrap(),
            "body {}"
        );
        assert!(!to.join(".DS_Store").exists());
    }

    #[test]
    fn test_clean_removes_stale_files() {
        let (dir, from, to) = setup();
        std::fs::create_dir_all(&to).unwrap();
        std::fs::write(to.join("stale.js"), "").unwrap();
        let mut ctx = site_context(dir.path());

        CopyStep::new("resources".into(), "Resources".into(), from.clone(), to.clone(), true)
            .run(&mut ctx)
            .unwrap();
        assert!(!to.join("stale.js").exists());

        std::fs::write(to.join("stale.js"), "").unwrap();
        CopyStep::new("resources".into(), "Resources".into(), from, to.clone(), false)
            .run(&mut ctx)
            .unwrap();
        assert!(to.join("stale.js").exists());
    }

    #[test]
    fn test_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = site_context(dir.path());
        let step = CopyStep::new(
            "resources".into(),
            "Resources".into(),
            dir.path().join("nope"),
            dir.path().join("_site"),
            true,
        );
        assert!(matches!(
            step.run(&mut ctx).unwrap_err(),
            StepError::SourceMissing(_)
        ));
    }

    #[test]
    fn test_refuses_to_clean_output_root() {
        let (dir, from, _) = setup();
        let mut ctx = site_context(dir.path());
        let output = dir.path().join("_site");
        std::fs::create_dir_all(output.join("guides")).unwrap();
        std::fs::write(output.join("guides/index.html"), "").unwrap();

        let step = CopyStep::new(
            "resources".into(),
            "Resources".into(),
            from.clone(),
            output.join(""),
            true,
        );
        let err = step.run(&mut ctx).unwrap_err();
        assert!(matches!(&err, StepError::Failed { step, .. } if step == "resources"));
        assert!(output.join("guides/index.html").exists());

        // Without cleaning, copying straight into the output root is fine
        CopyStep::new("resources".into(), "Resources".into(), from, output.clone(), false)
            .run(&mut ctx)
            .unwrap();
        assert!(output.join("logo.svg").exists());
        assert!(output.join("guides/index.html").exists());
    }

    #[test]
    fn test_destination_inside_source_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        std::fs::write(root.join("index.html"), "<h1/>").unwrap();
        std::fs::create_dir_all(root.join("_site/assets")).unwrap();
        std::fs::write(root.join("_site/assets/old.css"), "").unwrap();
        let mut ctx = site_context(&root);

        let to = root.join("_site/assets");
        CopyStep::new("all".into(), "All".into(), root.join("."), to.clone(), true)
            .run(&mut ctx)
            .unwrap();

        assert_eq!(std::fs::read_to_string(to.join("index.html")).unwrap(), "<h1/>");
        assert!(!to.join("old.css").exists());
        assert!(!to.join("_site/assets").exists());
        assert!(!to.join("assets").exists());
    }
}
