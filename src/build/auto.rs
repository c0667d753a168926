//! The auto-builder: turns watch events into step runs.
//!
//! Runs on a single thread. Each batch of changes selects its steps through
//! the registry and runs them one after another. A failing step is logged
//! and the remaining steps of the batch still run; the loop itself never
//! stops because of a build failure.

use tracing::{debug, error, info, warn};

use crate::util::plural;

use super::context::SiteContext;
use super::pipeline::{BuildError, Pipeline};
use super::registry::WatchRegistry;
use super::watch::WatchEvent;

/// Counters for a finished (or interrupted) watch session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WatchSummary {
    /// Change batches that triggered at least one step.
    pub batches: usize,
    /// Steps run, including failed ones.
    pub steps_run: usize,
    /// Steps that failed.
    pub failures: usize,
}

pub struct AutoBuilder {
    pipeline: Pipeline,
    registry: WatchRegistry,
    context: SiteContext,
    summary: WatchSummary,
}

impl AutoBuilder {
    pub fn new(pipeline: Pipeline, registry: WatchRegistry, context: SiteContext) -> Self {
        Self {
            pipeline,
            registry,
            context,
            summary: WatchSummary::default(),
        }
    }

    /// Handle events until the source runs dry.
    ///
    /// With a live [`FileWatcher`](super::FileWatcher) this returns once the
    /// watcher shuts down or its stop flag is set.
    pub fn run<I>(&mut self, events: I) -> WatchSummary
    where
        I: IntoIterator<Item = WatchEvent>,
    {
        for event in events {
            self.handle(event);
        }
        self.summary
    }

    /// Handle a single watch event.
    pub fn handle(&mut self, event: WatchEvent) {
        match event {
            WatchEvent::Changed(paths) => self.rebuild(&paths),
            WatchEvent::Error(e) => warn!("Watch error: {}", e),
        }
    }

    fn rebuild(&mut self, paths: &[std::path::PathBuf]) {
        let steps = self.registry.steps_for(paths);
        if steps.is_empty() {
            debug!(
                "ignoring {} outside any watch registration",
                plural(paths.len(), "change")
            );
            return;
        }

        for path in paths {
            debug!("changed: {}", path.display());
        }
        let names: Vec<&str> = steps
            .iter()
            .filter_map(|&index| self.pipeline.name_of(index))
            .collect();
        info!(
            "Detected {}, running: {}",
            plural(paths.len(), "change"),
            names.join(", ")
        );

        self.summary.batches += 1;
        for index in steps {
            self.summary.steps_run += 1;
            if let Err(BuildError::Step { step, source }) =
                self.pipeline.execute(index, &mut self.context)
            {
                self.summary.failures += 1;
                error!("Failed to run {}: {}", step, source);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::test_support::{Recorder, RecordingStep, site_context};
    use pretty_assertions::assert_eq;
    use std::path::{Path, PathBuf};

    /// context(0), guides(1), pages(2); guides/ triggers all three,
    /// pages/ only pages.
    fn auto_builder(root: &Path, recorder: &Recorder, fail: &str) -> AutoBuilder {
        let mut pipeline = Pipeline::new();
        for name in ["context", "guides", "pages"] {
            if name == fail {
                pipeline.add_step(RecordingStep::failing(name, recorder));
            } else {
                pipeline.add_step(RecordingStep::ok(name, recorder));
            }
        }

        let mut registry = WatchRegistry::new();
        registry.register(PathBuf::from("/nonexistent/site/guides"), true, vec![0, 1, 2]);
        registry.register(PathBuf::from("/nonexistent/site/pages"), true, vec![2]);

        AutoBuilder::new(pipeline, registry, site_context(root))
    }

    fn changed(path: &str) -> WatchEvent {
        WatchEvent::Changed(vec![PathBuf::from(path)])
    }

    #[test]
    fn test_dispatches_registered_steps() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = Recorder::default();
        let mut auto = auto_builder(dir.path(), &recorder, "");

        let summary = auto.run([
            changed("/nonexistent/site/pages/index.html"),
            changed("/nonexistent/site/guides/intro.adoc"),
        ]);

        assert_eq!(
            recorder.calls(),
            vec!["pages", "context", "guides", "pages"]
        );
        assert_eq!(
            summary,
            WatchSummary {
                batches: 2,
                steps_run: 4,
                failures: 0
            }
        );
    }

    #[test]
    fn test_failure_does_not_stop_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = Recorder::default();
        let mut auto = auto_builder(dir.path(), &recorder, "guides");

        let summary = auto.run([
            changed("/nonexistent/site/guides/intro.adoc"),
            changed("/nonexistent/site/pages/index.html"),
        ]);

        assert_eq!(
            recorder.calls(),
            vec!["context", "guides", "pages", "pages"]
        );
        assert_eq!(summary.failures, 1);
        assert_eq!(summary.steps_run, 4);
    }

    #[test]
    fn test_unmatched_and_error_events_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = Recorder::default();
        let mut auto = auto_builder(dir.path(), &recorder, "");

        let summary = auto.run([
            changed("/nonexistent/elsewhere/notes.txt"),
            WatchEvent::Error("inotify queue overflow".to_string()),
        ]);

        assert!(recorder.calls().is_empty());
        assert_eq!(summary, WatchSummary::default());
    }

    #[test]
    fn test_batch_runs_each_step_once() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = Recorder::default();
        let mut auto = auto_builder(dir.path(), &recorder, "");

        auto.handle(WatchEvent::Changed(vec![
            PathBuf::from("/nonexistent/site/pages/a.html"),
            PathBuf::from("/nonexistent/site/guides/b.adoc"),
            PathBuf::from("/nonexistent/site/pages/c.html"),
        ]));
        let summary = auto.run(Vec::<WatchEvent>::new());

        assert_eq!(recorder.calls(), vec!["context", "guides", "pages"]);
        assert_eq!(summary.batches, 1);
    }
}
