use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use crate::{
    WatchArgs,
    build::{AutoBuilder, FileWatcher, Pipeline, SiteContext, WatchRegistry, WatchSummary},
    util::{format_elapsed, plural},
};

pub async fn run(args: &WatchArgs) -> Result<(), anyhow::Error> {
    let mut site = super::load_site(args.config_file.as_deref()).await?;
    if args.poll {
        site.config.dev.watch.poll = true;
    }
    let skip_initial_build = args.skip_initial_build;

    let stop = Arc::new(AtomicBool::new(false));
    let interrupted = stop.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Stopping watcher...");
                interrupted.store(true, Ordering::Release);
            }
            Err(e) => warn!("Failed to listen for Ctrl+C: {}", e),
        }
    });

    // The whole session runs on one blocking thread: build, then wait for
    // changes and rebuild until Ctrl+C is pressed.
    let summary = tokio::task::spawn_blocking(move || -> Result<WatchSummary, anyhow::Error> {
        let pipeline = Pipeline::from_site(&site);
        debug!("steps: {}", pipeline.names().join(", "));
        let mut context = SiteContext::init(&site)?;

        if skip_initial_build {
            info!("Skipping initial build");
        } else {
            info!("Building {}...", site.config.site.name);
            let report = pipeline.build_all(&mut context)?;
            info!(
                "Built {} in {}",
                plural(report.steps, "step"),
                format_elapsed(report.elapsed)
            );
        }

        let registry = WatchRegistry::from_site(&site, &pipeline)?;
        let watcher = FileWatcher::new(
            &site.config.dev.watch,
            registry.registrations(),
            &site.output_dir,
        )?;
        info!("Watching for changes, press Ctrl+C to stop");

        let mut auto = AutoBuilder::new(pipeline, registry, context);
        Ok(auto.run(watcher.events_until(&stop)))
    })
    .await??;

    info!(
        "Watcher stopped after {} ({} run, {} failed)",
        plural(summary.batches, "rebuild"),
        plural(summary.steps_run, "step"),
        summary.failures
    );

    Ok(())
}
