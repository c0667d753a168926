use tracing::info;

use crate::{
    BuildArgs,
    build::{Pipeline, SiteContext},
    util::{format_elapsed, plural},
};

pub async fn run(args: &BuildArgs) -> Result<(), anyhow::Error> {
    let site = super::load_site(args.config_file.as_deref()).await?;

    info!(
        "Building {} from {}",
        site.config.site.name,
        site.source_dir.display()
    );

    // Steps block on child processes and file copies
    let output_dir = site.output_dir.clone();
    let report = tokio::task::spawn_blocking(move || -> Result<_, anyhow::Error> {
        let pipeline = Pipeline::from_site(&site);
        let mut context = SiteContext::init(&site)?;
        Ok(pipeline.build_all(&mut context)?)
    })
    .await??;

    info!(
        "Built site to {} ({} in {})",
        output_dir.display(),
        plural(report.steps, "step"),
        format_elapsed(report.elapsed)
    );

    Ok(())
}
