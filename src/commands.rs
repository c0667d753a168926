pub mod build;
pub mod init;
pub mod watch;

use std::path::Path;

use tracing::debug;

use crate::config::{Config, ResolvedSite};

/// Load and resolve the config named on the command line.
async fn load_site(config_file: Option<&Path>) -> Result<ResolvedSite, anyhow::Error> {
    let config_path = Config::path_from_arg(config_file)?;
    debug!("loading config from {}", config_path.display());

    let site = Config::load_from_file(&config_path)
        .await?
        .resolve(&config_path)?;
    Ok(site)
}
