use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::info;

use crate::{
    InitArgs,
    config::{
        BuiltinStep, CommandSpec, Config, ContextConfig, CopySpec, DEFAULT_CONFIG_FILE, DevConfig,
        SiteConfig, StepAction, StepConfig, WatchEntry,
    },
};

pub async fn run(args: &InitArgs) -> Result<(), anyhow::Error> {
    let path = if args.path.is_relative() {
        std::env::current_dir()?.join(&args.path)
    } else {
        args.path.clone()
    };

    if !path.exists() {
        if args.create {
            tokio::fs::create_dir_all(&path).await?;
            info!("Created directory {path}", path = path.display());
        } else {
            return Err(anyhow::anyhow!(
                "Directory does not exist: {path}",
                path = path.display()
            ));
        }
    }

    let config_file = path.join(DEFAULT_CONFIG_FILE);
    if config_file.exists() && !args.force {
        return Err(anyhow::anyhow!(
            "{config_file} already exists (use --force to overwrite)",
            config_file = config_file.display()
        ));
    }

    info!("Initializing project in {}", path.display());

    let config_text = serde_yaml::to_string(&starter_config())?;
    tokio::fs::write(&config_file, config_text).await?;

    info!(
        "Created config file {config_file}",
        config_file = config_file.display()
    );

    Ok(())
}

/// A config for the usual layout: pages, resources, guides and templates
/// under `web-src`, with guides feeding the site context.
fn starter_config() -> Config {
    let step = |name: &str, title: &str, action: StepAction| StepConfig {
        name: name.into(),
        title: Some(title.into()),
        action,
    };
    let placeholder = |what: &str| StepAction::Command {
        command: CommandSpec::Shell(format!("echo 'Replace with the {what} builder'")),
    };
    let watch = |path: &str, steps: &[&str]| WatchEntry {
        path: path.into(),
        recursive: true,
        steps: steps.iter().map(|s| s.to_string()).collect(),
    };

    Config {
        site: SiteConfig {
            name: "My Site".into(),
            source: "web-src".into(),
            output: "_site".into(),
        },
        steps: vec![
            step(
                "context",
                "Update context",
                StepAction::Builtin {
                    builtin: BuiltinStep::RefreshContext,
                },
            ),
            step(
                "resources",
                "Resources",
                StepAction::Copy {
                    copy: CopySpec {
                        from: "resources".into(),
                        to: "resources".into(),
                        clean: true,
                    },
                },
            ),
            step("guides", "Guides", placeholder("guides")),
            step("pages", "Pages", placeholder("pages")),
        ],
        watch: vec![
            watch("pages", &["pages"]),
            watch("resources", &["resources"]),
            watch("guides", &["context", "guides", "pages"]),
            watch("templates", &["guides", "pages"]),
        ],
        context: ContextConfig {
            collections: BTreeMap::from([("guides".to_string(), PathBuf::from("guides"))]),
        },
        dev: DevConfig::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn args(path: &Path, create: bool, force: bool) -> InitArgs {
        InitArgs {
            path: path.to_path_buf(),
            create,
            force,
        }
    }

    #[tokio::test]
    async fn test_init_writes_loadable_config() {
        let dir = tempfile::tempdir().unwrap();
        run(&args(dir.path(), false, false)).await.unwrap();

        let config_path = dir.path().join(DEFAULT_CONFIG_FILE);
        let site = Config::load_from_file(&config_path)
            .await
            .unwrap()
            .resolve(&config_path)
            .unwrap();

        assert_eq!(site.config.site.name, "My Site");
        assert_eq!(site.config.steps.len(), 4);
        assert_eq!(site.config.watch.len(), 4);
        assert_eq!(site.source_dir, dir.path().join("web-src"));
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "keep me").unwrap();

        let err = run(&args(dir.path(), false, false)).await.unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(
            std::fs::read_to_string(dir.path().join(DEFAULT_CONFIG_FILE)).unwrap(),
            "keep me"
        );

        run(&args(dir.path(), false, true)).await.unwrap();
    }

    #[tokio::test]
    async fn test_init_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("new-site");

        assert!(run(&args(&target, false, false)).await.is_err());
        run(&args(&target, true, false)).await.unwrap();
        assert!(target.join(DEFAULT_CONFIG_FILE).exists());
    }
}
