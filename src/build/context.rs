//! Shared site context.
//!
//! The context is what every build step gets to see about the site: where
//! things live and which files each configured collection currently holds.
//! Collections are rescanned by the `refresh-context` builtin step, so a
//! step that lists guides sees new guides without restarting the watcher.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ResolvedSite;

#[derive(thiserror::Error, Debug)]
pub enum ContextError {
    #[error("failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read directory entry in {path}: {source}")]
    ReadEntry {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Collection name -> absolute collection directory.
type CollectionDirs = BTreeMap<String, PathBuf>;

#[derive(Debug, Clone, Serialize)]
pub struct SiteContext {
    pub name: String,
    pub root: PathBuf,
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Collection name -> files in the collection, relative to its directory.
    pub collections: BTreeMap<String, Vec<PathBuf>>,
    #[serde(skip)]
    collection_dirs: CollectionDirs,
}

impl SiteContext {
    /// Build the context for a site and scan its collections.
    pub fn init(site: &ResolvedSite) -> Result<Self, ContextError> {
        let collection_dirs = site
            .config
            .context
            .collections
            .iter()
            .map(|(name, dir)| (name.clone(), site.source_path(dir)))
            .collect();

        let mut context = Self {
            name: site.config.site.name.clone(),
            root: site.root.clone(),
            source_dir: site.source_dir.clone(),
            output_dir: site.output_dir.clone(),
            collections: BTreeMap::new(),
            collection_dirs,
        };
        context.refresh()?;
        Ok(context)
    }

    /// Rescan every collection directory.
    pub fn refresh(&mut self) -> Result<(), ContextError> {
        let mut collections = BTreeMap::new();

        for (name, dir) in &self.collection_dirs {
            let files = if dir.is_dir() {
                let mut files = Vec::new();
                collect_files(dir, Path::new(""), &mut files)?;
                files.sort();
                files
            } else {
                warn!(
                    "collection '{}' directory does not exist: {}",
                    name,
                    dir.display()
                );
                Vec::new()
            };
            debug!("collection '{}': {} file(s)", name, files.len());
            collections.insert(name.clone(), files);
        }

        self.collections = collections;
        Ok(())
    }

    /// Files in a collection, if it exists.
    #[cfg(test)]
    pub fn collection(&self, name: &str) -> Option<&[PathBuf]> {
        self.collections.get(name).map(Vec::as_slice)
    }

    /// The context as JSON, for handing to external build commands.
    pub fn to_json(&self) -> String {
        // Only non UTF-8 paths fail to serialize
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Recursively collect non-hidden files below `dir`.
fn collect_files(
    dir: &Path,
    relative_path: &Path,
    files: &mut Vec<PathBuf>,
) -> Result<(), ContextError> {
    let entries = std::fs::read_dir(dir).map_err(|e| ContextError::ReadDir {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ContextError::ReadEntry {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let path = entry.path();
        let file_name = entry.file_name();

        // Skip hidden files and directories
        if file_name.to_string_lossy().starts_with('.') {
            continue;
        }

        let item_relative_path = relative_path.join(&file_name);

        if path.is_dir() {
            collect_files(&path, &item_relative_path, files)?;
        } else if path.is_file() {
            files.push(item_relative_path);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use pretty_assertions::assert_eq;

    fn site(root: &Path, collections: &[(&str, &str)]) -> ResolvedSite {
        let mut yaml = String::from(
            "site:\n  name: Test\n  source: web-src\nsteps:\n  - name: context\n    builtin: refresh-context\ncontext:\n  collections:\n",
        );
        for (name, dir) in collections {
            yaml.push_str(&format!("    {name}: {dir}\n"));
        }
        let config: Config = serde_yaml::from_str(&yaml).unwrap();
        config.resolve(&root.join("sitewatch.yaml")).unwrap()
    }

    #[test]
    fn test_init_scans_collections() {
        let dir = tempfile::tempdir().unwrap();
        let guides = dir.path().join("web-src/guides");
        std::fs::create_dir_all(guides.join("server")).unwrap();
        std::fs::write(guides.join("getting-started.adoc"), "").unwrap();
        std::fs::write(guides.join("server/admin.adoc"), "").unwrap();
        std::fs::write(guides.join(".draft.adoc"), "").unwrap();

        let context = SiteContext::init(&site(dir.path(), &[("guides", "guides")])).unwrap();

        assert_eq!(context.name, "Test");
        assert_eq!(context.source_dir, dir.path().join("web-src"));
        assert_eq!(
            context.collection("guides").unwrap(),
            &[
                PathBuf::from("getting-started.adoc"),
                PathBuf::from("server/admin.adoc"),
            ]
        );
    }

    #[test]
    fn test_missing_collection_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let context = SiteContext::init(&site(dir.path(), &[("blog", "blog")])).unwrap();
        assert_eq!(context.collection("blog").unwrap().len(), 0);
        assert!(context.collection("guides").is_none());
    }

    #[test]
    fn test_refresh_picks_up_new_files() {
        let dir = tempfile::tempdir().unwrap();
        let guides = dir.path().join("web-src/guides");
        std::fs::create_dir_all(&guides).unwrap();

        let mut context = SiteContext::init(&site(dir.path(), &[("guides", "guides")])).unwrap();
        assert_eq!(context.collection("guides").unwrap().len(), 0);

        std::fs::write(guides.join("new.adoc"), "").unwrap();
        context.refresh().unwrap();
        assert_eq!(
            context.collection("guides").unwrap(),
            &[PathBuf::from("new.adoc")]
        );
    }

    #[test]
    fn test_to_json() {
        let dir = tempfile::tempdir().unwrap();
        let context = SiteContext::init(&site(dir.path(), &[("guides", "guides")])).unwrap();

        let json: serde_json::Value = serde_json::from_str(&context.to_json()).unwrap();
        assert_eq!(json["name"], "Test");
        assert!(json["collections"]["guides"].as_array().unwrap().is_empty());
        assert!(json.get("collection_dirs").is_none());
    }
}
