//! Filesystem template lookup.

use std::path::{Component, Path, PathBuf};

use crate::config::TemplateConfig;
use crate::dispatch::TemplateLocator;

/// Looks templates up across an ordered list of directories.
#[derive(Debug, Clone)]
pub struct FsTemplateLocator {
    search_paths: Vec<PathBuf>,
    not_found: String,
}

impl FsTemplateLocator {
    pub fn new(config: &TemplateConfig) -> Self {
        Self {
            search_paths: config.search_paths.clone(),
            not_found: config.not_found.clone(),
        }
    }
}

impl TemplateLocator for FsTemplateLocator {
    fn locate(&self, name: &str) -> Option<PathBuf> {
        let relative = Path::new(name);
        // Only plain relative names; no escaping the template directories.
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            tracing::warn!(template = %name, "Refusing template name outside search paths");
            return None;
        }

        self.search_paths
            .iter()
            .map(|dir| dir.join(relative))
            .find(|candidate| candidate.is_file())
    }

    fn not_found(&self) -> PathBuf {
        self.locate(&self.not_found).unwrap_or_else(|| {
            self.search_paths
                .first()
                .map(|dir| dir.join(&self.not_found))
                .unwrap_or_else(|| PathBuf::from(&self.not_found))
        })
    }
}
