use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory layout of one AviUtl installation. Catalog file names are
/// `/`-separated and relative to [`InstallLayout::root`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    root: PathBuf,
}

impl InstallLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn plugins_dir(&self) -> PathBuf {
        self.root.join("plugins")
    }

    pub fn script_dir(&self) -> PathBuf {
        self.root.join("script")
    }

    pub fn state_dir(&self) -> PathBuf {
        self.root.join(".apm")
    }

    pub fn record_path(&self) -> PathBuf {
        self.state_dir().join("installed.json")
    }

    pub fn resolve(&self, filename: &str) -> PathBuf {
        filename
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.root.clone(), |path, segment| path.join(segment))
    }

    pub fn exists(&self, filename: &str) -> bool {
        self.resolve(filename).exists()
    }

    pub fn ensure_state_dir(&self) -> Result<()> {
        let dir = self.state_dir();
        fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))
    }
}
