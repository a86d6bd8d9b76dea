use std::collections::{BTreeMap, HashSet};

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

use crate::qualified_id::{AndGroup, OrGroup, QualifiedId};
use crate::release::ReleaseInfo;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub filename: String,
    #[serde(default)]
    pub is_optional: bool,
    #[serde(default)]
    pub is_directory: bool,
    /// Shipped only for another package's benefit; never counted toward this
    /// entry's broken-install check and never claims a file.
    #[serde(default)]
    pub is_install_only: bool,
    /// No longer shipped. An entry with any obsolete file skips the
    /// broken-install check once it has a record.
    #[serde(default)]
    pub is_obsolete: bool,
    pub archive_path: Option<String>,
}

impl FileEntry {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Self::default()
        }
    }

    /// Whether this entry accounts for `path`: the same filename, or a path
    /// inside it for directory entries.
    pub fn claims(&self, path: &str) -> bool {
        if self.filename == path {
            return true;
        }
        if !self.is_directory {
            return false;
        }
        let dir = self.filename.trim_end_matches('/');
        path.strip_prefix(dir)
            .is_some_and(|rest| rest.starts_with('/'))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PackageDescriptor {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub latest_version: String,
    #[serde(default)]
    pub files: Vec<FileEntry>,
    #[serde(default)]
    pub dependencies: Vec<OrGroup>,
    #[serde(default)]
    pub conflicts: Vec<AndGroup>,
    #[serde(default)]
    pub releases: BTreeMap<String, ReleaseInfo>,
}

impl PackageDescriptor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Files that count toward this entry's own installation state.
    pub fn owned_files(&self) -> impl Iterator<Item = &FileEntry> {
        self.files.iter().filter(|file| !file.is_install_only)
    }

    pub fn has_obsolete_files(&self) -> bool {
        self.files.iter().any(|file| file.is_obsolete)
    }

    pub fn claims(&self, path: &str) -> bool {
        self.owned_files().any(|file| file.claims(path))
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.id.trim().is_empty() {
            return Err(anyhow!("package id must not be empty"));
        }
        for file in &self.files {
            if file.filename.trim().is_empty() {
                return Err(anyhow!(
                    "package '{}' declares a file with an empty filename",
                    self.id
                ));
            }
        }
        let conflicts_with_itself = self.conflicts.iter().any(|group| {
            matches!(group.members(), [QualifiedId::Catalog { id, .. }] if id == &self.id)
        });
        if conflicts_with_itself {
            return Err(anyhow!("package '{}' conflicts with itself", self.id));
        }
        Ok(())
    }

    fn rename_references(&mut self, from: &str, to: &str) -> usize {
        let mut renamed = 0;
        if self.id == from {
            self.id = to.to_string();
            renamed += 1;
        }
        let members = self
            .dependencies
            .iter_mut()
            .flat_map(|group| group.0.iter_mut())
            .chain(self.conflicts.iter_mut().flat_map(|group| group.0.iter_mut()));
        for member in members {
            if member.rename(from, to) {
                renamed += 1;
            }
        }
        renamed
    }
}

/// An ordered, validated list of package descriptors.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Catalog {
    pub packages: Vec<PackageDescriptor>,
}

impl Catalog {
    pub fn new(packages: Vec<PackageDescriptor>) -> anyhow::Result<Self> {
        let catalog = Self { packages };
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_json_str(input: &str) -> anyhow::Result<Self> {
        let catalog: Self = serde_json::from_str(input).context("failed to parse package catalog")?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn get(&self, id: &str) -> Option<&PackageDescriptor> {
        self.packages.iter().find(|package| package.id == id)
    }

    /// Rewrites renamed package ids, including references held by other
    /// packages. Returns the number of rewritten ids.
    pub fn apply_id_conversions(&mut self, conversions: &BTreeMap<String, String>) -> usize {
        let mut renamed = 0;
        for (from, to) in conversions {
            for package in &mut self.packages {
                renamed += package.rename_references(from, to);
            }
        }
        if renamed > 0 {
            tracing::debug!(renamed, "applied legacy id conversions to catalog");
        }
        renamed
    }

    fn validate(&self) -> anyhow::Result<()> {
        let mut seen = HashSet::new();
        for package in &self.packages {
            package
                .validate()
                .with_context(|| format!("invalid catalog entry '{}'", package.id))?;
            if !seen.insert(package.id.as_str()) {
                return Err(anyhow!("duplicate package id '{}' in catalog", package.id));
            }
        }
        Ok(())
    }
}
