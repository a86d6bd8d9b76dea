use std::collections::BTreeSet;

use apm_core::{compare_versions, InstallationStatus, PackageDescriptor};
use serde::Serialize;

/// A catalog entry annotated by one evaluation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPackage {
    #[serde(flatten)]
    pub descriptor: PackageDescriptor,
    pub installation_status: InstallationStatus,
    pub do_not_install: bool,
    /// Missing but installable direct dependencies of an installed entry.
    pub detached: Vec<ResolvedPackage>,
}

impl ResolvedPackage {
    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    pub fn version(&self) -> Option<&str> {
        self.installation_status.version()
    }

    pub fn update_available(&self) -> bool {
        let Some(installed) = self.version() else {
            return false;
        };
        !self.descriptor.latest_version.is_empty()
            && compare_versions(installed, &self.descriptor.latest_version).is_lt()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub packages: Vec<ResolvedPackage>,
    pub manually_installed_files: BTreeSet<String>,
}

impl Evaluation {
    pub fn get(&self, id: &str) -> Option<&ResolvedPackage> {
        self.packages.iter().find(|package| package.id() == id)
    }
}
