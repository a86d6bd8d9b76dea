use std::collections::BTreeSet;

use apm_core::{CoreProgram, CoreVersions, PackageDescriptor, QualifiedId};

/// Resolves `"aviutl1.10"`-style references against the recorded core
/// program versions. Only exact matches count.
#[derive(Debug, Clone, Copy)]
pub struct CoreVersionBinding<'a> {
    versions: &'a CoreVersions,
}

impl<'a> CoreVersionBinding<'a> {
    pub fn new(versions: &'a CoreVersions) -> Self {
        Self { versions }
    }

    pub fn is_satisfied(&self, program: CoreProgram, version: &str) -> bool {
        self.versions.get(program) == Some(version)
    }

    /// The installed core version of `program`, as `"aviutl1.10"`.
    pub fn current_id(&self, program: CoreProgram) -> Option<String> {
        self.versions
            .get(program)
            .map(|version| format!("{program}{version}"))
    }

    /// Every core version referenced by the catalog's dependencies and
    /// conflicts.
    pub fn required_versions(catalog: &[PackageDescriptor]) -> BTreeSet<(CoreProgram, String)> {
        let dependencies = catalog
            .iter()
            .flat_map(|package| package.dependencies.iter().flat_map(|g| g.members()));
        let conflicts = catalog
            .iter()
            .flat_map(|package| package.conflicts.iter().flat_map(|g| g.members()));

        dependencies
            .chain(conflicts)
            .filter_map(|reference| match reference {
                QualifiedId::Core { program, version } => Some((*program, version.clone())),
                QualifiedId::Catalog { .. } => None,
            })
            .collect()
    }
}
