use std::collections::HashMap;

use apm_core::{
    satisfies, CoreProgram, CoreVersions, InstallationStatus, OrGroup, PackageDescriptor,
    QualifiedId,
};
use tracing::debug;

use crate::core_binding::CoreVersionBinding;

/// Answers installed/installable queries over a fully classified catalog.
///
/// Installability is the least fixed point over the dependency graph,
/// computed once at construction by propagating from entries whose groups are
/// already satisfied. An entry reachable only through a dependency cycle never
/// becomes installable; one whose cycle has an outside way in does. Each
/// reference is visited a bounded number of times, so the cost is linear in
/// the catalog's references and independent of query order.
#[derive(Debug)]
pub struct DependencyResolver<'a> {
    order: Vec<&'a str>,
    packages: HashMap<&'a str, (&'a PackageDescriptor, &'a InstallationStatus)>,
    core: CoreVersionBinding<'a>,
    installable: HashMap<&'a str, bool>,
}

impl<'a> DependencyResolver<'a> {
    pub fn new<I>(entries: I, core_versions: &'a CoreVersions) -> Self
    where
        I: IntoIterator<Item = (&'a PackageDescriptor, &'a InstallationStatus)>,
    {
        let mut order = Vec::new();
        let mut packages = HashMap::new();
        for (descriptor, status) in entries {
            if packages
                .insert(descriptor.id.as_str(), (descriptor, status))
                .is_none()
            {
                order.push(descriptor.id.as_str());
            }
        }

        let mut resolver = Self {
            order,
            packages,
            core: CoreVersionBinding::new(core_versions),
            installable: HashMap::new(),
        };
        resolver.installable = resolver.propagate_installability();
        resolver
    }

    pub fn status(&self, id: &str) -> Option<&'a InstallationStatus> {
        self.packages.get(id).map(|(_, status)| *status)
    }

    pub fn descriptor(&self, id: &str) -> Option<&'a PackageDescriptor> {
        self.packages.get(id).map(|(descriptor, _)| *descriptor)
    }

    /// Whether `reference` is present and usable right now.
    pub fn is_installed(&self, reference: &QualifiedId) -> bool {
        match reference {
            QualifiedId::Core { program, version } => self.core.is_satisfied(*program, version),
            QualifiedId::Catalog { id, constraint } => {
                let Some(status) = self.status(id) else {
                    return false;
                };
                if !status.is_usable() {
                    return false;
                }
                match constraint {
                    None => true,
                    Some(constraint) => status
                        .version()
                        .is_some_and(|installed| {
                            satisfies(installed, constraint.op, &constraint.version)
                        }),
                }
            }
        }
    }

    /// Whether `id` could be installed now: each dependency group has an
    /// installable member and nothing conflicts. Catalog ids are looked up
    /// as given; other `"aviutl1.10"`-style ids are treated as core references.
    pub fn is_installable(&self, id: &str) -> bool {
        if let Some(installable) = self.installable.get(id) {
            return *installable;
        }
        match CoreProgram::parse_reference(id) {
            Some((program, version)) => self.core.is_satisfied(program, version),
            None => false,
        }
    }

    /// Like [`Self::is_installable`] for an already parsed reference. Version
    /// constraints on catalog references do not affect installability.
    pub fn is_reference_installable(&self, reference: &QualifiedId) -> bool {
        match reference {
            QualifiedId::Core { program, version } => self.core.is_satisfied(*program, version),
            QualifiedId::Catalog { id, .. } => {
                self.installable.get(id.as_str()).copied().unwrap_or(false)
            }
        }
    }

    /// For an installed entry, one installable member of every dependency
    /// group that has no installed member. Empty for entries that are not
    /// installed.
    pub fn missing_dependencies(&self, id: &str) -> Vec<QualifiedId> {
        let Some(descriptor) = self.descriptor(id) else {
            return Vec::new();
        };
        if !self.is_installed(&QualifiedId::catalog(id)) {
            return Vec::new();
        }

        let mut missing = Vec::new();
        for group in &descriptor.dependencies {
            if self.group_installed(group) {
                continue;
            }
            let candidate = group
                .members()
                .iter()
                .find(|member| self.is_reference_installable(member));
            if let Some(member) = candidate {
                missing.push(member.clone());
            }
        }
        missing
    }

    /// Installed packages that would lose their only installed member of a
    /// dependency group if `id` were removed.
    pub fn blocking_dependents(&self, id: &str) -> Vec<String> {
        self.order
            .iter()
            .filter(|other| **other != id)
            .filter(|other| self.is_installed(&QualifiedId::catalog(**other)))
            .filter(|other| {
                self.descriptor(other).is_some_and(|descriptor| {
                    descriptor
                        .dependencies
                        .iter()
                        .any(|group| self.group_relies_only_on(group, id))
                })
            })
            .map(|other| other.to_string())
            .collect()
    }

    fn group_installed(&self, group: &OrGroup) -> bool {
        group.members().iter().any(|member| self.is_installed(member))
    }

    fn group_relies_only_on(&self, group: &OrGroup, id: &str) -> bool {
        let mut installed = group
            .members()
            .iter()
            .filter(|member| self.is_installed(member));
        let Some(first) = installed.next() else {
            return false;
        };
        first.catalog_id() == Some(id)
            && installed.all(|member| member.catalog_id() == Some(id))
    }

    /// Worklist propagation: every entry starts uninstallable with a count of
    /// unsatisfied groups. A group is settled the first time one of its
    /// members becomes installable; an entry whose count reaches zero and
    /// that is not conflicted becomes installable and wakes its dependents.
    fn propagate_installability(&self) -> HashMap<&'a str, bool> {
        let mut installable: HashMap<&'a str, bool> =
            self.order.iter().map(|id| (*id, false)).collect();
        let mut pending: HashMap<&'a str, usize> = HashMap::new();
        let mut settled: HashMap<(&'a str, usize), bool> = HashMap::new();
        let mut dependents: HashMap<&'a str, Vec<(&'a str, usize)>> = HashMap::new();
        let mut ready = Vec::new();

        for id in &self.order {
            let (descriptor, status) = self.packages[id];
            if self.is_conflicted(descriptor, status) {
                continue;
            }

            let mut unsatisfied = 0;
            for (index, group) in descriptor.dependencies.iter().enumerate() {
                let core_satisfied = group.members().iter().any(|member| match member {
                    QualifiedId::Core { program, version } => {
                        self.core.is_satisfied(*program, version)
                    }
                    QualifiedId::Catalog { .. } => false,
                });
                if core_satisfied {
                    continue;
                }

                unsatisfied += 1;
                settled.insert((*id, index), false);
                for member in group.members() {
                    let Some(member_id) = member.catalog_id() else {
                        continue;
                    };
                    match self.packages.get_key_value(member_id) {
                        Some((key, _)) => {
                            dependents.entry(*key).or_default().push((*id, index));
                        }
                        None => {
                            debug!(id = *id, reference = %member, "reference to unknown package");
                        }
                    }
                }
            }

            if unsatisfied == 0 {
                ready.push(*id);
            } else {
                pending.insert(*id, unsatisfied);
            }
        }

        while let Some(id) = ready.pop() {
            installable.insert(id, true);
            let Some(waiting) = dependents.get(id) else {
                continue;
            };
            for &(dependent, index) in waiting {
                let Some(group_settled) = settled.get_mut(&(dependent, index)) else {
                    continue;
                };
                if *group_settled {
                    continue;
                }
                *group_settled = true;
                if let Some(count) = pending.get_mut(dependent) {
                    *count -= 1;
                    if *count == 0 {
                        pending.remove(dependent);
                        ready.push(dependent);
                    }
                }
            }
        }

        for (id, unsatisfied) in &pending {
            debug!(id = *id, unsatisfied, "dependency groups left unsatisfied");
        }
        installable
    }

    fn is_conflicted(&self, descriptor: &PackageDescriptor, status: &InstallationStatus) -> bool {
        if *status == InstallationStatus::OtherInstalled {
            return true;
        }
        descriptor.conflicts.iter().any(|group| {
            !group.members().is_empty()
                && group.members().iter().all(|member| self.is_installed(member))
        })
    }
}
