use std::collections::BTreeSet;

use apm_core::{InstallationStatus, InstalledRecord, PackageDescriptor, QualifiedId};
use tracing::debug;

mod core_binding;
mod reconcile;
mod resolve;
mod types;

pub use core_binding::CoreVersionBinding;
pub use reconcile::{classify, manually_installed_files};
pub use resolve::DependencyResolver;
pub use types::{Evaluation, ResolvedPackage};

/// Runs one full evaluation pass: classifies every entry against the disk and
/// the installed record, then annotates installability and detached
/// dependencies. Output follows catalog order.
pub fn evaluate_packages<F>(
    catalog: &[PackageDescriptor],
    record: &InstalledRecord,
    installed_files: &BTreeSet<String>,
    fs_exists: F,
) -> Evaluation
where
    F: Fn(&str) -> bool,
{
    let manually_installed = manually_installed_files(installed_files, catalog, record);
    let statuses: Vec<InstallationStatus> = catalog
        .iter()
        .map(|entry| classify(entry, &fs_exists, installed_files, &manually_installed, record))
        .collect();

    let annotations: Vec<(bool, Vec<QualifiedId>)> = {
        let resolver = DependencyResolver::new(catalog.iter().zip(&statuses), &record.core);
        catalog
            .iter()
            .map(|entry| {
                (
                    !resolver.is_installable(&entry.id),
                    resolver.missing_dependencies(&entry.id),
                )
            })
            .collect()
    };

    let mut packages: Vec<ResolvedPackage> = catalog
        .iter()
        .zip(statuses)
        .zip(&annotations)
        .map(|((descriptor, installation_status), (do_not_install, _))| ResolvedPackage {
            descriptor: descriptor.clone(),
            installation_status,
            do_not_install: *do_not_install,
            detached: Vec::new(),
        })
        .collect();

    let detached: Vec<Vec<ResolvedPackage>> = annotations
        .iter()
        .map(|(_, missing)| {
            missing
                .iter()
                .filter_map(QualifiedId::catalog_id)
                .filter_map(|id| packages.iter().find(|package| package.id() == id))
                .cloned()
                .collect()
        })
        .collect();
    for (package, detached) in packages.iter_mut().zip(detached) {
        package.detached = detached;
    }

    debug!(
        packages = packages.len(),
        manually_installed = manually_installed.len(),
        "evaluated package states"
    );
    Evaluation {
        packages,
        manually_installed_files: manually_installed,
    }
}
