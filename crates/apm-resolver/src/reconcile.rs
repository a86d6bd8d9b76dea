use std::collections::BTreeSet;

use apm_core::{InstallationStatus, InstalledRecord, PackageDescriptor};
use tracing::trace;

/// Files on disk that no recorded package accounts for.
pub fn manually_installed_files(
    installed_files: &BTreeSet<String>,
    catalog: &[PackageDescriptor],
    record: &InstalledRecord,
) -> BTreeSet<String> {
    let recorded: Vec<&PackageDescriptor> = catalog
        .iter()
        .filter(|package| record.contains(&package.id))
        .collect();

    installed_files
        .iter()
        .filter(|path| !recorded.iter().any(|package| package.claims(path)))
        .cloned()
        .collect()
}

/// Raw installation status of one entry: a guess from disk contents first,
/// then overridden by the installed record when it knows the entry.
pub fn classify<F>(
    entry: &PackageDescriptor,
    fs_exists: F,
    installed_files: &BTreeSet<String>,
    manually_installed_files: &BTreeSet<String>,
    record: &InstalledRecord,
) -> InstallationStatus
where
    F: Fn(&str) -> bool,
{
    let status = match record.version_of(&entry.id) {
        Some(version) => {
            if entry.has_obsolete_files()
                || entry.owned_files().all(|file| fs_exists(&file.filename))
            {
                InstallationStatus::Installed(version.to_string())
            } else {
                InstallationStatus::InstalledButBroken
            }
        }
        None => guess_from_disk(entry, installed_files, manually_installed_files),
    };

    trace!(id = %entry.id, status = %status, "classified package");
    status
}

fn guess_from_disk(
    entry: &PackageDescriptor,
    installed_files: &BTreeSet<String>,
    manually_installed_files: &BTreeSet<String>,
) -> InstallationStatus {
    if any_claimed(entry, manually_installed_files) {
        InstallationStatus::ManuallyInstalled
    } else if any_claimed(entry, installed_files) {
        InstallationStatus::OtherInstalled
    } else {
        InstallationStatus::NotInstalled
    }
}

fn any_claimed(entry: &PackageDescriptor, files: &BTreeSet<String>) -> bool {
    entry.owned_files().any(|file| {
        if file.is_directory {
            files.iter().any(|path| file.claims(path))
        } else {
            files.contains(&file.filename)
        }
    })
}
