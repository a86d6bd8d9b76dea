use anyhow::{Context, Result};
use apm_core::{compare_versions, FileIntegrity, IntegrityAlgorithm, PackageDescriptor};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;

use crate::InstallLayout;

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

pub fn sha256_hex_reader<R: Read>(reader: &mut R) -> Result<String> {
    let mut hasher = Sha256::new();
    io::copy(reader, &mut hasher).context("failed to read input for sha256")?;
    Ok(hex::encode(hasher.finalize()))
}

pub fn sha256_hex_file(path: &Path) -> Result<String> {
    let mut file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    sha256_hex_reader(&mut file).with_context(|| format!("failed to hash {}", path.display()))
}

/// Whether the file named by `integrity` exists under the root and matches
/// its recorded digest.
pub fn verify_file_integrity(layout: &InstallLayout, integrity: &FileIntegrity) -> Result<bool> {
    let (algorithm, expected) = integrity.digest()?;
    let path = layout.resolve(&integrity.target);
    if !path.is_file() {
        return Ok(false);
    }
    let actual = match algorithm {
        IntegrityAlgorithm::Sha256 => sha256_hex_file(&path)?,
    };
    Ok(actual == expected)
}

/// The newest release of `descriptor` whose listed files are all present and
/// match their hashes. Releases without file hashes are never reported.
pub fn detect_installed_release(
    layout: &InstallLayout,
    descriptor: &PackageDescriptor,
) -> Result<Option<String>> {
    let mut newest: Option<&str> = None;
    for (version, release) in &descriptor.releases {
        let files = &release.integrity.files;
        if files.is_empty() {
            continue;
        }
        if newest.is_some_and(|current| compare_versions(version, current).is_le()) {
            continue;
        }

        let mut matched = true;
        for integrity in files {
            let verified = verify_file_integrity(layout, integrity).with_context(|| {
                format!("failed to verify {} release {version}", descriptor.id)
            })?;
            if !verified {
                matched = false;
                break;
            }
        }
        if matched {
            newest = Some(version);
        }
    }

    if let Some(version) = newest {
        debug!(id = %descriptor.id, version, "release recognized by file hashes");
    }
    Ok(newest.map(str::to_string))
}
