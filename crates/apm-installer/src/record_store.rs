use anyhow::{Context, Result};
use apm_core::InstalledRecord;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads the installed record. A missing file is an empty record.
pub fn read_installed_record(path: &Path) -> Result<InstalledRecord> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no installed record; starting empty");
            return Ok(InstalledRecord::default());
        }
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read installed record: {}", path.display()))
        }
    };

    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse installed record: {}", path.display()))
}

pub fn write_installed_record(path: &Path, record: &InstalledRecord) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let mut payload =
        serde_json::to_string_pretty(record).context("failed to serialize installed record")?;
    payload.push('\n');
    fs::write(path, payload.as_bytes())
        .with_context(|| format!("failed to write installed record: {}", path.display()))?;
    Ok(path.to_path_buf())
}
