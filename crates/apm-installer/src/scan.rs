use anyhow::{bail, Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::InstallLayout;

pub const DEFAULT_TRACKED_EXTENSIONS: &[&str] = &[
    "auf", "aui", "auo", "auc", "aul", "anm", "obj", "cam", "tra", "scn",
];

pub const DEFAULT_EXCLUDED_FILES: &[&str] = &["exedit.auf"];

/// Which files count as installed plugin or script files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub tracked_extensions: Vec<String>,
    /// File names never reported, matched case-insensitively against the last
    /// path segment.
    pub excluded_files: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            tracked_extensions: DEFAULT_TRACKED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            excluded_files: DEFAULT_EXCLUDED_FILES
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }
}

impl ScanOptions {
    fn is_tracked(&self, file_name: &str) -> bool {
        let Some((_, extension)) = file_name.rsplit_once('.') else {
            return false;
        };
        self.tracked_extensions
            .iter()
            .any(|tracked| tracked.trim_start_matches('.').eq_ignore_ascii_case(extension))
    }

    fn is_excluded(&self, file_name: &str) -> bool {
        self.excluded_files
            .iter()
            .any(|excluded| excluded.eq_ignore_ascii_case(file_name))
    }
}

/// Lists tracked files directly under the root and anywhere below `plugins/`
/// and `script/`, as `/`-separated paths relative to the root.
pub fn scan_installed_files(
    layout: &InstallLayout,
    options: &ScanOptions,
) -> Result<BTreeSet<String>> {
    let root = layout.root();
    if !root.is_dir() {
        bail!("install root is not a directory: {}", root.display());
    }

    let mut files = BTreeSet::new();
    collect_files(root, "", false, options, &mut files)?;
    for (dir, prefix) in [(layout.plugins_dir(), "plugins/"), (layout.script_dir(), "script/")] {
        if dir.is_dir() {
            collect_files(&dir, prefix, true, options, &mut files)?;
        }
    }

    debug!(root = %root.display(), count = files.len(), "scanned installed files");
    Ok(files)
}

fn collect_files(
    dir: &Path,
    prefix: &str,
    recursive: bool,
    options: &ScanOptions,
    files: &mut BTreeSet<String>,
) -> Result<()> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if !prefix.is_empty() => {
            warn!(dir = %dir.display(), error = %err, "skipping unreadable directory");
            return Ok(());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", dir.display()));
        }
    };

    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read entry in {}", dir.display()))?;
        let Ok(name) = entry.file_name().into_string() else {
            warn!(path = %entry.path().display(), "skipping non UTF-8 file name");
            continue;
        };
        let file_type = entry
            .file_type()
            .with_context(|| format!("failed to stat {}", entry.path().display()))?;

        if file_type.is_dir() {
            if recursive {
                let nested = format!("{prefix}{name}/");
                collect_files(&entry.path(), &nested, true, options, files)?;
            }
            continue;
        }

        if options.is_tracked(&name) && !options.is_excluded(&name) {
            files.insert(format!("{prefix}{name}"));
        }
    }
    Ok(())
}
