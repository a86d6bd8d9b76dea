use std::fmt;

use serde::{Deserialize, Serialize};

/// Installation state of one catalog entry for one installation root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", content = "version", rename_all = "camelCase")]
pub enum InstallationStatus {
    NotInstalled,
    /// Some of the entry's files exist but belong to another recorded package.
    OtherInstalled,
    /// Some of the entry's files exist and no recorded package claims them.
    ManuallyInstalled,
    InstalledButBroken,
    Installed(String),
}

impl InstallationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotInstalled => "not installed",
            Self::OtherInstalled => "other installed",
            Self::ManuallyInstalled => "manually installed",
            Self::InstalledButBroken => "installed (broken)",
            Self::Installed(_) => "installed",
        }
    }

    pub fn version(&self) -> Option<&str> {
        match self {
            Self::Installed(version) => Some(version),
            _ => None,
        }
    }

    /// Whether the entry counts as present for dependency and conflict
    /// checks.
    pub fn is_usable(&self) -> bool {
        matches!(self, Self::Installed(_) | Self::ManuallyInstalled)
    }
}

impl fmt::Display for InstallationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Installed(version) => write!(f, "installed {version}"),
            other => f.write_str(other.as_str()),
        }
    }
}
