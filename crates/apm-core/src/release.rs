use anyhow::anyhow;
use serde::{Deserialize, Serialize};

/// Hash algorithms accepted in integrity strings (`"<algorithm>-<hex digest>"`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum IntegrityAlgorithm {
    Sha256,
}

impl IntegrityAlgorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "sha256" => Some(Self::Sha256),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileIntegrity {
    pub target: String,
    pub hash: String,
}

impl FileIntegrity {
    /// Splits `hash` into algorithm and lowercase hex digest.
    pub fn digest(&self) -> anyhow::Result<(IntegrityAlgorithm, String)> {
        let (algorithm, digest) = self
            .hash
            .split_once('-')
            .ok_or_else(|| anyhow!("integrity for '{}' has no algorithm prefix", self.target))?;
        let algorithm = IntegrityAlgorithm::parse(algorithm).ok_or_else(|| {
            anyhow!(
                "unsupported integrity algorithm '{algorithm}' for '{}'; supported: sha256",
                self.target
            )
        })?;
        if digest.is_empty() || !digest.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(anyhow!(
                "integrity digest for '{}' must be hex encoded",
                self.target
            ));
        }
        Ok((algorithm, digest.to_ascii_lowercase()))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseIntegrity {
    pub archive: Option<String>,
    #[serde(default)]
    pub files: Vec<FileIntegrity>,
}

/// Per-release metadata. Only the integrity hashes matter here; they let an
/// installation be recognized by file content.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseInfo {
    #[serde(default)]
    pub integrity: ReleaseIntegrity,
}
