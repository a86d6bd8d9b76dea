use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::qualified_id::CoreProgram;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CoreVersions {
    pub aviutl: Option<String>,
    pub exedit: Option<String>,
}

impl CoreVersions {
    pub fn get(&self, program: CoreProgram) -> Option<&str> {
        match program {
            CoreProgram::Aviutl => self.aviutl.as_deref(),
            CoreProgram::Exedit => self.exedit.as_deref(),
        }
    }

    pub fn set(&mut self, program: CoreProgram, version: Option<String>) {
        match program {
            CoreProgram::Aviutl => self.aviutl = version,
            CoreProgram::Exedit => self.exedit = version,
        }
    }
}

/// What the surrounding application believes is installed. Read-only input
/// to every evaluation pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstalledRecord {
    #[serde(default)]
    pub core: CoreVersions,
    #[serde(default)]
    pub packages: BTreeMap<String, String>,
}

impl InstalledRecord {
    pub fn version_of(&self, id: &str) -> Option<&str> {
        self.packages.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.packages.contains_key(id)
    }

    pub fn core_version(&self, program: CoreProgram) -> Option<&str> {
        self.core.get(program)
    }

    /// Re-keys entries whose ids were renamed. An entry already present under
    /// the new id wins over the converted one.
    pub fn apply_id_conversions(&mut self, conversions: &BTreeMap<String, String>) -> usize {
        let mut renamed = 0;
        for (from, to) in conversions {
            let Some(version) = self.packages.remove(from) else {
                continue;
            };
            self.packages.entry(to.clone()).or_insert(version);
            renamed += 1;
        }
        renamed
    }
}
