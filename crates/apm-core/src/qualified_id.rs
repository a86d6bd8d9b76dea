use std::fmt;

use serde::{Deserialize, Serialize};

use crate::version::VersionOp;

/// One of the two singleton host programs tracked outside the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoreProgram {
    Aviutl,
    Exedit,
}

impl CoreProgram {
    pub const ALL: [CoreProgram; 2] = [CoreProgram::Aviutl, CoreProgram::Exedit];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Aviutl => "aviutl",
            Self::Exedit => "exedit",
        }
    }

    /// Matches `"aviutl1.10"`-shaped references: the program name followed by
    /// a version starting with a digit.
    pub fn parse_reference(input: &str) -> Option<(Self, &str)> {
        Self::ALL.into_iter().find_map(|program| {
            let version = input.strip_prefix(program.as_str())?;
            version
                .starts_with(|ch: char| ch.is_ascii_digit())
                .then_some((program, version))
        })
    }
}

impl fmt::Display for CoreProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionConstraint {
    pub op: VersionOp,
    pub version: String,
}

/// A dependency or conflict reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QualifiedId {
    Catalog {
        id: String,
        constraint: Option<VersionConstraint>,
    },
    Core {
        program: CoreProgram,
        version: String,
    },
}

impl QualifiedId {
    /// Never fails: text that does not split into id, operator and version is
    /// kept whole as an unconstrained catalog id.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if let Some((program, version)) = CoreProgram::parse_reference(input) {
            return Self::Core {
                program,
                version: version.to_string(),
            };
        }

        let Some(split) = input.find(['<', '>', '=']) else {
            return Self::catalog(input);
        };
        let (id, rest) = input.split_at(split);
        let Some((op, version)) = VersionOp::split_prefix(rest) else {
            return Self::catalog(input);
        };
        let (id, version) = (id.trim(), version.trim());
        if id.is_empty() || version.is_empty() {
            return Self::catalog(input);
        }

        Self::Catalog {
            id: id.to_string(),
            constraint: Some(VersionConstraint {
                op,
                version: version.to_string(),
            }),
        }
    }

    pub fn catalog(id: impl Into<String>) -> Self {
        Self::Catalog {
            id: id.into(),
            constraint: None,
        }
    }

    /// The catalog id, or the `"aviutl1.10"`-style id for core references.
    pub fn id(&self) -> String {
        match self {
            Self::Catalog { id, .. } => id.clone(),
            Self::Core { program, version } => format!("{program}{version}"),
        }
    }

    pub fn catalog_id(&self) -> Option<&str> {
        match self {
            Self::Catalog { id, .. } => Some(id),
            Self::Core { .. } => None,
        }
    }

    pub(crate) fn rename(&mut self, from: &str, to: &str) -> bool {
        match self {
            Self::Catalog { id, .. } if id == from => {
                *id = to.to_string();
                true
            }
            _ => false,
        }
    }
}

impl fmt::Display for QualifiedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Catalog {
                id,
                constraint: None,
            } => f.write_str(id),
            Self::Catalog {
                id,
                constraint: Some(constraint),
            } => write!(f, "{id}{}{}", constraint.op, constraint.version),
            Self::Core { program, version } => write!(f, "{program}{version}"),
        }
    }
}

/// Dependency alternatives; satisfied when any member holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct OrGroup(pub Vec<QualifiedId>);

/// Conflict members; fires only when every member holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct AndGroup(pub Vec<QualifiedId>);

impl OrGroup {
    pub fn parse(input: &str) -> Self {
        Self(split_members(input, '|'))
    }

    pub fn members(&self) -> &[QualifiedId] {
        &self.0
    }
}

impl AndGroup {
    pub fn parse(input: &str) -> Self {
        Self(split_members(input, '&'))
    }

    pub fn members(&self) -> &[QualifiedId] {
        &self.0
    }
}

fn split_members(input: &str, separator: char) -> Vec<QualifiedId> {
    input
        .split(separator)
        .map(str::trim)
        .filter(|member| !member.is_empty())
        .map(QualifiedId::parse)
        .collect()
}

fn join_members(members: &[QualifiedId], separator: &str) -> String {
    members
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}

impl From<String> for OrGroup {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<OrGroup> for String {
    fn from(value: OrGroup) -> Self {
        value.to_string()
    }
}

impl fmt::Display for OrGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join_members(&self.0, "|"))
    }
}

impl From<String> for AndGroup {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<AndGroup> for String {
    fn from(value: AndGroup) -> Self {
        value.to_string()
    }
}

impl fmt::Display for AndGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join_members(&self.0, "&"))
    }
}
