use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use semver::Version;
use serde::{Deserialize, Serialize};

static DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})/(\d{2})/(\d{2})$").expect("date pattern"));
static VER_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ver\.?").expect("ver token pattern"));
static LEADING_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[vr+]").expect("leading prefix pattern"));
static SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[_+,][vr]?").expect("separator pattern"));
static DIGIT_LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d)([a-z])").expect("digit-letter pattern"));
static LETTER_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])(\d)").expect("letter-digit pattern"));
static MAJOR_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)$").expect("major pattern"));
static MAJOR_MINOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+\.\d+)$").expect("major-minor pattern"));
static MAJOR_MINOR_PRE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+\.\d+)-").expect("major-minor-pre pattern"));
static MAJOR_PRE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)-").expect("major-pre pattern"));

/// Replacement for non-ASCII characters. Keeps the string length stable so
/// that two strings differing only in non-ASCII text still normalize apart
/// when their lengths differ.
const NON_ASCII_FILLER: char = 'x';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VersionOp {
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = ">")]
    Gt,
}

impl VersionOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Eq => "=",
            Self::Ge => ">=",
            Self::Gt => ">",
        }
    }

    /// Parses an operator at the start of `input`, preferring two-character
    /// operators. Returns the operator and the remaining text.
    pub fn split_prefix(input: &str) -> Option<(Self, &str)> {
        for (token, op) in [
            ("<=", Self::Le),
            (">=", Self::Ge),
            ("<", Self::Lt),
            (">", Self::Gt),
            ("=", Self::Eq),
        ] {
            if let Some(rest) = input.strip_prefix(token) {
                return Some((op, rest));
            }
        }
        None
    }

    pub fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Self::Lt => ordering == Ordering::Less,
            Self::Le => ordering != Ordering::Greater,
            Self::Eq => ordering == Ordering::Equal,
            Self::Ge => ordering != Ordering::Less,
            Self::Gt => ordering == Ordering::Greater,
        }
    }
}

impl fmt::Display for VersionOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Orders two free-form version strings.
///
/// Date strings (`YYYY/MM/DD`) order among themselves; a date compared with a
/// non-date is unordered and reported as `Equal`. Anything that still fails to
/// parse after normalization is also reported as `Equal`.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    try_compare_versions(a, b).unwrap_or(Ordering::Equal)
}

/// Returns whether `installed op required` holds. Unordered pairs never
/// satisfy any operator.
pub fn satisfies(installed: &str, op: VersionOp, required: &str) -> bool {
    try_compare_versions(installed, required)
        .map(|ordering| op.accepts(ordering))
        .unwrap_or(false)
}

/// Like [`compare_versions`] but keeps "unordered" distinct from "equal".
pub fn try_compare_versions(a: &str, b: &str) -> Option<Ordering> {
    if a == b {
        return Some(Ordering::Equal);
    }

    match (parse_date(a), parse_date(b)) {
        (Some(left), Some(right)) => return Some(left.cmp(&right)),
        (Some(_), None) | (None, Some(_)) => return None,
        (None, None) => {}
    }

    let left = Version::parse(&normalize_version(a)).ok()?;
    let right = Version::parse(&normalize_version(b)).ok()?;
    Some(left.cmp(&right))
}

/// Rewrites a free-form version string into semver shape. The result is not
/// guaranteed to parse; callers treat failures as unordered.
pub fn normalize_version(raw: &str) -> String {
    let mut value: String = raw
        .to_lowercase()
        .chars()
        .filter(|ch| *ch != ' ')
        .map(|ch| match ch {
            '/' => '.',
            ch if !ch.is_ascii() => NON_ASCII_FILLER,
            ch => ch,
        })
        .collect();

    value = VER_TOKEN.replace_all(&value, "").into_owned();
    value = LEADING_PREFIX.replace(&value, "").into_owned();
    value = SEPARATOR.replace_all(&value, ".").into_owned();
    value = value.replace('(', "-").replace(')', "");
    value = DIGIT_LETTER.replace_all(&value, "${1}-${2}").into_owned();
    value = LETTER_DIGIT.replace_all(&value, "${1}.${2}").into_owned();

    if MAJOR_ONLY.is_match(&value) {
        value.push_str(".0.0");
    } else if MAJOR_MINOR.is_match(&value) {
        value.push_str(".0");
    } else if MAJOR_MINOR_PRE.is_match(&value) {
        value = MAJOR_MINOR_PRE.replace(&value, "${1}.0-").into_owned();
    } else if MAJOR_PRE.is_match(&value) {
        value = MAJOR_PRE.replace(&value, "${1}.0.0-").into_owned();
    }

    value
}

fn parse_date(value: &str) -> Option<(u32, u32, u32)> {
    let captures = DATE.captures(value)?;
    let year = captures[1].parse().ok()?;
    let month = captures[2].parse().ok()?;
    let day = captures[3].parse().ok()?;
    Some((year, month, day))
}
