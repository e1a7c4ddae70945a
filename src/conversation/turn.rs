//! Turn clip naming and conversation assembly.
//!
//! A turn clip is named `<sort_key>_<role>.mp3`, where role is `agent` or
//! `customer` (case-insensitive, as is the extension). Everything before the
//! final role suffix is the sort key. Sort keys are compared lexicographically
//! with root-locale collation, so they must be fixed-width timestamps for the
//! order to be chronological.

use crate::defaults;
use icu_collator::Collator;
use icu_collator::options::CollatorOptions;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;

/// Speaker role of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Agent,
    Customer,
}

impl Role {
    fn from_token(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case("agent") {
            Some(Role::Agent)
        } else if token.eq_ignore_ascii_case("customer") {
            Some(Role::Customer)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Agent => "agent",
            Role::Customer => "customer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A turn recognized from its file name, before its duration is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTurn {
    pub sort_key: String,
    pub role: Role,
    pub file_name: String,
}

/// A turn with its resolved duration in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub sort_key: String,
    pub role: Role,
    pub path: PathBuf,
    pub duration: f64,
}

impl Turn {
    pub fn new(parsed: ParsedTurn, path: PathBuf, duration: f64) -> Self {
        Self {
            sort_key: parsed.sort_key,
            role: parsed.role,
            path,
            duration,
        }
    }
}

/// Why a conversation directory produced no artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "role", rename_all = "snake_case")]
pub enum SkipReason {
    /// No file matched the turn naming pattern.
    NoTurns,
    /// Turns exist but none belongs to this role.
    MissingRole(Role),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoTurns => write!(f, "no _agent/_customer mp3 files found"),
            SkipReason::MissingRole(role) => write!(f, "missing {} audio", role),
        }
    }
}

/// Parse a clip file name into a turn.
///
/// Returns `None` for anything that is not `<sort_key>_<agent|customer>.mp3`.
pub fn parse(file_name: &str) -> Option<ParsedTurn> {
    let (stem, extension) = file_name.rsplit_once('.')?;
    if !extension.eq_ignore_ascii_case(defaults::CLIP_EXTENSION) {
        return None;
    }

    let (sort_key, token) = stem.rsplit_once('_')?;
    let role = Role::from_token(token)?;

    Some(ParsedTurn {
        sort_key: sort_key.to_string(),
        role,
        file_name: file_name.to_string(),
    })
}

/// Collect the turns of one conversation from its file names.
///
/// Turns are ordered by sort key under root-locale collation (`a` before `A`,
/// punctuation before digits); equal keys fall back to the file name so the
/// result never depends on directory listing order. A conversation needs at
/// least one agent and one customer turn to be reconstructed.
pub fn assemble<I, S>(file_names: I) -> Result<Vec<ParsedTurn>, SkipReason>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut turns: Vec<ParsedTurn> = file_names
        .into_iter()
        .filter_map(|name| parse(name.as_ref()))
        .collect();

    if turns.is_empty() {
        return Err(SkipReason::NoTurns);
    }

    // Only fails without compiled collation data; byte order then.
    let collator = Collator::try_new(Default::default(), CollatorOptions::default()).ok();
    let compare_keys = |a: &str, b: &str| -> Ordering {
        match &collator {
            Some(collator) => collator.compare(a, b),
            None => a.cmp(b),
        }
    };

    turns.sort_by(|a, b| {
        compare_keys(&a.sort_key, &b.sort_key).then_with(|| a.file_name.cmp(&b.file_name))
    });

    for role in [Role::Agent, Role::Customer] {
        if !turns.iter().any(|t| t.role == role) {
            return Err(SkipReason::MissingRole(role));
        }
    }

    Ok(turns)
}
