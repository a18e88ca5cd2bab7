//! Version references: `<path>@<suffix>` strings.
//!
//! | suffix              | selector           |
//! |---------------------|--------------------|
//! | `3`                 | `Exact(3)`         |
//! | `prev`, `previous`  | `Previous`         |
//! | `-2`                | `ChangesAgo(2)`    |
//! | anything else, `0`  | none; whole input is the path |
//!
//! The split happens at the last `@`, so keys shaped like e-mail addresses
//! survive untouched unless they end in valid version syntax.

use serde::{Deserialize, Serialize};
use std::fmt;

const SEPARATOR: char = '@';

/// Which historical state of a key or directory is addressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VersionSelector {
    /// Live state
    None,
    /// A specific version of a single key
    Exact(u64),
    /// Each key's version just before its current one
    Previous,
    /// Directory state N write events ago
    ChangesAgo(u64),
}

impl VersionSelector {
    pub fn is_none(&self) -> bool {
        matches!(self, VersionSelector::None)
    }

    /// The suffix that parses back to this selector (empty for `None`)
    pub fn suffix(&self) -> String {
        match self {
            VersionSelector::None => String::new(),
            VersionSelector::Exact(n) => format!("{}{}", SEPARATOR, n),
            VersionSelector::Previous => format!("{}prev", SEPARATOR),
            VersionSelector::ChangesAgo(n) => format!("{}-{}", SEPARATOR, n),
        }
    }
}

impl fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSelector::None => write!(f, "current"),
            _ => write!(f, "{}", self.suffix()),
        }
    }
}

/// A base path plus the selector parsed from its suffix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedPath {
    pub path: String,
    pub selector: VersionSelector,
}

impl VersionedPath {
    pub fn new(path: impl Into<String>, selector: VersionSelector) -> Self {
        Self {
            path: path.into(),
            selector,
        }
    }

    /// Live state of `path`, no suffix parsing
    pub fn current(path: impl Into<String>) -> Self {
        Self::new(path, VersionSelector::None)
    }
}

impl fmt::Display for VersionedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.path, self.selector.suffix())
    }
}

/// Split `input` into a base path and a version selector.
///
/// Never fails: input without valid version syntax is returned whole with
/// `VersionSelector::None`.
pub fn parse_versioned_path(input: &str) -> VersionedPath {
    let Some(idx) = input.rfind(SEPARATOR) else {
        return VersionedPath::current(input);
    };
    let base = &input[..idx];
    let suffix = &input[idx + SEPARATOR.len_utf8()..];

    if suffix == "prev" || suffix == "previous" {
        return VersionedPath::new(base, VersionSelector::Previous);
    }

    // Out-of-range integers fail to parse and fall through to the literal case
    match suffix.parse::<i64>() {
        Ok(n) if n > 0 => VersionedPath::new(base, VersionSelector::Exact(n.unsigned_abs())),
        Ok(n) if n < 0 => VersionedPath::new(base, VersionSelector::ChangesAgo(n.unsigned_abs())),
        _ => VersionedPath::current(input),
    }
}
