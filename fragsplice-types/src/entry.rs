use crate::naming::SENTINEL;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// What a ledger entry inserts: a fragment file, or nothing (the sentinel).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum FragmentRef {
    /// Fragment file name, relative to the ledger's directory.
    Path(String),
    /// Terminal marker: no further insertions for this host file.
    End,
}

impl FragmentRef {
    pub fn is_end(&self) -> bool {
        matches!(self, FragmentRef::End)
    }

    pub fn as_path(&self) -> Option<&str> {
        match self {
            FragmentRef::Path(p) => Some(p),
            FragmentRef::End => None,
        }
    }
}

impl fmt::Display for FragmentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FragmentRef::Path(p) => f.write_str(p),
            FragmentRef::End => f.write_str(SENTINEL),
        }
    }
}

impl FromStr for FragmentRef {
    type Err = EntryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(EntryParseError::EmptyFragment);
        }
        if s.chars().any(char::is_whitespace) {
            return Err(EntryParseError::WhitespaceInFragment {
                fragment: s.to_string(),
            });
        }
        if s == SENTINEL {
            Ok(FragmentRef::End)
        } else {
            Ok(FragmentRef::Path(s.to_string()))
        }
    }
}

impl From<FragmentRef> for String {
    fn from(value: FragmentRef) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for FragmentRef {
    type Error = EntryParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One pending insertion point: "insert `fragment` before host line `line`".
///
/// Text form is `<line> <fragment-or-end>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub line: u64,
    pub fragment: FragmentRef,
}

impl LedgerEntry {
    pub fn fragment(line: u64, name: impl Into<String>) -> Self {
        Self {
            line,
            fragment: FragmentRef::Path(name.into()),
        }
    }

    pub fn end(line: u64) -> Self {
        Self {
            line,
            fragment: FragmentRef::End,
        }
    }

    pub fn is_end(&self) -> bool {
        self.fragment.is_end()
    }
}

impl fmt::Display for LedgerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.line, self.fragment)
    }
}

impl FromStr for LedgerEntry {
    type Err = EntryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        let [line, fragment] = tokens.as_slice() else {
            return Err(EntryParseError::TokenCount {
                found: tokens.len(),
            });
        };

        let line = line
            .parse::<u64>()
            .map_err(|_| EntryParseError::InvalidLine {
                token: line.to_string(),
            })?;

        Ok(LedgerEntry {
            line,
            fragment: fragment.parse()?,
        })
    }
}

/// Why a ledger line could not be read back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryParseError {
    #[error("expected 2 whitespace-separated tokens, found {found}")]
    TokenCount { found: usize },

    #[error("line number `{token}` is not a non-negative integer")]
    InvalidLine { token: String },

    #[error("fragment reference is empty")]
    EmptyFragment,

    #[error("fragment reference `{fragment}` contains whitespace")]
    WhitespaceInFragment { fragment: String },
}
