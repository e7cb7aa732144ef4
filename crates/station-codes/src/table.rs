//! Lookup-table resolver with parenthesised-code and prefix fallbacks.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::{CodeSource, StationCode, StationCodeResolver};

/// Length of the code derived from the start of an unmatched label.
const PREFIX_LEN: usize = 3;

/// Known station fragments for the cities the travel catalogue serves.
const DEFAULT_TABLE: &[(&str, &[&str])] = &[
    ("BLR", &["SBC", "Bengaluru"]),
    ("DEL", &["NZM", "Delhi"]),
    ("MAA", &["MAS", "Chennai"]),
    ("HYD", &["KCG", "Hyderabad"]),
];

static PARENTHESIZED_RE: OnceLock<Regex> = OnceLock::new();

fn parenthesized_regex() -> &'static Regex {
    PARENTHESIZED_RE.get_or_init(|| {
        Regex::new(r"\(([^)]+)\)")
            .unwrap_or_else(|error| panic!("station code regex failed to compile: {error}"))
    })
}

/// Errors raised while building a custom lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupTableError {
    /// A table entry was registered with a blank code.
    #[error("lookup table codes must not be blank")]
    EmptyCode,
    /// A table entry has no fragments to match against.
    #[error("lookup table entry {code} has no station fragments")]
    NoFragments {
        /// Code of the offending entry.
        code: String,
    },
    /// A fragment is blank once trimmed.
    #[error("lookup table entry {code} contains a blank station fragment")]
    BlankFragment {
        /// Code of the offending entry.
        code: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TableEntry {
    code: String,
    fragments: Vec<String>,
}

impl TableEntry {
    fn matches(&self, station: &str) -> bool {
        self.fragments
            .iter()
            .any(|fragment| station.contains(fragment.as_str()))
    }
}

/// Resolver that consults a fixed table of station fragments first.
///
/// Entries are checked in registration order and the first entry with any
/// fragment contained in the label wins, so an explicit table entry always
/// takes precedence over a parenthesised code in the same label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTableResolver {
    entries: Vec<TableEntry>,
}

impl Default for LookupTableResolver {
    fn default() -> Self {
        let entries = DEFAULT_TABLE
            .iter()
            .map(|(code, fragments)| TableEntry {
                code: (*code).to_owned(),
                fragments: fragments.iter().map(|fragment| (*fragment).to_owned()).collect(),
            })
            .collect();
        Self { entries }
    }
}

impl LookupTableResolver {
    /// Start an empty table; only the regex and prefix fallbacks apply until
    /// entries are added.
    #[must_use]
    pub fn builder() -> LookupTableBuilder {
        LookupTableBuilder::default()
    }

    /// Start from the built-in table so callers can extend it.
    #[must_use]
    pub fn builder_with_defaults() -> LookupTableBuilder {
        LookupTableBuilder {
            entries: Self::default().entries,
        }
    }

    /// Number of table entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn lookup(&self, station: &str) -> Option<StationCode> {
        self.entries
            .iter()
            .find(|entry| entry.matches(station))
            .map(|entry| StationCode::new(entry.code.clone(), CodeSource::LookupTable))
    }
}

impl StationCodeResolver for LookupTableResolver {
    fn resolve(&self, station: &str) -> Option<StationCode> {
        let label = station.trim();
        if label.is_empty() {
            return None;
        }
        self.lookup(label)
            .or_else(|| parenthesized_code(label))
            .or_else(|| prefix_code(label))
    }
}

fn parenthesized_code(label: &str) -> Option<StationCode> {
    let captured = parenthesized_regex()
        .captures(label)
        .and_then(|captures| captures.get(1))
        .map(|found| found.as_str().trim())?;
    if captured.is_empty() {
        return None;
    }
    Some(StationCode::new(captured, CodeSource::Parenthesized))
}

fn prefix_code(label: &str) -> Option<StationCode> {
    let prefix: String = label.chars().take(PREFIX_LEN).collect();
    if prefix.is_empty() {
        return None;
    }
    Some(StationCode::new(prefix.to_uppercase(), CodeSource::Prefix))
}

/// Builder for custom lookup tables.
#[derive(Debug, Clone, Default)]
pub struct LookupTableBuilder {
    entries: Vec<TableEntry>,
}

impl LookupTableBuilder {
    /// Register `code` for labels containing any of `fragments`.
    ///
    /// # Errors
    ///
    /// Returns [`LookupTableError`] when the code is blank, when no fragments
    /// are supplied, or when a fragment is blank.
    pub fn entry<I, S>(mut self, code: &str, fragments: I) -> Result<Self, LookupTableError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let code = code.trim();
        if code.is_empty() {
            return Err(LookupTableError::EmptyCode);
        }
        let collected = fragments
            .into_iter()
            .map(Into::into)
            .collect::<Vec<String>>();
        if collected.is_empty() {
            return Err(LookupTableError::NoFragments {
                code: code.to_owned(),
            });
        }
        if collected.iter().any(|fragment| fragment.trim().is_empty()) {
            return Err(LookupTableError::BlankFragment {
                code: code.to_owned(),
            });
        }
        self.entries.push(TableEntry {
            code: code.to_uppercase(),
            fragments: collected,
        });
        Ok(self)
    }

    /// Finish the table.
    #[must_use]
    pub fn build(self) -> LookupTableResolver {
        LookupTableResolver {
            entries: self.entries,
        }
    }
}
