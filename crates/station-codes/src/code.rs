//! Resolved station codes and their provenance.

use std::fmt;

/// Which resolution step produced a [`StationCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeSource {
    /// A configured lookup-table entry matched the label.
    LookupTable,
    /// The code was taken from a parenthesised suffix such as `(SBC)`.
    Parenthesized,
    /// The first three characters of the label, upper-cased.
    Prefix,
    /// An external resolver supplied the code.
    External,
}

impl CodeSource {
    /// Whether the code came from a heuristic rather than a known mapping.
    #[must_use]
    pub const fn is_heuristic(self) -> bool {
        matches!(self, Self::Parenthesized | Self::Prefix)
    }
}

/// A city code together with the step that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StationCode {
    code: String,
    source: CodeSource,
}

impl StationCode {
    /// Construct a code with an explicit provenance.
    #[must_use]
    pub fn new(code: impl Into<String>, source: CodeSource) -> Self {
        Self {
            code: code.into(),
            source,
        }
    }

    /// Borrow the code text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.code.as_str()
    }

    /// Resolution step that produced the code.
    #[must_use]
    pub const fn source(&self) -> CodeSource {
        self.source
    }

    /// Consume the value and return the code text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.code
    }
}

impl AsRef<str> for StationCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for StationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

impl From<StationCode> for String {
    fn from(value: StationCode) -> Self {
        value.code
    }
}
