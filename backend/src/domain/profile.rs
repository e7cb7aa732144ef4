//! The user's own profile card.

use serde::{Deserialize, Serialize};

/// Profile shown at the top of the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    /// Display name.
    pub name: String,
    /// Free-text headline.
    pub meta: String,
    /// Avatar as a data URL or remote URL.
    pub avatar: Option<String>,
    /// Companies the user has worked at, without case-insensitive duplicates.
    pub companies: Vec<String>,
}

impl Profile {
    /// Stored spelling of `name` when the company is already registered.
    pub fn find_company(&self, name: &str) -> Option<&str> {
        let wanted = name.trim();
        self.companies
            .iter()
            .find(|existing| existing.eq_ignore_ascii_case(wanted))
            .map(String::as_str)
    }

    /// Register a company; returns `false` when it is blank or already known.
    pub fn add_company(&mut self, name: &str) -> bool {
        let trimmed = name.trim();
        if trimmed.is_empty() || self.find_company(trimmed).is_some() {
            return false;
        }
        self.companies.push(trimmed.to_owned());
        true
    }

    /// Remove a company, matching case-insensitively. Returns the removed
    /// spelling.
    pub fn remove_company(&mut self, name: &str) -> Option<String> {
        let wanted = name.trim();
        let position = self
            .companies
            .iter()
            .position(|existing| existing.eq_ignore_ascii_case(wanted))?;
        Some(self.companies.remove(position))
    }
}
