//! Skill names and the records that carry them.
//!
//! Free-text skill names are canonicalised by [`normalize_skill`]: surrounding
//! whitespace is trimmed, internal runs collapse to one space, and each word is
//! ASCII title-cased, where punctuation also starts a new word. Comparisons
//! elsewhere go through [`skill_key`] so that `"python"` and `"PYTHON "` count
//! as the same skill.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canonical display form of a skill name.
///
/// The transformation is idempotent and leaves non-ASCII characters as they
/// are.
///
/// # Examples
/// ```
/// use peerdesk::domain::normalize_skill;
///
/// assert_eq!(normalize_skill("  pyThon   react "), "Python React");
/// assert_eq!(normalize_skill("Python React"), "Python React");
/// assert_eq!(normalize_skill("node.js"), "Node.Js");
/// ```
pub fn normalize_skill(raw: &str) -> String {
    title_case(&raw.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Upper-case every ASCII word character that starts a word and lower-case the
/// rest. Word characters are ASCII letters, digits, and `_`; anything else,
/// punctuation and non-ASCII letters included, ends a word.
fn title_case(collapsed: &str) -> String {
    let mut out = String::with_capacity(collapsed.len());
    let mut in_word = false;
    for ch in collapsed.chars() {
        let is_word = ch.is_ascii_alphanumeric() || ch == '_';
        out.push(match (is_word, in_word) {
            (true, false) => ch.to_ascii_uppercase(),
            (true, true) => ch.to_ascii_lowercase(),
            (false, _) => ch,
        });
        in_word = is_word;
    }
    out
}

/// Comparison key for a skill name; equal keys mean the same skill.
pub fn skill_key(raw: &str) -> String {
    normalize_skill(raw).to_lowercase()
}

/// Split comma-separated input into normalised, distinct, non-blank skills.
///
/// Order of first appearance is preserved.
pub fn parse_skill_list(raw: &str) -> Vec<String> {
    let mut seen = Vec::<String>::new();
    let mut skills = Vec::new();
    for part in raw.split(',') {
        let skill = normalize_skill(part);
        if skill.is_empty() {
            continue;
        }
        let key = skill.to_lowercase();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        skills.push(skill);
    }
    skills
}

/// A skill the user holds, tagged with the company it was used at.
///
/// `company` is empty when the skill is not tied to an employer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillEntry {
    /// Skill display name.
    pub skill: String,
    /// Company tag, or an empty string.
    #[serde(default)]
    pub company: String,
}

impl SkillEntry {
    /// Build an entry, normalising the skill name.
    pub fn new(skill: &str, company: impl Into<String>) -> Self {
        Self {
            skill: normalize_skill(skill),
            company: company.into(),
        }
    }

    /// Comparison key of the skill name.
    pub fn key(&self) -> String {
        skill_key(&self.skill)
    }
}

/// A skill as found in persisted state, before migration.
///
/// Older records stored bare strings; newer ones store `{skill, company}`
/// objects. Anything else is kept as raw JSON so the migrator can decide what
/// to salvage.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SkillRecord {
    /// Bare skill name.
    Legacy(String),
    /// Object form with an optional company tag.
    Modern {
        /// Skill display name.
        skill: String,
        /// Company tag; `null` and absent both mean untagged.
        #[serde(default)]
        company: Option<String>,
    },
    /// A value matching neither shape.
    Unrecognized(Value),
}

impl SkillRecord {
    /// Whether this record used the bare-string form.
    pub const fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy(_))
    }

    /// Resolve into a [`SkillEntry`] without renaming the skill.
    ///
    /// Scalars in the unrecognised form are stringified; blank names and
    /// structured junk yield `None`.
    pub fn into_entry(self) -> Option<SkillEntry> {
        let (skill, company) = match self {
            Self::Legacy(skill) => (skill, String::new()),
            Self::Modern { skill, company } => (skill, company.unwrap_or_default()),
            Self::Unrecognized(Value::Number(number)) => (number.to_string(), String::new()),
            Self::Unrecognized(Value::Bool(flag)) => (flag.to_string(), String::new()),
            Self::Unrecognized(_) => return None,
        };
        if skill.trim().is_empty() {
            return None;
        }
        Some(SkillEntry { skill, company })
    }

    /// The skill name alone, for places that only keep names.
    pub fn into_name(self) -> Option<String> {
        self.into_entry().map(|entry| entry.skill)
    }
}
