//! Match score against the most in-demand skills.

use serde::{Deserialize, Serialize};

/// Missing skills shown before collapsing the rest into a count.
pub const MISSING_PREVIEW_LIMIT: usize = 8;

/// Score returned by the skill-match endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillMatch {
    /// Share of the top skills the user holds, 0 to 100.
    pub percentage: f64,
    /// Top skills the user holds.
    #[serde(default)]
    pub matched_skills: Vec<String>,
    /// Top skills the user lacks.
    #[serde(default)]
    pub missing_skills: Vec<String>,
}

/// A truncated view of the missing skills.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingPreview<'a> {
    /// Skills shown.
    pub shown: Vec<&'a str>,
    /// Skills hidden behind a "+N more" label.
    pub remaining: usize,
}

impl SkillMatch {
    /// Whether nothing is missing.
    pub fn is_complete(&self) -> bool {
        self.missing_skills.is_empty()
    }

    /// The first `limit` missing skills and how many more there are.
    pub fn missing_preview(&self, limit: usize) -> MissingPreview<'_> {
        let shown: Vec<&str> = self
            .missing_skills
            .iter()
            .take(limit)
            .map(String::as_str)
            .collect();
        let remaining = self.missing_skills.len().saturating_sub(shown.len());
        MissingPreview { shown, remaining }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(3, 3, 0)]
    #[case(10, 8, 2)]
    #[case(0, 0, 0)]
    fn preview_collapses_the_tail(
        #[case] missing: usize,
        #[case] shown: usize,
        #[case] remaining: usize,
    ) {
        let score = SkillMatch {
            percentage: 40.0,
            matched_skills: Vec::new(),
            missing_skills: (0..missing).map(|n| format!("Skill {n}")).collect(),
        };
        let preview = score.missing_preview(MISSING_PREVIEW_LIMIT);
        assert_eq!(preview.shown.len(), shown);
        assert_eq!(preview.remaining, remaining);
        assert_eq!(score.is_complete(), missing == 0);
    }

    #[rstest]
    fn decodes_the_endpoint_payload() {
        let score: SkillMatch = serde_json::from_value(json!({
            "percentage": 55,
            "matchedSkills": ["Go"],
            "missingSkills": ["Rust"]
        }))
        .expect("payload decodes");
        assert_eq!(score.matched_skills, vec!["Go"]);
        assert!((score.percentage - 55.0).abs() < f64::EPSILON);
    }
}
