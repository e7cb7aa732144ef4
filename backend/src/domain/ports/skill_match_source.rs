//! Port for the skill-match score.

use async_trait::async_trait;

use crate::domain::{SkillMatch, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by skill-match adapters.
    pub enum SkillMatchSourceError {
        /// The scoring service could not be reached.
        Transport { message: String } => "skill match transport failed: {message}",
        /// The scoring service did not answer in time.
        Timeout { message: String } => "skill match timed out: {message}",
        /// The scoring service refused the request.
        Rejected { status: u16, message: String } =>
            "skill match rejected ({status}): {message}",
        /// The response did not match the expected shape.
        Decode { message: String } => "skill match response was malformed: {message}",
    }
}

/// Source of the match score against the most in-demand skills.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SkillMatchSource: Send + Sync {
    /// Score `user` against the current top skills.
    async fn fetch(&self, user: UserId) -> Result<SkillMatch, SkillMatchSourceError>;
}

/// Fixture source reporting an empty score.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSkillMatchSource;

#[async_trait]
impl SkillMatchSource for FixtureSkillMatchSource {
    async fn fetch(&self, _user: UserId) -> Result<SkillMatch, SkillMatchSourceError> {
        Ok(SkillMatch {
            percentage: 0.0,
            matched_skills: Vec::new(),
            missing_skills: Vec::new(),
        })
    }
}
