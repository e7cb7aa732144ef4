//! Skill-frequency tallies and company buckets for the dashboard charts.

use std::collections::HashMap;

use serde::Serialize;

use super::{DashboardState, Peer, SkillEntry, normalize_skill, skill_key};

/// Number of skills shown in the trending chart.
pub const TRENDING_LIMIT: usize = 8;

/// A skill and how many holders have it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillCount {
    /// Normalised display name (first spelling seen).
    pub skill: String,
    /// Number of holders.
    pub count: usize,
}

/// Insertion-ordered multiset of normalised skill names.
///
/// Each holder (the user, or one peer) contributes at most one occurrence per
/// skill, however many times they list it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillTally {
    order: Vec<String>,
    counts: HashMap<String, SkillCount>,
}

impl SkillTally {
    /// Empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one holder's skills, once per distinct skill.
    pub fn add_holder<I, S>(&mut self, skills: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = Vec::<String>::new();
        for skill in skills {
            let display = normalize_skill(skill.as_ref());
            if display.is_empty() {
                continue;
            }
            let key = display.to_lowercase();
            if seen.contains(&key) {
                continue;
            }
            seen.push(key.clone());
            self.bump(key, display);
        }
    }

    fn bump(&mut self, key: String, display: String) {
        if let Some(entry) = self.counts.get_mut(&key) {
            entry.count += 1;
            return;
        }
        self.order.push(key.clone());
        self.counts.insert(
            key,
            SkillCount {
                skill: display,
                count: 1,
            },
        );
    }

    /// Holders of `skill`, compared by normalised key.
    pub fn count(&self, skill: &str) -> usize {
        self.counts
            .get(&skill_key(skill))
            .map_or(0, |entry| entry.count)
    }

    /// Whether any holder has `skill`.
    pub fn contains(&self, skill: &str) -> bool {
        self.count(skill) > 0
    }

    /// Number of distinct skills.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no skills were counted.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Skills in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &SkillCount> {
        self.order.iter().filter_map(|key| self.counts.get(key))
    }

    /// Skills by descending count; ties keep first-seen order.
    pub fn ranked(&self) -> Vec<SkillCount> {
        let mut ranked: Vec<SkillCount> = self.iter().cloned().collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked
    }

    /// The `limit` highest-ranked skills.
    pub fn top(&self, limit: usize) -> Vec<SkillCount> {
        let mut ranked = self.ranked();
        ranked.truncate(limit);
        ranked
    }
}

/// Tally of the user's own skills plus every peer's skills.
///
/// # Examples
/// ```
/// use peerdesk::domain::{DashboardState, Peer, network_tally};
///
/// let mut state = DashboardState::default();
/// state.add_skills("Python", "");
/// state.peers.push(Peer { skills: vec!["python".into()], ..Peer::default() });
/// state.peers.push(Peer { skills: vec!["React".into()], ..Peer::default() });
///
/// let tally = network_tally(&state);
/// assert_eq!(tally.count("Python"), 2);
/// assert_eq!(tally.count("React"), 1);
/// ```
pub fn network_tally(state: &DashboardState) -> SkillTally {
    let mut tally = SkillTally::new();
    tally.add_holder(state.my_skills.iter().map(|entry| entry.skill.as_str()));
    for peer in &state.peers {
        tally.add_holder(&peer.skills);
    }
    tally
}

/// Tally of peer skills only.
pub fn peer_tally(peers: &[Peer]) -> SkillTally {
    let mut tally = SkillTally::new();
    for peer in peers {
        tally.add_holder(&peer.skills);
    }
    tally
}

/// Trending chart data: the most common skills across the network.
pub fn trending_skills(state: &DashboardState, limit: usize) -> Vec<SkillCount> {
    network_tally(state).top(limit)
}

/// Skills held per company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyBucket {
    /// Company name as tagged on the first skill seen.
    pub company: String,
    /// Number of skills tagged with it.
    pub skills: usize,
}

/// Count skills per company tag, in first-seen order; untagged skills are
/// skipped.
pub fn company_buckets(my_skills: &[SkillEntry]) -> Vec<CompanyBucket> {
    let mut buckets: Vec<CompanyBucket> = Vec::new();
    for entry in my_skills {
        let company = entry.company.trim();
        if company.is_empty() {
            continue;
        }
        match buckets
            .iter_mut()
            .find(|bucket| bucket.company.eq_ignore_ascii_case(company))
        {
            Some(bucket) => bucket.skills += 1,
            None => buckets.push(CompanyBucket {
                company: company.to_owned(),
                skills: 1,
            }),
        }
    }
    buckets
}
