//! Skill-gap analysis: what peers know that the user does not.

use serde::Serialize;

use super::{DashboardState, Peer, SkillCount, normalize_skill, peer_tally, skill_key};

/// Overall outcome of a gap analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GapStatus {
    /// There are no peers to compare against.
    NoPeers,
    /// Peers exist and the user holds every skill they have.
    FullyMatched,
    /// Peers hold skills the user lacks.
    Gaps,
}

/// One row of the side-by-side comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonRow {
    /// Skill display name.
    pub skill: String,
    /// Peers holding the skill.
    pub peer_count: usize,
    /// Peers plus the user, when the user holds it.
    pub network_count: usize,
    /// Whether the user holds the skill.
    pub have_it: bool,
}

/// Result of comparing the user's skills with their peers'.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillGapReport {
    /// Outcome; distinguishes "no peers" from "nothing missing".
    pub status: GapStatus,
    /// Peer skills the user lacks, most common first.
    pub missing: Vec<SkillCount>,
    /// Union of own and peer skills.
    pub comparison: Vec<ComparisonRow>,
}

/// Compare `own_skills` against `peers`.
///
/// `missing` is sorted by descending peer count with ties in first-seen
/// order. `comparison` is sorted by descending network count, then
/// alphabetically.
pub fn compute_skill_gap<S: AsRef<str>>(own_skills: &[S], peers: &[Peer]) -> SkillGapReport {
    let mut own = Vec::<(String, String)>::new();
    for skill in own_skills {
        let key = skill_key(skill.as_ref());
        if key.is_empty() || own.iter().any(|(seen, _)| *seen == key) {
            continue;
        }
        own.push((key, normalize_skill(skill.as_ref())));
    }

    let tally = peer_tally(peers);
    let holds = |skill: &str| {
        let key = skill_key(skill);
        own.iter().any(|(seen, _)| *seen == key)
    };

    let missing: Vec<SkillCount> = tally
        .ranked()
        .into_iter()
        .filter(|count| !holds(&count.skill))
        .collect();

    let mut comparison: Vec<ComparisonRow> = own
        .iter()
        .map(|(_, display)| {
            let peer_count = tally.count(display);
            ComparisonRow {
                skill: display.clone(),
                peer_count,
                network_count: peer_count + 1,
                have_it: true,
            }
        })
        .collect();
    comparison.extend(missing.iter().map(|count| ComparisonRow {
        skill: count.skill.clone(),
        peer_count: count.count,
        network_count: count.count,
        have_it: false,
    }));
    comparison.sort_by(|a, b| {
        b.network_count
            .cmp(&a.network_count)
            .then_with(|| a.skill.to_lowercase().cmp(&b.skill.to_lowercase()))
    });

    let status = if peers.is_empty() {
        GapStatus::NoPeers
    } else if missing.is_empty() {
        GapStatus::FullyMatched
    } else {
        GapStatus::Gaps
    };

    SkillGapReport {
        status,
        missing,
        comparison,
    }
}

/// Gap analysis for a whole dashboard state.
pub fn skill_gap_for(state: &DashboardState) -> SkillGapReport {
    let own: Vec<&str> = state
        .my_skills
        .iter()
        .map(|entry| entry.skill.as_str())
        .collect();
    compute_skill_gap(&own, &state.peers)
}
