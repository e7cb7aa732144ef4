//! Learning resources recommended to peers.
//!
//! The resource list is append-only. Each resource targets either everyone or
//! one peer by position in the peer list; on the wire the target is the
//! `peerIndex` field with `-1` meaning everyone.

use serde::{Deserialize, Serialize};

/// Author label recorded for resources aimed at every peer.
pub const EVERYONE_AUTHOR: &str = "All";

/// Who a resource is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum ResourceTarget {
    /// Every peer in the network.
    Everyone,
    /// The peer at this position in the peer list.
    Peer(usize),
}

impl ResourceTarget {
    /// Target after the peer at `removed` has been deleted.
    ///
    /// Resources aimed at the removed peer yield `None`; higher indices shift
    /// down by one.
    pub const fn after_peer_removed(self, removed: usize) -> Option<Self> {
        match self {
            Self::Everyone => Some(Self::Everyone),
            Self::Peer(index) if index == removed => None,
            Self::Peer(index) if index > removed => Some(Self::Peer(index - 1)),
            Self::Peer(index) => Some(Self::Peer(index)),
        }
    }

    /// Whether the target refers to a peer that exists among `peer_count`
    /// peers.
    pub const fn is_valid_for(self, peer_count: usize) -> bool {
        match self {
            Self::Everyone => true,
            Self::Peer(index) => index < peer_count,
        }
    }
}

impl From<i64> for ResourceTarget {
    fn from(value: i64) -> Self {
        usize::try_from(value).map_or(Self::Everyone, Self::Peer)
    }
}

impl From<ResourceTarget> for i64 {
    fn from(value: ResourceTarget) -> Self {
        match value {
            ResourceTarget::Everyone => -1,
            ResourceTarget::Peer(index) => i64::try_from(index).unwrap_or(i64::MAX),
        }
    }
}

/// A recorded recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Title; defaults to the URL.
    pub title: String,
    /// Link to the material.
    pub url: String,
    /// Free-text note.
    #[serde(default)]
    pub note: String,
    /// Skill the resource helps with.
    #[serde(default)]
    pub skill: String,
    /// Peer display name, or [`EVERYONE_AUTHOR`].
    #[serde(default)]
    pub author: String,
    /// Target peer.
    pub peer_index: ResourceTarget,
    /// Creation time in epoch milliseconds.
    #[serde(default)]
    pub created: i64,
}

/// User input for a new recommendation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDraft {
    /// Optional title.
    pub title: Option<String>,
    /// Required URL.
    pub url: String,
    /// Free-text note.
    pub note: String,
    /// Skill the resource helps with.
    pub skill: String,
}

impl ResourceDraft {
    /// Draft for `url` with every other field blank.
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Title to record: the trimmed title, or the URL when blank.
    pub fn resolved_title(&self) -> String {
        match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.to_owned(),
            _ => self.url.trim().to_owned(),
        }
    }

    /// Payload sent to a linked peer.
    pub fn to_shared(&self) -> SharedResource {
        SharedResource {
            title: self.resolved_title(),
            url: self.url.trim().to_owned(),
            note: self.note.clone(),
            skill: self.skill.clone(),
        }
    }
}

/// Resource body delivered to another account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedResource {
    /// Title.
    pub title: String,
    /// Link.
    pub url: String,
    /// Note.
    pub note: String,
    /// Skill.
    pub skill: String,
}

/// Criteria for the resource list view. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceFilter {
    /// Exact skill match.
    pub skill: Option<String>,
    /// Peer display name; resources for everyone always pass.
    pub author: Option<String>,
    /// Case-insensitive search over title, skill, author, and note.
    pub query: Option<String>,
}

impl ResourceFilter {
    /// Whether `resource` passes every populated criterion.
    pub fn matches(&self, resource: &Resource) -> bool {
        let skill_ok = non_blank(self.skill.as_deref()).is_none_or(|skill| resource.skill == skill);
        let author_ok = non_blank(self.author.as_deref()).is_none_or(|author| {
            resource.author == author || resource.peer_index == ResourceTarget::Everyone
        });
        let query_ok = non_blank(self.query.as_deref()).is_none_or(|query| {
            let haystack = format!(
                "{} {} {} {}",
                resource.title, resource.skill, resource.author, resource.note
            )
            .to_lowercase();
            haystack.contains(&query.to_lowercase())
        });
        skill_ok && author_ok && query_ok
    }

    /// Matching resources, newest first.
    pub fn apply<'a>(&self, resources: &'a [Resource]) -> Vec<&'a Resource> {
        resources
            .iter()
            .rev()
            .filter(|resource| self.matches(resource))
            .collect()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn resource(title: &str, skill: &str, author: &str, target: ResourceTarget) -> Resource {
        Resource {
            title: title.to_owned(),
            url: format!("https://example.com/{title}"),
            note: String::new(),
            skill: skill.to_owned(),
            author: author.to_owned(),
            peer_index: target,
            created: 0,
        }
    }

    #[rstest]
    #[case(ResourceTarget::Peer(1), None)]
    #[case(ResourceTarget::Peer(2), Some(ResourceTarget::Peer(1)))]
    #[case(ResourceTarget::Peer(0), Some(ResourceTarget::Peer(0)))]
    #[case(ResourceTarget::Everyone, Some(ResourceTarget::Everyone))]
    fn retargets_after_peer_removal(
        #[case] target: ResourceTarget,
        #[case] expected: Option<ResourceTarget>,
    ) {
        assert_eq!(target.after_peer_removed(1), expected);
    }

    #[rstest]
    fn peer_index_uses_minus_one_for_everyone() {
        let value = serde_json::to_value(resource("a", "Go", EVERYONE_AUTHOR, ResourceTarget::Everyone))
            .expect("serialises");
        assert_eq!(value["peerIndex"], json!(-1));
        let parsed: ResourceTarget = serde_json::from_value(json!(-7)).expect("any negative");
        assert_eq!(parsed, ResourceTarget::Everyone);
    }

    #[rstest]
    fn title_falls_back_to_url() {
        let draft = ResourceDraft {
            title: Some("  ".to_owned()),
            ..ResourceDraft::for_url(" https://doc.rust-lang.org ")
        };
        assert_eq!(draft.resolved_title(), "https://doc.rust-lang.org");
    }

    #[rstest]
    fn filter_returns_newest_first_and_keeps_broadcasts_for_authors() {
        let resources = vec![
            resource("book", "Rust", "Ana", ResourceTarget::Peer(0)),
            resource("talk", "Go", EVERYONE_AUTHOR, ResourceTarget::Everyone),
            resource("blog", "Rust", "Ben", ResourceTarget::Peer(1)),
        ];
        let filter = ResourceFilter {
            author: Some("Ana".to_owned()),
            ..ResourceFilter::default()
        };
        let titles: Vec<_> = filter
            .apply(&resources)
            .into_iter()
            .map(|r| r.title.as_str())
            .collect();
        assert_eq!(titles, vec!["talk", "book"]);
    }

    #[rstest]
    #[case(Some("Rust"), None, 2)]
    #[case(None, Some("BLOG"), 1)]
    #[case(Some("Rust"), Some("ana"), 1)]
    #[case(None, Some("nothing"), 0)]
    fn filter_combines_skill_and_query(
        #[case] skill: Option<&str>,
        #[case] query: Option<&str>,
        #[case] expected: usize,
    ) {
        let resources = vec![
            resource("book", "Rust", "Ana", ResourceTarget::Peer(0)),
            resource("talk", "Go", EVERYONE_AUTHOR, ResourceTarget::Everyone),
            resource("blog", "Rust", "Ben", ResourceTarget::Peer(1)),
        ];
        let filter = ResourceFilter {
            skill: skill.map(str::to_owned),
            author: None,
            query: query.map(str::to_owned),
        };
        assert_eq!(filter.apply(&resources).len(), expected);
    }
}
