//! Peers in the user's network and the peer-request workflow.

use serde::{Deserialize, Serialize};

use super::{SkillEntry, UserId};

/// Another person in the user's network.
///
/// `linked_id` is present only when the peer is backed by a real account,
/// which is what allows resources to be delivered to them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Peer {
    /// Row identifier of the peer relationship, when persisted server-side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Comma-separated companies.
    #[serde(default)]
    pub company: String,
    /// Skill names, not normalised.
    #[serde(default)]
    pub skills: Vec<String>,
    /// Account the peer is linked to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_id: Option<UserId>,
}

impl Peer {
    /// Name used when attributing resources to this peer.
    ///
    /// Falls back to `Peer <n>` (one-based) for unnamed peers.
    pub fn display_name(&self, index: usize) -> String {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            format!("Peer {}", index + 1)
        } else {
            trimmed.to_owned()
        }
    }
}

/// A registered user returned by the directory search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    /// Account identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Companies listed on the account.
    pub companies: Vec<String>,
    /// Skills listed on the account.
    pub skills: Vec<SkillEntry>,
}

/// An incoming peer request awaiting a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerRequest {
    /// Request identifier used when responding.
    pub id: u64,
    /// Sender's e-mail address.
    pub email: String,
    /// Sender's display name.
    pub name: String,
    /// Sender's companies.
    pub companies: Vec<String>,
}

/// Response to a pending [`PeerRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeerRequestAction {
    /// Accept; both users become peers.
    Accept,
    /// Reject; the request is discarded.
    Reject,
}

impl PeerRequestAction {
    /// Wire name of the action.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
        }
    }
}
