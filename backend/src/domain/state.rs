//! The per-user dashboard state and its mutations.
//!
//! [`DashboardState`] is an explicit value owned by whoever drives a session;
//! there is no module-level singleton. Every mutation keeps the resource
//! target invariant: no resource refers to a peer index that does not exist.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{
    Error, EVERYONE_AUTHOR, Peer, Profile, Resource, ResourceDraft, ResourceFilter,
    ResourceTarget, SkillEntry, parse_skill_list, skill_key,
};

/// Failures raised by [`DashboardState`] mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardStateError {
    /// No skill exists at the index.
    SkillIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of skills held.
        len: usize,
    },
    /// No peer exists at the index.
    PeerIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of peers held.
        len: usize,
    },
    /// The company name was blank.
    BlankCompany,
    /// The company is not registered on the profile.
    UnknownCompany {
        /// Requested company.
        company: String,
    },
    /// The resource URL was blank.
    BlankResourceUrl,
}

impl fmt::Display for DashboardStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SkillIndexOutOfRange { index, len } => {
                write!(f, "skill {index} does not exist ({len} skills held)")
            }
            Self::PeerIndexOutOfRange { index, len } => {
                write!(f, "peer {index} does not exist ({len} peers held)")
            }
            Self::BlankCompany => write!(f, "company name must not be empty"),
            Self::UnknownCompany { company } => write!(f, "company {company} is not listed"),
            Self::BlankResourceUrl => write!(f, "resource url must not be empty"),
        }
    }
}

impl std::error::Error for DashboardStateError {}

impl From<DashboardStateError> for Error {
    fn from(value: DashboardStateError) -> Self {
        match value {
            DashboardStateError::SkillIndexOutOfRange { .. }
            | DashboardStateError::PeerIndexOutOfRange { .. }
            | DashboardStateError::UnknownCompany { .. } => Self::not_found(value.to_string()),
            DashboardStateError::BlankCompany | DashboardStateError::BlankResourceUrl => {
                Self::invalid_request(value.to_string())
            }
        }
    }
}

/// Everything the dashboard shows for one user.
///
/// Serialises to the camelCase shape the state API stores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardState {
    /// Profile card.
    pub profile: Profile,
    /// The user's own skills.
    pub my_skills: Vec<SkillEntry>,
    /// Network peers.
    pub peers: Vec<Peer>,
    /// Recorded recommendations, oldest first.
    pub resources: Vec<Resource>,
}

impl DashboardState {
    /// Update the profile name and headline.
    pub fn update_profile(&mut self, name: &str, meta: &str) {
        self.profile.name = name.trim().to_owned();
        self.profile.meta = meta.trim().to_owned();
    }

    /// Replace or clear the avatar.
    pub fn set_avatar(&mut self, avatar: Option<String>) {
        self.profile.avatar = avatar.filter(|value| !value.trim().is_empty());
    }

    /// Register a company on the profile.
    ///
    /// Returns `Ok(false)` when the company is already listed under any
    /// casing.
    pub fn add_company(&mut self, name: &str) -> Result<bool, DashboardStateError> {
        if name.trim().is_empty() {
            return Err(DashboardStateError::BlankCompany);
        }
        Ok(self.profile.add_company(name))
    }

    /// Remove a company and every skill tagged with it.
    ///
    /// Returns the number of skills removed alongside the company.
    pub fn remove_company(&mut self, name: &str) -> Result<usize, DashboardStateError> {
        let removed = self
            .profile
            .remove_company(name)
            .ok_or_else(|| DashboardStateError::UnknownCompany {
                company: name.trim().to_owned(),
            })?;
        let before = self.my_skills.len();
        self.my_skills
            .retain(|entry| !entry.company.trim().eq_ignore_ascii_case(&removed));
        Ok(before - self.my_skills.len())
    }

    /// Add comma-separated skills tagged with `company`.
    ///
    /// Skills already held under any casing are skipped. A non-blank company
    /// is registered on the profile and the stored spelling is used as the
    /// tag. Returns the number of skills added.
    pub fn add_skills(&mut self, raw_input: &str, company: &str) -> usize {
        let company_tag = if company.trim().is_empty() {
            String::new()
        } else {
            self.profile.add_company(company);
            self.profile
                .find_company(company)
                .map_or_else(|| company.trim().to_owned(), str::to_owned)
        };

        let mut added = 0;
        for skill in parse_skill_list(raw_input) {
            if self.has_skill(&skill) {
                continue;
            }
            self.my_skills.push(SkillEntry::new(&skill, company_tag.clone()));
            added += 1;
        }
        added
    }

    /// Whether the user holds `skill` under any casing or spacing.
    pub fn has_skill(&self, skill: &str) -> bool {
        let key = skill_key(skill);
        self.my_skills.iter().any(|entry| entry.key() == key)
    }

    /// Remove the skill at `index`.
    pub fn remove_skill(&mut self, index: usize) -> Result<SkillEntry, DashboardStateError> {
        if index >= self.my_skills.len() {
            return Err(DashboardStateError::SkillIndexOutOfRange {
                index,
                len: self.my_skills.len(),
            });
        }
        Ok(self.my_skills.remove(index))
    }

    /// Remove the peer at `index` and re-target resources.
    ///
    /// Resources aimed at the removed peer are dropped; resources aimed at
    /// later peers move down by one.
    pub fn remove_peer(&mut self, index: usize) -> Result<Peer, DashboardStateError> {
        if index >= self.peers.len() {
            return Err(DashboardStateError::PeerIndexOutOfRange {
                index,
                len: self.peers.len(),
            });
        }
        let peer = self.peers.remove(index);
        self.resources = std::mem::take(&mut self.resources)
            .into_iter()
            .filter_map(|mut resource| {
                resource.peer_index = resource.peer_index.after_peer_removed(index)?;
                Some(resource)
            })
            .collect();
        Ok(peer)
    }

    /// Record a recommendation created at `created_ms` (epoch milliseconds).
    pub fn add_resource(
        &mut self,
        draft: &ResourceDraft,
        target: ResourceTarget,
        created_ms: i64,
    ) -> Result<Resource, DashboardStateError> {
        let url = draft.url.trim();
        if url.is_empty() {
            return Err(DashboardStateError::BlankResourceUrl);
        }
        let author = match target {
            ResourceTarget::Everyone => EVERYONE_AUTHOR.to_owned(),
            ResourceTarget::Peer(index) => self
                .peers
                .get(index)
                .map(|peer| peer.display_name(index))
                .ok_or(DashboardStateError::PeerIndexOutOfRange {
                    index,
                    len: self.peers.len(),
                })?,
        };
        let resource = Resource {
            title: draft.resolved_title(),
            url: url.to_owned(),
            note: draft.note.trim().to_owned(),
            skill: draft.skill.trim().to_owned(),
            author,
            peer_index: target,
            created: created_ms,
        };
        self.resources.push(resource.clone());
        Ok(resource)
    }

    /// Resources matching `filter`, newest first.
    pub fn filter_resources(&self, filter: &ResourceFilter) -> Vec<&Resource> {
        filter.apply(&self.resources)
    }

    /// Whether every resource targets an existing peer.
    pub fn resource_targets_are_valid(&self) -> bool {
        let peer_count = self.peers.len();
        self.resources
            .iter()
            .all(|resource| resource.peer_index.is_valid_for(peer_count))
    }
}
