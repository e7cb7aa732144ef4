//! Migration of persisted dashboard state into the canonical shape.
//!
//! Stored states were written by several generations of the dashboard. The
//! migrator accepts all of them and produces a [`DashboardState`] before any
//! other component sees the data:
//!
//! - skills stored as bare strings become `{skill, company: ""}` entries;
//! - `profile.companies` stored as an array, a JSON-encoded array string, or a
//!   plain string becomes an array, and a legacy singular `profile.company` is
//!   folded into it;
//! - peer companies stored as arrays are joined into one comma-separated
//!   string, and peer skills stored as objects are reduced to names;
//! - resources whose skill is an object keep only the name, and a missing or
//!   negative `peerIndex` targets everyone.
//!
//! Migration never renames a skill and never drops a record that carries
//! data. It is idempotent: migrating the serialised output again yields the
//! same state.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{DashboardState, Peer, Profile, Resource, ResourceTarget, SkillRecord, UserId};

/// Failures raised when persisted state cannot be interpreted at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationError {
    /// The top-level value is not an object.
    NotAnObject {
        /// JSON type that was found instead.
        found: &'static str,
    },
    /// A section has a type no historical shape ever used.
    Malformed {
        /// Decoder message.
        message: String,
    },
}

impl fmt::Display for MigrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnObject { found } => {
                write!(f, "persisted state must be a JSON object, found {found}")
            }
            Self::Malformed { message } => write!(f, "persisted state is malformed: {message}"),
        }
    }
}

impl std::error::Error for MigrationError {}

/// Counters describing which repairs a migration applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Own skills converted from the bare-string form.
    pub legacy_skills: usize,
    /// Whether the singular `profile.company` was folded into `companies`.
    pub folded_company: bool,
    /// Company lists decoded from a string encoding.
    pub decoded_company_lists: usize,
    /// Peer skills reduced from object form to names.
    pub peer_skill_objects: usize,
    /// Resources whose peer index pointed past the peer list.
    pub retargeted_resources: usize,
    /// Records discarded because they carried no usable data.
    pub discarded_records: usize,
}

impl MigrationReport {
    /// Whether the input was already canonical.
    pub const fn is_clean(&self) -> bool {
        self.legacy_skills == 0
            && !self.folded_company
            && self.decoded_company_lists == 0
            && self.peer_skill_objects == 0
            && self.retargeted_resources == 0
            && self.discarded_records == 0
    }
}

/// Canonical state plus the repairs applied to reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigratedState {
    /// The canonical state.
    pub state: DashboardState,
    /// Repairs applied.
    pub report: MigrationReport,
}

/// Migrate a persisted state in any historical shape.
///
/// `null` (a user with nothing saved yet) yields an empty state.
///
/// # Examples
/// ```
/// use peerdesk::domain::migrate_state;
/// use serde_json::json;
///
/// let migrated = migrate_state(json!({
///     "profile": { "company": "Acme", "companies": [] },
///     "mySkills": ["Go"]
/// }))
/// .expect("legacy shapes migrate");
///
/// assert_eq!(migrated.state.profile.companies, vec!["Acme"]);
/// assert_eq!(migrated.state.my_skills[0].skill, "Go");
/// assert_eq!(migrated.state.my_skills[0].company, "");
/// ```
pub fn migrate_state(raw: Value) -> Result<MigratedState, MigrationError> {
    let persisted = match raw {
        Value::Null => PersistedState::default(),
        Value::Object(_) => serde_json::from_value::<PersistedState>(raw).map_err(|error| {
            MigrationError::Malformed {
                message: error.to_string(),
            }
        })?,
        other => {
            return Err(MigrationError::NotAnObject {
                found: json_type_name(&other),
            });
        }
    };

    let mut report = MigrationReport::default();
    let state = persisted.into_canonical(&mut report);
    if report.is_clean() {
        debug!("persisted state already canonical");
    } else {
        info!(
            legacy_skills = report.legacy_skills,
            folded_company = report.folded_company,
            decoded_company_lists = report.decoded_company_lists,
            peer_skill_objects = report.peer_skill_objects,
            retargeted_resources = report.retargeted_resources,
            discarded_records = report.discarded_records,
            "migrated persisted state"
        );
    }
    Ok(MigratedState { state, report })
}

const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PersistedState {
    profile: Option<PersistedProfile>,
    my_skills: Option<Vec<SkillRecord>>,
    peers: Option<Vec<PersistedPeer>>,
    resources: Option<Vec<PersistedResource>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PersistedProfile {
    name: Option<String>,
    meta: Option<String>,
    avatar: Option<String>,
    companies: Option<CompanyList>,
    company: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CompanyList {
    Many(Vec<Option<String>>),
    Encoded(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompanyListForm {
    Array,
    EncodedArray,
    PlainText,
}

impl CompanyList {
    fn into_names(self) -> (Vec<String>, CompanyListForm) {
        match self {
            Self::Many(names) => (
                clean_names(names.into_iter().flatten()),
                CompanyListForm::Array,
            ),
            Self::Encoded(text) => match decode_encoded_list(&text) {
                Some(names) => (clean_names(names), CompanyListForm::EncodedArray),
                None => (clean_names(std::iter::once(text)), CompanyListForm::PlainText),
            },
        }
    }
}

fn decode_encoded_list(text: &str) -> Option<Vec<String>> {
    let trimmed = text.trim();
    if !trimmed.starts_with('[') {
        return None;
    }
    serde_json::from_str::<Vec<Option<String>>>(trimmed)
        .ok()
        .map(|names| names.into_iter().flatten().collect())
}

fn clean_names(names: impl IntoIterator<Item = String>) -> Vec<String> {
    names
        .into_iter()
        .map(|name| name.trim().to_owned())
        .filter(|name| !name.is_empty())
        .collect()
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PersistedPeer {
    id: Option<Value>,
    name: Option<String>,
    company: Option<CompanyList>,
    skills: Option<Vec<SkillRecord>>,
    #[serde(alias = "linked_id")]
    linked_id: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PersistedResource {
    title: Option<String>,
    url: Option<String>,
    note: Option<String>,
    skill: Option<SkillRecord>,
    author: Option<String>,
    #[serde(alias = "peer_index")]
    peer_index: Option<Value>,
    created: Option<Value>,
}

impl PersistedState {
    fn into_canonical(self, report: &mut MigrationReport) -> DashboardState {
        let profile = self
            .profile
            .unwrap_or_default()
            .into_canonical(report);

        let mut my_skills = Vec::new();
        for record in self.my_skills.unwrap_or_default() {
            let legacy = record.is_legacy();
            match record.into_entry() {
                Some(entry) => {
                    if legacy {
                        report.legacy_skills += 1;
                    }
                    my_skills.push(entry);
                }
                None => report.discarded_records += 1,
            }
        }

        let peers: Vec<Peer> = self
            .peers
            .unwrap_or_default()
            .into_iter()
            .map(|peer| peer.into_canonical(report))
            .collect();

        let peer_count = peers.len();
        let resources = self
            .resources
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(position, resource)| resource.into_canonical(position, peer_count, report))
            .collect();

        DashboardState {
            profile,
            my_skills,
            peers,
            resources,
        }
    }
}

impl PersistedProfile {
    fn into_canonical(self, report: &mut MigrationReport) -> Profile {
        let (companies, form) = self
            .companies
            .map_or((Vec::new(), CompanyListForm::Array), CompanyList::into_names);
        if form != CompanyListForm::Array {
            report.decoded_company_lists += 1;
        }

        let mut profile = Profile {
            name: self.name.unwrap_or_default(),
            meta: self.meta.unwrap_or_default(),
            avatar: self.avatar.filter(|avatar| !avatar.trim().is_empty()),
            companies: Vec::new(),
        };
        for company in &companies {
            profile.add_company(company);
        }
        if let Some(singular) = self.company {
            report.folded_company = profile.add_company(&singular);
        }
        profile
    }
}

impl PersistedPeer {
    fn into_canonical(self, report: &mut MigrationReport) -> Peer {
        let company = match self.company {
            Some(list) => {
                let (names, form) = list.into_names();
                if form == CompanyListForm::EncodedArray {
                    report.decoded_company_lists += 1;
                }
                names.join(", ")
            }
            None => String::new(),
        };

        let mut skills = Vec::new();
        for record in self.skills.unwrap_or_default() {
            if matches!(record, SkillRecord::Modern { .. }) {
                report.peer_skill_objects += 1;
            }
            match record.into_name() {
                Some(name) => skills.push(name),
                None => report.discarded_records += 1,
            }
        }

        let linked_id = self.linked_id.as_ref().and_then(|value| {
            let coerced = UserId::coerce(value);
            if coerced.is_none() && !value.is_null() {
                warn!(linked_id = %value, "ignoring unusable peer account link");
            }
            coerced
        });

        Peer {
            id: self.id.as_ref().and_then(coerce_u64),
            name: self.name.unwrap_or_default(),
            company,
            skills,
            linked_id,
        }
    }
}

impl PersistedResource {
    fn into_canonical(
        self,
        position: usize,
        peer_count: usize,
        report: &mut MigrationReport,
    ) -> Resource {
        let mut target = self
            .peer_index
            .as_ref()
            .and_then(coerce_i64)
            .map_or(ResourceTarget::Everyone, ResourceTarget::from);
        if !target.is_valid_for(peer_count) {
            warn!(
                resource = position,
                ?target,
                peer_count,
                "resource targets a missing peer; retargeting to everyone"
            );
            report.retargeted_resources += 1;
            target = ResourceTarget::Everyone;
        }

        let url = self.url.unwrap_or_default();
        let title = self
            .title
            .filter(|title| !title.trim().is_empty())
            .unwrap_or_else(|| url.clone());
        Resource {
            title,
            url,
            note: self.note.unwrap_or_default(),
            skill: self
                .skill
                .and_then(SkillRecord::into_name)
                .unwrap_or_default(),
            author: self.author.unwrap_or_default(),
            peer_index: target,
            created: self.created.as_ref().and_then(coerce_i64).unwrap_or_default(),
        }
    }
}

fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float.trunc() as i64)),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_u64(value: &Value) -> Option<u64> {
    coerce_i64(value).and_then(|number| u64::try_from(number).ok())
}
