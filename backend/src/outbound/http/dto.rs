//! Wire DTOs for the state API and the bookings API.
//!
//! Request bodies borrow from domain values; response bodies decode into
//! these shapes first and map into domain records in one pass.

use serde::{Deserialize, Serialize};

use crate::domain::ports::CreatedBooking;
use crate::domain::{
    DashboardState, PeerRequest, PeerRequestAction, SharedResource, SkillEntry, SkillRecord,
    StoredBooking, UserId, UserSummary,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SaveStateBody<'a> {
    pub(super) user_id: UserId,
    #[serde(flatten)]
    pub(super) state: &'a DashboardState,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PeerRequestBody<'a> {
    pub(super) sender_id: UserId,
    pub(super) receiver_email: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RespondBody {
    pub(super) request_id: u64,
    pub(super) action: PeerRequestAction,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RemovePeerBody {
    pub(super) user_id: UserId,
    pub(super) peer_id: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RecommendBody<'a> {
    pub(super) sender_id: UserId,
    pub(super) receiver_id: UserId,
    pub(super) resource: &'a SharedResource,
}

/// Company column as the state API returns it: usually a list, sometimes a
/// single legacy string or nothing.
#[derive(Debug, Default, Deserialize)]
#[serde(untagged)]
pub(super) enum CompaniesDto {
    Many(Vec<String>),
    One(String),
    #[default]
    None,
}

impl CompaniesDto {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::Many(companies) => companies,
            Self::One(company) if !company.trim().is_empty() => vec![company],
            Self::One(_) | Self::None => Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct UserSearchDto {
    pub(super) id: UserId,
    #[serde(default)]
    pub(super) name: Option<String>,
    #[serde(default)]
    pub(super) company: CompaniesDto,
    #[serde(default)]
    pub(super) skills: Vec<SkillRecord>,
}

impl UserSearchDto {
    pub(super) fn into_domain(self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.unwrap_or_default(),
            companies: self.company.into_vec(),
            skills: self
                .skills
                .into_iter()
                .filter_map(SkillRecord::into_entry)
                .collect::<Vec<SkillEntry>>(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct PeerRequestDto {
    pub(super) id: u64,
    #[serde(default)]
    pub(super) email: String,
    #[serde(default)]
    pub(super) name: Option<String>,
    #[serde(default)]
    pub(super) company: CompaniesDto,
}

impl PeerRequestDto {
    pub(super) fn into_domain(self) -> PeerRequest {
        let name = self
            .name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| self.email.clone());
        PeerRequest {
            id: self.id,
            email: self.email,
            name,
            companies: self.company.into_vec(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct CancelBookingBody<'a> {
    pub(super) reason_id: &'a str,
    pub(super) reason: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreatedBookingDto {
    pub(super) booking: CreatedBooking,
}

#[derive(Debug, Deserialize)]
pub(super) struct BookingDto {
    pub(super) booking: StoredBooking,
}

#[derive(Debug, Deserialize)]
pub(super) struct BookingListDto {
    #[serde(default)]
    pub(super) bookings: Vec<StoredBooking>,
}
