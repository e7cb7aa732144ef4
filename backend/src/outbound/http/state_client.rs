//! Reqwest-backed client for the dashboard state API.
//!
//! One client serves four ports: saved state, the peer directory, skill match
//! scores, and cross-account resource delivery.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::debug;

use super::dto::{
    PeerRequestBody, PeerRequestDto, RecommendBody, RemovePeerBody, RespondBody, SaveStateBody,
    UserSearchDto,
};
use super::error::{HttpFailure, endpoint, map_transport_error, read_body, read_json};
use crate::domain::ports::{
    PeerDirectory, PeerDirectoryError, ResourceDelivery, ResourceDeliveryError, SkillMatchSource,
    SkillMatchSourceError, StateStore, StateStoreError,
};
use crate::domain::{
    DashboardState, PeerRequest, PeerRequestAction, SharedResource, SkillMatch, UserId,
    UserSummary,
};

/// Client for the state API rooted at one base URL.
#[derive(Debug, Clone)]
pub struct StateApiClient {
    client: Client,
    base: Url,
}

impl StateApiClient {
    /// Build a client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    fn url<E: HttpFailure>(&self, segments: &[&str]) -> Result<Url, E> {
        endpoint(&self.base, segments)
    }

    async fn get_json<T, E>(&self, url: Url) -> Result<T, E>
    where
        T: serde::de::DeserializeOwned + Send,
        E: HttpFailure,
    {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_transport_error::<E>)?;
        read_json(response).await
    }

    async fn post_ack<B, E>(&self, url: Url, body: &B) -> Result<(), E>
    where
        B: serde::Serialize + Sync,
        E: HttpFailure,
    {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(map_transport_error::<E>)?;
        read_body::<E>(response).await.map(drop)
    }
}

#[async_trait]
impl StateStore for StateApiClient {
    async fn load(&self, user: UserId) -> Result<Value, StateStoreError> {
        let id = user.to_string();
        let url = self.url::<StateStoreError>(&["api", "state", &id])?;
        debug!(user = %user, "loading dashboard state");
        self.get_json(url).await
    }

    async fn save(&self, user: UserId, state: &DashboardState) -> Result<(), StateStoreError> {
        let url = self.url::<StateStoreError>(&["api", "state", "save"])?;
        debug!(
            user = %user,
            skills = state.my_skills.len(),
            peers = state.peers.len(),
            resources = state.resources.len(),
            "saving dashboard state"
        );
        self.post_ack(url, &SaveStateBody {
            user_id: user,
            state,
        })
        .await
    }
}

#[async_trait]
impl PeerDirectory for StateApiClient {
    async fn search(&self, query: &str) -> Result<Option<UserSummary>, PeerDirectoryError> {
        let mut url = self.url::<PeerDirectoryError>(&["api", "users", "search"])?;
        url.query_pairs_mut().append_pair("q", query);
        let found: Option<UserSearchDto> =
            self.get_json::<_, PeerDirectoryError>(url).await?;
        Ok(found.map(UserSearchDto::into_domain))
    }

    async fn send_request(
        &self,
        sender: UserId,
        receiver_email: &str,
    ) -> Result<(), PeerDirectoryError> {
        let url = self.url::<PeerDirectoryError>(&["api", "peers", "request"])?;
        self.post_ack(url, &PeerRequestBody {
            sender_id: sender,
            receiver_email,
        })
        .await
    }

    async fn pending_requests(&self, user: UserId) -> Result<Vec<PeerRequest>, PeerDirectoryError> {
        let id = user.to_string();
        let url = self.url::<PeerDirectoryError>(&["api", "peers", "requests", &id])?;
        let requests: Vec<PeerRequestDto> =
            self.get_json::<_, PeerDirectoryError>(url).await?;
        Ok(requests
            .into_iter()
            .map(PeerRequestDto::into_domain)
            .collect())
    }

    async fn respond(
        &self,
        request_id: u64,
        action: PeerRequestAction,
    ) -> Result<(), PeerDirectoryError> {
        let url = self.url::<PeerDirectoryError>(&["api", "peers", "respond"])?;
        self.post_ack(url, &RespondBody { request_id, action }).await
    }

    async fn remove(&self, user: UserId, peer_id: u64) -> Result<(), PeerDirectoryError> {
        let url = self.url::<PeerDirectoryError>(&["api", "peers", "remove"])?;
        self.post_ack(url, &RemovePeerBody {
            user_id: user,
            peer_id,
        })
        .await
    }
}

#[async_trait]
impl SkillMatchSource for StateApiClient {
    async fn fetch(&self, user: UserId) -> Result<SkillMatch, SkillMatchSourceError> {
        let id = user.to_string();
        let url = self.url::<SkillMatchSourceError>(&["api", "skill-match", &id])?;
        self.get_json(url).await
    }
}

#[async_trait]
impl ResourceDelivery for StateApiClient {
    async fn recommend(
        &self,
        sender: UserId,
        receiver: UserId,
        resource: &SharedResource,
    ) -> Result<(), ResourceDeliveryError> {
        let url = self.url::<ResourceDeliveryError>(&["api", "resources", "recommend"])?;
        debug!(sender = %sender, receiver = %receiver, url = %resource.url, "delivering resource");
        self.post_ack(url, &RecommendBody {
            sender_id: sender,
            receiver_id: receiver,
            resource,
        })
        .await
    }
}
