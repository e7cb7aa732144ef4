//! Dashboard session service.
//!
//! A [`DashboardSession`] holds one user's [`DashboardState`] and keeps it in
//! step with the remote state store. Mutations are applied to a copy, saved,
//! and only then committed, so a failed save leaves the held state exactly as
//! it was. Saves replace the whole document (last write wins).

use std::sync::Arc;

use mockable::Clock;
use tracing::{debug, warn};

use super::ports::{
    FixturePeerDirectory, FixtureResourceDelivery, FixtureSkillMatchSource, PeerDirectory,
    PeerDirectoryError, ResourceDelivery, ResourceDeliveryError, SkillMatchSource,
    SkillMatchSourceError, StateStore, StateStoreError,
};
use super::{
    CancellableTask, DashboardState, DashboardStateError, Error, MigratedState, MigrationReport,
    Peer, PeerRequest, PeerRequestAction, Resource, ResourceDraft, ResourceFilter,
    ResourceTarget, SkillCount, SkillEntry, SkillGapReport, SkillMatch, UserId, UserSummary,
    migrate_state, skill_gap_for, trending_skills,
};

/// Remote collaborators behind the peer network features.
#[derive(Clone)]
pub struct PeerNetwork {
    /// User search and peer requests.
    pub directory: Arc<dyn PeerDirectory>,
    /// Match score against top skills.
    pub skill_match: Arc<dyn SkillMatchSource>,
    /// Cross-account recommendations.
    pub delivery: Arc<dyn ResourceDelivery>,
}

impl Default for PeerNetwork {
    fn default() -> Self {
        Self {
            directory: Arc::new(FixturePeerDirectory),
            skill_match: Arc::new(FixtureSkillMatchSource),
            delivery: Arc::new(FixtureResourceDelivery),
        }
    }
}

/// One user's dashboard, bound to its remote store.
pub struct DashboardSession<S> {
    user: UserId,
    state: DashboardState,
    store: Arc<S>,
    network: PeerNetwork,
    clock: Arc<dyn Clock>,
}

/// Fetch and migrate the stored state for `user`.
async fn fetch_state<S>(store: &S, user: UserId) -> Result<MigratedState, Error>
where
    S: StateStore + ?Sized,
{
    let raw = store.load(user).await.map_err(map_store_error)?;
    let migrated = migrate_state(raw).map_err(|err| {
        Error::internal(format!("stored state for user {user} is unusable: {err}"))
    })?;
    debug!(user = user.get(), clean = migrated.report.is_clean(), "loaded dashboard state");
    Ok(migrated)
}

fn map_store_error(error: StateStoreError) -> Error {
    match error {
        StateStoreError::Transport { message } | StateStoreError::Timeout { message } => {
            Error::service_unavailable(format!("state store unavailable: {message}"))
        }
        StateStoreError::Rejected { status: 404, message } => {
            Error::not_found(format!("no stored state: {message}"))
        }
        StateStoreError::Rejected { status, message } => Error::service_unavailable(format!(
            "state store rejected the request ({status}): {message}"
        )),
        StateStoreError::Decode { message } => {
            Error::internal(format!("state store returned malformed data: {message}"))
        }
    }
}

fn map_directory_error(error: PeerDirectoryError) -> Error {
    match error {
        PeerDirectoryError::Transport { message } | PeerDirectoryError::Timeout { message } => {
            Error::service_unavailable(format!("peer directory unavailable: {message}"))
        }
        PeerDirectoryError::NotFound { message } => Error::not_found(message),
        PeerDirectoryError::Rejected { status: 409, message } => Error::conflict(message),
        PeerDirectoryError::Rejected { status, message } if status < 500 => {
            Error::invalid_request(message)
        }
        PeerDirectoryError::Rejected { status, message } => Error::service_unavailable(format!(
            "peer directory failed ({status}): {message}"
        )),
        PeerDirectoryError::Decode { message } => {
            Error::internal(format!("peer directory returned malformed data: {message}"))
        }
    }
}

fn map_skill_match_error(error: SkillMatchSourceError) -> Error {
    match error {
        SkillMatchSourceError::Transport { message }
        | SkillMatchSourceError::Timeout { message } => {
            Error::service_unavailable(format!("skill match unavailable: {message}"))
        }
        SkillMatchSourceError::Rejected { status, message } => Error::service_unavailable(
            format!("skill match rejected the request ({status}): {message}"),
        ),
        SkillMatchSourceError::Decode { message } => {
            Error::internal(format!("skill match returned malformed data: {message}"))
        }
    }
}

fn map_delivery_error(error: ResourceDeliveryError) -> Error {
    match error {
        ResourceDeliveryError::Transport { message } | ResourceDeliveryError::Timeout { message } => {
            Error::service_unavailable(format!("resource delivery unavailable: {message}"))
        }
        ResourceDeliveryError::Rejected { status: 404, message } => Error::not_found(message),
        ResourceDeliveryError::Rejected { status, message } if status < 500 => {
            Error::invalid_request(message)
        }
        ResourceDeliveryError::Rejected { status, message } => Error::service_unavailable(
            format!("resource delivery failed ({status}): {message}"),
        ),
    }
}

impl<S> DashboardSession<S> {
    /// Session for `user` starting from an empty state; call
    /// [`load`](Self::load) to fetch the stored one.
    pub fn new(user: UserId, store: Arc<S>, network: PeerNetwork, clock: Arc<dyn Clock>) -> Self {
        Self {
            user,
            state: DashboardState::default(),
            store,
            network,
            clock,
        }
    }

    /// Owner of the session.
    pub fn user(&self) -> UserId {
        self.user
    }

    /// Current state.
    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Replace the held state with a loaded one.
    pub fn apply_loaded(&mut self, migrated: MigratedState) -> MigrationReport {
        self.state = migrated.state;
        migrated.report
    }

    /// Skills ranked by how many people in the network hold them.
    pub fn trending(&self, limit: usize) -> Vec<SkillCount> {
        trending_skills(&self.state, limit)
    }

    /// Skills peers have that the user lacks.
    pub fn skill_gap(&self) -> SkillGapReport {
        skill_gap_for(&self.state)
    }

    /// Resources matching `filter`, newest first.
    pub fn resources(&self, filter: &ResourceFilter) -> Vec<&Resource> {
        self.state.filter_resources(filter)
    }
}

impl<S> DashboardSession<S>
where
    S: StateStore,
{
    /// Fetch, migrate, and hold the stored state.
    ///
    /// On failure the held state is left unchanged.
    pub async fn load(&mut self) -> Result<MigrationReport, Error> {
        let migrated = fetch_state(self.store.as_ref(), self.user).await?;
        Ok(self.apply_loaded(migrated))
    }

    /// Save the held state.
    pub async fn save(&self) -> Result<(), Error> {
        self.store
            .save(self.user, &self.state)
            .await
            .map_err(map_store_error)
    }

    /// Apply `mutate` to a copy of the state, save the copy, then keep it.
    async fn commit<T, F>(&mut self, mutate: F) -> Result<T, Error>
    where
        F: FnOnce(&mut DashboardState) -> Result<T, DashboardStateError>,
    {
        let mut next = self.state.clone();
        let outcome = mutate(&mut next)?;
        self.store
            .save(self.user, &next)
            .await
            .map_err(map_store_error)?;
        self.state = next;
        Ok(outcome)
    }

    /// Update the profile name and headline.
    pub async fn update_profile(&mut self, name: &str, meta: &str) -> Result<(), Error> {
        self.commit(|state| {
            state.update_profile(name, meta);
            Ok(())
        })
        .await
    }

    /// Replace or clear the avatar.
    pub async fn set_avatar(&mut self, avatar: Option<String>) -> Result<(), Error> {
        self.commit(|state| {
            state.set_avatar(avatar);
            Ok(())
        })
        .await
    }

    /// Register a company; `false` when it was already listed.
    pub async fn add_company(&mut self, name: &str) -> Result<bool, Error> {
        self.commit(|state| state.add_company(name)).await
    }

    /// Remove a company and its skills; returns the number of skills removed.
    pub async fn remove_company(&mut self, name: &str) -> Result<usize, Error> {
        self.commit(|state| state.remove_company(name)).await
    }

    /// Add comma-separated skills tagged with `company`.
    pub async fn add_skills(&mut self, raw_input: &str, company: &str) -> Result<usize, Error> {
        self.commit(|state| Ok(state.add_skills(raw_input, company)))
            .await
    }

    /// Remove the skill at `index`.
    pub async fn remove_skill(&mut self, index: usize) -> Result<SkillEntry, Error> {
        self.commit(|state| state.remove_skill(index)).await
    }

    /// Remove the peer at `index` from the dashboard.
    pub async fn remove_peer(&mut self, index: usize) -> Result<Peer, Error> {
        self.commit(|state| state.remove_peer(index)).await
    }

    /// Record a recommendation for `target`.
    ///
    /// When the target peer has a linked account the resource is delivered
    /// there first and only recorded once delivery succeeds.
    pub async fn recommend(
        &mut self,
        draft: &ResourceDraft,
        target: ResourceTarget,
    ) -> Result<Resource, Error> {
        if draft.url.trim().is_empty() {
            return Err(DashboardStateError::BlankResourceUrl.into());
        }
        if let ResourceTarget::Peer(index) = target {
            let peer = self.state.peers.get(index).ok_or_else(|| {
                DashboardStateError::PeerIndexOutOfRange {
                    index,
                    len: self.state.peers.len(),
                }
            })?;
            if let Some(receiver) = peer.linked_id {
                self.network
                    .delivery
                    .recommend(self.user, receiver, &draft.to_shared())
                    .await
                    .map_err(|err| {
                        warn!(
                            user = self.user.get(),
                            receiver = receiver.get(),
                            kind = err.kind(),
                            error = %err,
                            "resource delivery failed"
                        );
                        map_delivery_error(err)
                    })?;
                debug!(user = self.user.get(), receiver = receiver.get(), "resource delivered");
            }
        }
        let created_ms = self.clock.utc().timestamp_millis();
        self.commit(|state| state.add_resource(draft, target, created_ms))
            .await
    }

    /// Look up another user by name or e-mail.
    pub async fn search_user(&self, query: &str) -> Result<Option<UserSummary>, Error> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::invalid_request("search query must not be empty"));
        }
        self.network
            .directory
            .search(query)
            .await
            .map_err(map_directory_error)
    }

    /// Ask the account registered under `email` to become a peer.
    pub async fn send_peer_request(&self, email: &str) -> Result<(), Error> {
        let email = email.trim();
        if email.is_empty() {
            return Err(Error::invalid_request("receiver e-mail must not be empty"));
        }
        self.network
            .directory
            .send_request(self.user, email)
            .await
            .map_err(map_directory_error)
    }

    /// Peer requests waiting for this user.
    pub async fn pending_requests(&self) -> Result<Vec<PeerRequest>, Error> {
        self.network
            .directory
            .pending_requests(self.user)
            .await
            .map_err(map_directory_error)
    }

    /// Accept or reject a pending request.
    pub async fn respond_to_request(
        &self,
        request_id: u64,
        action: PeerRequestAction,
    ) -> Result<(), Error> {
        self.network
            .directory
            .respond(request_id, action)
            .await
            .map_err(map_directory_error)
    }

    /// Dissolve a network relationship by its peer row id.
    pub async fn remove_network_peer(&self, peer_id: u64) -> Result<(), Error> {
        self.network
            .directory
            .remove(self.user, peer_id)
            .await
            .map_err(map_directory_error)
    }

    /// Match score against the network's top skills.
    pub async fn skill_match(&self) -> Result<SkillMatch, Error> {
        self.network
            .skill_match
            .fetch(self.user)
            .await
            .map_err(map_skill_match_error)
    }
}

impl<S> DashboardSession<S>
where
    S: StateStore + 'static,
{
    /// Start loading the stored state in the background.
    ///
    /// The returned task can be cancelled; pass its output to
    /// [`apply_loaded`](Self::apply_loaded).
    pub fn load_task(&self) -> CancellableTask<Result<MigratedState, Error>> {
        let store = Arc::clone(&self.store);
        let user = self.user;
        CancellableTask::spawn(async move { fetch_state(store.as_ref(), user).await })
    }
}

#[cfg(test)]
mod tests;
