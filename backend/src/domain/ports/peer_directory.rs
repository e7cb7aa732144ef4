//! Port for the peer network: user search and peer requests.

use async_trait::async_trait;

use crate::domain::{PeerRequest, PeerRequestAction, UserId, UserSummary};

use super::define_port_error;

define_port_error! {
    /// Errors raised by peer directory adapters.
    pub enum PeerDirectoryError {
        /// The directory could not be reached.
        Transport { message: String } => "peer directory transport failed: {message}",
        /// The directory did not answer in time.
        Timeout { message: String } => "peer directory timed out: {message}",
        /// The request breaks a network rule (self-request, already peers,
        /// request already pending).
        Rejected { status: u16, message: String } =>
            "peer request rejected ({status}): {message}",
        /// The user, request, or peer does not exist.
        NotFound { message: String } => "peer directory record not found: {message}",
        /// The directory answered with an unexpected body.
        Decode { message: String } => "peer directory response was malformed: {message}",
    }
}

/// Directory of registered users and peer relationships.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PeerDirectory: Send + Sync {
    /// Look up a user by name or e-mail. `None` when nobody matches.
    async fn search(&self, query: &str) -> Result<Option<UserSummary>, PeerDirectoryError>;

    /// Ask the account registered under `receiver_email` to become a peer.
    async fn send_request(
        &self,
        sender: UserId,
        receiver_email: &str,
    ) -> Result<(), PeerDirectoryError>;

    /// Requests waiting for `user` to respond.
    async fn pending_requests(&self, user: UserId) -> Result<Vec<PeerRequest>, PeerDirectoryError>;

    /// Accept or reject a pending request.
    async fn respond(
        &self,
        request_id: u64,
        action: PeerRequestAction,
    ) -> Result<(), PeerDirectoryError>;

    /// Dissolve the relationship identified by `peer_id` (the peer row id).
    async fn remove(&self, user: UserId, peer_id: u64) -> Result<(), PeerDirectoryError>;
}

/// Fixture directory with no users and no requests.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePeerDirectory;

#[async_trait]
impl PeerDirectory for FixturePeerDirectory {
    async fn search(&self, _query: &str) -> Result<Option<UserSummary>, PeerDirectoryError> {
        Ok(None)
    }

    async fn send_request(
        &self,
        _sender: UserId,
        receiver_email: &str,
    ) -> Result<(), PeerDirectoryError> {
        Err(PeerDirectoryError::not_found(format!(
            "no account registered for {receiver_email}"
        )))
    }

    async fn pending_requests(
        &self,
        _user: UserId,
    ) -> Result<Vec<PeerRequest>, PeerDirectoryError> {
        Ok(Vec::new())
    }

    async fn respond(
        &self,
        request_id: u64,
        _action: PeerRequestAction,
    ) -> Result<(), PeerDirectoryError> {
        Err(PeerDirectoryError::not_found(format!(
            "request {request_id} does not exist"
        )))
    }

    async fn remove(&self, _user: UserId, _peer_id: u64) -> Result<(), PeerDirectoryError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use super::*;

    #[tokio::test]
    async fn fixture_directory_is_empty() {
        let directory = FixturePeerDirectory;
        assert!(directory.search("ana").await.expect("search").is_none());
        let error = directory
            .send_request(UserId::new(1), "ana@example.com")
            .await
            .expect_err("nobody is registered");
        assert_eq!(error.kind(), "NotFound");
    }
}
