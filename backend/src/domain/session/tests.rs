//! Regression coverage for this module.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::{
    MockPeerDirectory, MockResourceDelivery, MockStateStore, PeerDirectoryError,
    ResourceDeliveryError, StateStoreError,
};
use crate::domain::{ErrorCode, SharedResource, TaskCancelled};

const NOW_MS: i64 = 1_767_225_600_123;

struct FixtureClock;

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(NOW_MS)
            .single()
            .expect("valid fixture timestamp")
    }
}

#[fixture]
fn user() -> UserId {
    UserId::new(7)
}

fn stored_state() -> Value {
    json!({
        "profile": { "name": "Asha", "companies": ["Acme"] },
        "mySkills": ["Rust", { "skill": "Go", "company": "Acme" }],
        "peers": [
            { "name": "Ben", "company": "Acme", "skills": ["Go", "Kotlin"] },
            { "name": "Cai", "company": "Initech", "skills": ["Kotlin"], "linkedId": 12 }
        ],
        "resources": []
    })
}

fn session_with(
    store: MockStateStore,
    network: PeerNetwork,
    user: UserId,
) -> DashboardSession<MockStateStore> {
    DashboardSession::new(user, Arc::new(store), network, Arc::new(FixtureClock))
}

fn loaded_store() -> MockStateStore {
    let mut store = MockStateStore::new();
    store.expect_load().returning(|_| Ok(stored_state()));
    store
}

#[rstest]
#[tokio::test]
async fn load_migrates_and_holds_state(user: UserId) {
    let mut store = MockStateStore::new();
    store
        .expect_load()
        .withf(move |requested| *requested == user)
        .times(1)
        .returning(|_| Ok(stored_state()));
    let mut session = session_with(store, PeerNetwork::default(), user);

    let report = session.load().await.expect("load succeeds");

    assert_eq!(report.legacy_skills, 1);
    assert_eq!(session.state().my_skills.len(), 2);
    assert_eq!(session.state().my_skills[0].skill, "Rust");
    let missing: Vec<_> = session
        .skill_gap()
        .missing
        .into_iter()
        .map(|count| count.skill)
        .collect();
    assert_eq!(missing, ["Kotlin"]);
}

#[rstest]
#[tokio::test]
async fn failed_load_keeps_previous_state(user: UserId) {
    let mut store = MockStateStore::new();
    let mut calls = 0;
    store.expect_load().times(2).returning(move |_| {
        calls += 1;
        if calls == 1 {
            Ok(stored_state())
        } else {
            Err(StateStoreError::timeout("no answer"))
        }
    });
    let mut session = session_with(store, PeerNetwork::default(), user);
    session.load().await.expect("first load succeeds");
    let before = session.state().clone();

    let err = session.load().await.expect_err("second load fails");

    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    assert_eq!(session.state(), &before);
}

#[rstest]
#[tokio::test]
async fn mutations_save_the_new_snapshot(user: UserId) {
    let mut store = loaded_store();
    store
        .expect_save()
        .withf(|_, state| state.my_skills.iter().any(|entry| entry.skill == "Kotlin"))
        .times(1)
        .returning(|_, _| Ok(()));
    let mut session = session_with(store, PeerNetwork::default(), user);
    session.load().await.expect("load succeeds");

    let added = session
        .add_skills("kotlin, go", "Initech")
        .await
        .expect("save succeeds");

    assert_eq!(added, 1);
    assert!(session.state().has_skill("Kotlin"));
    assert!(session.state().profile.companies.contains(&"Initech".to_owned()));
}

#[rstest]
#[tokio::test]
async fn failed_save_discards_the_mutation(user: UserId) {
    let mut store = loaded_store();
    store
        .expect_save()
        .times(1)
        .returning(|_, _| Err(StateStoreError::transport("connection refused")));
    let mut session = session_with(store, PeerNetwork::default(), user);
    session.load().await.expect("load succeeds");
    let before = session.state().clone();

    let err = session.remove_peer(0).await.expect_err("save fails");

    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    assert_eq!(session.state(), &before);
}

#[rstest]
#[tokio::test]
async fn invalid_mutations_never_reach_the_store(user: UserId) {
    let mut store = loaded_store();
    store.expect_save().never();
    let mut session = session_with(store, PeerNetwork::default(), user);
    session.load().await.expect("load succeeds");

    let err = session.remove_skill(9).await.expect_err("no such skill");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn linked_peers_receive_resources_before_recording(user: UserId) {
    let mut store = loaded_store();
    store.expect_save().times(1).returning(|_, _| Ok(()));
    let mut delivery = MockResourceDelivery::new();
    delivery
        .expect_recommend()
        .withf(move |sender, receiver, resource: &SharedResource| {
            *sender == user && *receiver == UserId::new(12) && resource.url == "https://kotlinlang.org"
        })
        .times(1)
        .returning(|_, _, _| Ok(()));
    let network = PeerNetwork {
        delivery: Arc::new(delivery),
        ..PeerNetwork::default()
    };
    let mut session = session_with(store, network, user);
    session.load().await.expect("load succeeds");

    let resource = session
        .recommend(&ResourceDraft::for_url("https://kotlinlang.org"), ResourceTarget::Peer(1))
        .await
        .expect("recommendation recorded");

    assert_eq!(resource.author, "Cai");
    assert_eq!(resource.created, NOW_MS);
    assert_eq!(session.state().resources.len(), 1);
}

#[rstest]
#[tokio::test]
async fn failed_delivery_records_nothing(user: UserId) {
    let mut store = loaded_store();
    store.expect_save().never();
    let mut delivery = MockResourceDelivery::new();
    delivery
        .expect_recommend()
        .times(1)
        .returning(|_, _, _| Err(ResourceDeliveryError::rejected(404_u16, "no such account")));
    let network = PeerNetwork {
        delivery: Arc::new(delivery),
        ..PeerNetwork::default()
    };
    let mut session = session_with(store, network, user);
    session.load().await.expect("load succeeds");

    let err = session
        .recommend(&ResourceDraft::for_url("https://kotlinlang.org"), ResourceTarget::Peer(1))
        .await
        .expect_err("delivery fails");

    assert_eq!(err.code(), ErrorCode::NotFound);
    assert!(session.state().resources.is_empty());
}

#[rstest]
#[tokio::test]
async fn unlinked_peers_are_recorded_locally(user: UserId) {
    let mut store = loaded_store();
    store.expect_save().times(1).returning(|_, _| Ok(()));
    let mut delivery = MockResourceDelivery::new();
    delivery.expect_recommend().never();
    let network = PeerNetwork {
        delivery: Arc::new(delivery),
        ..PeerNetwork::default()
    };
    let mut session = session_with(store, network, user);
    session.load().await.expect("load succeeds");

    let resource = session
        .recommend(&ResourceDraft::for_url("https://go.dev"), ResourceTarget::Peer(0))
        .await
        .expect("recorded");

    assert_eq!(resource.author, "Ben");
}

#[rstest]
#[case(PeerDirectoryError::rejected(409_u16, "already peers"), ErrorCode::Conflict)]
#[case(PeerDirectoryError::rejected(400_u16, "cannot add yourself"), ErrorCode::InvalidRequest)]
#[case(PeerDirectoryError::not_found("no such user"), ErrorCode::NotFound)]
#[case(PeerDirectoryError::timeout("slow"), ErrorCode::ServiceUnavailable)]
#[tokio::test]
async fn peer_request_failures_map_to_domain_codes(
    user: UserId,
    #[case] failure: PeerDirectoryError,
    #[case] expected: ErrorCode,
) {
    let mut directory = MockPeerDirectory::new();
    directory
        .expect_send_request()
        .times(1)
        .return_once(move |_, _| Err(failure));
    let network = PeerNetwork {
        directory: Arc::new(directory),
        ..PeerNetwork::default()
    };
    let session = session_with(MockStateStore::new(), network, user);

    let err = session
        .send_peer_request("ben@example.com")
        .await
        .expect_err("request fails");

    assert_eq!(err.code(), expected);
}

#[rstest]
#[tokio::test]
async fn blank_search_is_rejected_locally(user: UserId) {
    let mut directory = MockPeerDirectory::new();
    directory.expect_search().never();
    let network = PeerNetwork {
        directory: Arc::new(directory),
        ..PeerNetwork::default()
    };
    let session = session_with(MockStateStore::new(), network, user);

    let err = session.search_user("   ").await.expect_err("blank query");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn background_loads_can_be_cancelled(user: UserId) {
    let mut store = MockStateStore::new();
    store.expect_load().returning(|_| Ok(stored_state()));
    let session = session_with(store, PeerNetwork::default(), user);

    let task = session.load_task();
    task.cancel();

    assert_eq!(task.await.map(|_| ()), Err(TaskCancelled));
}
