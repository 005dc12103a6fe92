//! Membership event integration tests
//! Run with: cargo test --test membership_test

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use chatgate::application::errors::{BotError, StorageError};
use chatgate::application::messaging::membership::MEMBERSHIP_INCIDENT;
use chatgate::application::messaging::{MembershipHandler, MembershipOutcome};
use chatgate::domain::entities::{GroupSettings, MembershipAction, MembershipEvent};
use chatgate::domain::traits::{GroupStore, ParticipantSync, Transport};
use chatgate::infrastructure::groups::{FeatureAnnouncer, ParticipantCache};
use chatgate::infrastructure::storage::MemoryStore;

use common::*;

const GROUP: &str = "120363@g.us";
const WINDOW: Duration = Duration::from_millis(3000);

struct BrokenGroups;

#[async_trait]
impl GroupStore for BrokenGroups {
    async fn find_group(&self, _id: &str) -> Result<Option<GroupSettings>, StorageError> {
        Err(StorageError::Database("disk I/O error".to_string()))
    }
}

struct BrokenSync;

#[async_trait]
impl ParticipantSync for BrokenSync {
    async fn update_participants(
        &self,
        _transport: &dyn Transport,
        _group_id: &str,
        _participants: &[String],
        _action: MembershipAction,
    ) -> Result<(), BotError> {
        Err(BotError::Internal("metadata fetch failed".to_string()))
    }
}

fn managed_store(features: &[&str]) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    let settings = features
        .iter()
        .fold(GroupSettings::new(GROUP), |s, f| s.with_feature(*f));
    store.insert_group(settings);
    store
}

fn handler(groups: Arc<dyn GroupStore>, cache: &Arc<ParticipantCache>) -> MembershipHandler {
    MembershipHandler::new(groups, cache.clone(), Arc::new(FeatureAnnouncer::new()), WINDOW, 100)
}

fn event(action: &str, participants: &[&str]) -> MembershipEvent {
    MembershipEvent::new(GROUP, action, participants.iter().map(|p| p.to_string()).collect())
}

#[tokio::test]
async fn test_invalid_action_is_dropped() {
    let cache = Arc::new(ParticipantCache::new());
    let handler = handler(managed_store(&["welcome"]), &cache);
    let transport = RecordingTransport::new();

    let outcome = handler.handle(&transport, &event("kick", &[USER_JID])).await;

    assert_eq!(outcome, MembershipOutcome::InvalidAction);
    assert!(cache.members(GROUP).is_empty());
    assert!(transport.replies().is_empty());
}

#[tokio::test]
async fn test_unmanaged_group_still_syncs_participants() {
    let cache = Arc::new(ParticipantCache::new());
    let handler = handler(Arc::new(MemoryStore::new()), &cache);
    let transport = RecordingTransport::new();

    let outcome = handler.handle(&transport, &event("add", &[USER_JID])).await;

    assert_eq!(outcome, MembershipOutcome::Unmanaged);
    assert_eq!(cache.members(GROUP), vec![USER_JID.to_string()]);
    assert!(transport.replies().is_empty());
}

#[tokio::test]
async fn test_enabled_feature_greets_each_participant() {
    let cache = Arc::new(ParticipantCache::new());
    let handler = handler(managed_store(&["welcome"]), &cache);
    let transport = RecordingTransport::new();

    let outcome = handler
        .handle(&transport, &event("add", &[USER_JID, "628222@s.whatsapp.net"]))
        .await;

    assert_eq!(outcome, MembershipOutcome::FannedOut);
    let replies = transport.replies();
    assert_eq!(replies.len(), 2);
    assert!(replies.iter().all(|r| r.conversation_id == GROUP));
    assert_eq!(replies[0].text, "Welcome @628111!");
    assert_eq!(replies[1].text, "Welcome @628222!");
}

#[tokio::test]
async fn test_disabled_feature_sends_nothing() {
    let cache = Arc::new(ParticipantCache::new());
    let handler = handler(managed_store(&["welcome"]), &cache);
    let transport = RecordingTransport::new();

    let outcome = handler.handle(&transport, &event("promote", &[USER_JID])).await;

    assert_eq!(outcome, MembershipOutcome::FannedOut);
    assert!(transport.replies().is_empty());
    assert!(cache.is_admin(GROUP, USER_JID));
}

#[tokio::test]
async fn test_group_events_are_throttled_without_owner_bypass() {
    let cache = Arc::new(ParticipantCache::new());
    let handler = handler(managed_store(&["welcome", "left"]), &cache);
    let transport = RecordingTransport::new();
    let t0 = Instant::now();

    let first = handler.handle_at(&transport, &event("add", &[OWNER_JID]), t0).await;
    let second = handler
        .handle_at(&transport, &event("remove", &[OWNER_JID]), t0 + Duration::from_millis(500))
        .await;
    let third = handler
        .handle_at(&transport, &event("add", &[OWNER_JID]), t0 + Duration::from_millis(3500))
        .await;

    assert_eq!(first, MembershipOutcome::FannedOut);
    assert_eq!(second, MembershipOutcome::Throttled);
    assert_eq!(third, MembershipOutcome::FannedOut);
    assert_eq!(transport.replies().len(), 2);
    // Throttling only skips the fan-out; the cache follows every event
    assert_eq!(cache.members(GROUP), vec![OWNER_JID.to_string()]);
}

#[tokio::test]
async fn test_participant_sync_failure_is_not_fatal() {
    let handler = MembershipHandler::new(
        managed_store(&["welcome"]),
        Arc::new(BrokenSync),
        Arc::new(FeatureAnnouncer::new()),
        WINDOW,
        100,
    );
    let transport = RecordingTransport::new();

    let outcome = handler.handle(&transport, &event("add", &[USER_JID])).await;

    assert_eq!(outcome, MembershipOutcome::FannedOut);
    assert_eq!(transport.replies().len(), 1);
}

#[tokio::test]
async fn test_group_lookup_error_becomes_incident() {
    let cache = Arc::new(ParticipantCache::new());
    let incidents = RecordingIncidents::new();
    let handler = handler(Arc::new(BrokenGroups), &cache).with_incidents(incidents.clone());
    let transport = RecordingTransport::new();

    let outcome = handler.handle(&transport, &event("add", &[USER_JID])).await;

    assert_eq!(outcome, MembershipOutcome::Failed);
    assert_eq!(incidents.names(), vec![MEMBERSHIP_INCIDENT]);
    assert!(transport.replies().is_empty());
}

#[tokio::test]
async fn test_fan_out_failure_becomes_incident() {
    let cache = Arc::new(ParticipantCache::new());
    let incidents = RecordingIncidents::new();
    let handler = handler(managed_store(&["welcome"]), &cache).with_incidents(incidents.clone());

    let outcome = handler.handle(&BrokenTransport, &event("add", &[USER_JID])).await;

    assert_eq!(outcome, MembershipOutcome::Failed);
    assert_eq!(incidents.names(), vec![MEMBERSHIP_INCIDENT]);
}
