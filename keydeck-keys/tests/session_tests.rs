//! Session Gate Unit Tests

mod common;

use common::SwitchableStore;
use keydeck_keys::session::{messages, Rejection, REDIRECT_DELAY};
use keydeck_keys::{
    CredentialAction, EntryState, KeyEntry, KeyStoreBackend, SessionCheck, SessionValidator,
};
use keydeck_types::{ApiKeyRecord, KeyType, NewApiKey, NotificationKind};
use std::sync::Arc;

async fn seeded(key: &str) -> (Arc<SwitchableStore>, ApiKeyRecord) {
    let store = Arc::new(SwitchableStore::new());
    let record = store
        .insert(&NewApiKey::new("Test", key, KeyType::Prod).unwrap())
        .await
        .unwrap();
    (store, record)
}

#[tokio::test]
async fn test_existing_key_is_valid() {
    let (store, record) = seeded("tvly-prod-abcdefghijklm").await;
    let validator = SessionValidator::new(store);

    let check = validator.check(Some("tvly-prod-abcdefghijklm")).await;
    assert_eq!(check, SessionCheck::Valid(record.id));
    assert!(!check.clears_credential());
}

#[tokio::test]
async fn test_missing_credential() {
    let (store, _) = seeded("tvly-prod-abcdefghijklm").await;
    let validator = SessionValidator::new(store);

    for credential in [None, Some(""), Some("   ")] {
        let check = validator.check(credential).await;
        assert_eq!(check, SessionCheck::Rejected(Rejection::Missing));
        assert!(!check.clears_credential());
    }
}

#[tokio::test]
async fn test_unknown_key_is_rejected_and_cleared() {
    let (store, _) = seeded("tvly-prod-abcdefghijklm").await;
    let validator = SessionValidator::new(store);

    let check = validator.check(Some("tvly-prod-zzzzzzzzzzzzz")).await;
    assert_eq!(check, SessionCheck::Rejected(Rejection::NotFound));
    assert!(check.clears_credential());
}

#[tokio::test]
async fn test_duplicate_keys_are_ambiguous() {
    let (store, _) = seeded("shared").await;
    store
        .insert(&NewApiKey::new("Copy", "shared", KeyType::Dev).unwrap())
        .await
        .unwrap();
    let validator = SessionValidator::new(store);

    assert_eq!(
        validator.check(Some("shared")).await,
        SessionCheck::Rejected(Rejection::Ambiguous(2))
    );
}

#[tokio::test]
async fn test_store_error_is_rejection() {
    let (store, _) = seeded("tvly-prod-abcdefghijklm").await;
    store.set_failing(true);
    let validator = SessionValidator::new(store);

    let check = validator.check(Some("tvly-prod-abcdefghijklm")).await;
    assert!(matches!(check, SessionCheck::Rejected(Rejection::StoreError(_))));
    assert!(check.clears_credential());
}

#[tokio::test]
async fn test_deleted_key_stops_validating() {
    let (store, record) = seeded("tvly-prod-abcdefghijklm").await;
    let validator = SessionValidator::new(store.clone());
    assert!(validator.check(Some(&record.key)).await.is_valid());

    store.delete(&record.id).await.unwrap();
    assert!(!validator.check(Some(&record.key)).await.is_valid());
}

#[tokio::test]
async fn test_entry_issues_credential() {
    let (store, record) = seeded("tvly-prod-abcdefghijklm").await;
    let mut entry = KeyEntry::new(SessionValidator::new(store), "/protected");
    assert_eq!(entry.state(), EntryState::Idle);

    let issuance = entry.submit(&record.key).await;

    assert_eq!(issuance.outcome, EntryState::Valid);
    assert_eq!(issuance.credential, CredentialAction::Set(record.key.clone()));
    let notification = issuance.notification.unwrap();
    assert_eq!(notification.message, messages::VALID);
    assert_eq!(notification.kind, NotificationKind::Success);
    let redirect = issuance.redirect.unwrap();
    assert_eq!(redirect.path, "/protected");
    assert_eq!(redirect.after, REDIRECT_DELAY);
    assert_eq!(entry.state(), EntryState::Valid);
}

#[tokio::test]
async fn test_entry_rejects_and_returns_to_idle() {
    let (store, _) = seeded("tvly-prod-abcdefghijklm").await;
    let mut entry = KeyEntry::new(SessionValidator::new(store), "/protected");

    let issuance = entry.submit("not-a-key").await;

    assert_eq!(issuance.outcome, EntryState::Invalid);
    assert_eq!(issuance.credential, CredentialAction::Clear);
    assert_eq!(issuance.notification.unwrap().message, messages::INVALID);
    assert!(issuance.redirect.is_none());
    assert_eq!(entry.state(), EntryState::Idle);
}

#[tokio::test]
async fn test_entry_blank_submission_is_ignored() {
    let (store, _) = seeded("tvly-prod-abcdefghijklm").await;
    let mut entry = KeyEntry::new(SessionValidator::new(store), "/protected");

    let issuance = entry.submit("  ").await;

    assert_eq!(issuance.outcome, EntryState::Idle);
    assert_eq!(issuance.credential, CredentialAction::Keep);
    assert!(issuance.notification.is_none());
    assert_eq!(entry.state(), EntryState::Idle);
}

#[tokio::test]
async fn test_entry_store_failure_is_invalid() {
    let (store, record) = seeded("tvly-prod-abcdefghijklm").await;
    store.set_failing(true);
    let mut entry = KeyEntry::new(SessionValidator::new(store), "/protected");

    let issuance = entry.submit(&record.key).await;
    assert_eq!(issuance.outcome, EntryState::Invalid);
    assert_eq!(issuance.credential, CredentialAction::Clear);
}

#[tokio::test]
async fn test_new_submission_restarts_cycle() {
    let (store, record) = seeded("tvly-prod-abcdefghijklm").await;
    let mut entry = KeyEntry::new(SessionValidator::new(store), "/protected");

    assert_eq!(entry.submit("wrong").await.outcome, EntryState::Invalid);
    assert_eq!(entry.submit(&record.key).await.outcome, EntryState::Valid);
    assert_eq!(entry.submit("wrong").await.outcome, EntryState::Invalid);
    assert_eq!(entry.state(), EntryState::Idle);
}
