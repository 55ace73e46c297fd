//! Cache lifetime and access-pattern selection through the middleware

mod common;

use bastion_authz::{AccessPattern, AuditOutcome, AuthRequest};
use bastion_config::AuthConfig;
use common::{harness, harness_with};
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_principal_reused_until_ttl() {
    let h = harness_with(AuthConfig {
        cache_ttl: Duration::from_secs(300),
        ..AuthConfig::default()
    });

    let first = h.middleware.validate_request("get", "tok-A", "org.x").await.unwrap();
    tokio::time::advance(Duration::from_secs(299)).await;
    let second = h.middleware.validate_request("get", "tok-A", "org.x").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(h.validator.validations(), 1);

    tokio::time::advance(Duration::from_secs(2)).await;
    h.middleware.validate_request("get", "tok-A", "org.x").await.unwrap();
    assert_eq!(h.validator.validations(), 2);
}

#[tokio::test]
async fn test_cache_keyed_by_scope() {
    let h = harness();
    h.middleware.validate_request("get", "tok-A", "org.x").await.unwrap();
    h.middleware.validate_request("get", "tok-A", "org.y").await.unwrap();
    h.middleware.validate_request("get", "tok-A", "org.x").await.unwrap();
    assert_eq!(h.validator.validations(), 2);
    assert_eq!(h.middleware.cache().len(), 2);
}

#[tokio::test]
async fn test_revocation_needs_cache_clear() {
    let h = harness();
    h.middleware.validate_request("get", "tok-A", "org.x").await.unwrap();
    h.validator.tokens().revoke_token("tok-A");

    // Still cached
    assert!(h.middleware.validate_request("get", "tok-A", "org.x").await.is_ok());

    assert_eq!(h.middleware.invalidate_credential("tok-A"), 1);
    assert!(h.middleware.validate_request("get", "tok-A", "org.x").await.is_err());

    h.middleware.clear_cache();
    assert!(h.middleware.cache().is_empty());
}

async fn pattern_for(h: &common::Harness, request: AuthRequest) -> Option<AccessPattern> {
    h.middleware.authorize(&request).await.ok()?.pattern
}

#[tokio::test]
async fn test_each_pattern_grants_on_its_own() {
    let h = harness();
    h.middleware.register_scope("org.x", "svc-a");

    assert_eq!(
        pattern_for(&h, AuthRequest::new("get", "tok-root", "org.x")).await,
        Some(AccessPattern::Admin)
    );
    assert_eq!(
        pattern_for(&h, AuthRequest::new("get", "tok-A", "org.x")).await,
        Some(AccessPattern::Global)
    );
    assert_eq!(
        pattern_for(&h, AuthRequest::new("get", "tok-W", "org.x")).await,
        Some(AccessPattern::Scoped)
    );
    assert_eq!(
        pattern_for(&h, AuthRequest::new("set", "tok-S", "org.x")).await,
        Some(AccessPattern::ServiceOwnership)
    );
    assert_eq!(
        pattern_for(&h, AuthRequest::new("get", "tok-X", "org.x")).await,
        Some(AccessPattern::CrossService)
    );
}

#[tokio::test]
async fn test_scoped_grant_beats_ownership() {
    let h = harness();
    h.middleware.register_scope("org.x", "svc-w");
    let request = AuthRequest::new("set", "tok-W", "org.x");
    assert_eq!(pattern_for(&h, request).await, Some(AccessPattern::Scoped));
}

#[tokio::test]
async fn test_ownership_follows_registration() {
    let h = harness();
    let request = AuthRequest::new("set", "tok-S", "org.x");
    assert_eq!(pattern_for(&h, request.clone()).await, None);

    h.middleware.register_scope("org.x", "svc-a");
    assert_eq!(
        pattern_for(&h, request.clone()).await,
        Some(AccessPattern::ServiceOwnership)
    );

    h.middleware.register_scope("org.x", "svc-b");
    assert_eq!(pattern_for(&h, request.clone()).await, None);

    h.middleware.unregister_scope("org.x");
    assert_eq!(pattern_for(&h, request).await, None);
}

#[tokio::test]
async fn test_no_pattern_is_forbidden_not_unauthenticated() {
    let h = harness();
    let err = h
        .middleware
        .authorize(&AuthRequest::new("delete", "tok-X", "org.y"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), bastion_core::ErrorKind::Forbidden);

    let records = h.audit.records();
    assert_eq!(
        records.last().map(|r| r.outcome.clone()),
        Some(AuditOutcome::Denied {
            reason: "forbidden".to_string()
        })
    );
}
