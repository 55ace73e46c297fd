use super::*;
use crate::permissions::Permission;

fn checker() -> AccessChecker {
    AccessChecker::new(PermissionModel::state(), Arc::new(ServiceOwnership::new()))
}

fn read_request(scope: &str) -> AccessRequest {
    AccessRequest::new("get", "state:data:read", scope)
}

#[test]
fn test_admin_pattern_wins_over_everything() {
    let checker = checker();
    checker.ownership().register("org.x", "svc-a");
    let principal = Principal::new("root")
        .with_service("svc-a")
        .with_permission("state:admin:system")
        .with_permission("state:data:read")
        .with_permission(Permission::scoped("state:data:read", "org.x"));
    assert_eq!(
        checker.check_access(&principal, &read_request("org.x")).unwrap(),
        AccessPattern::Admin
    );
}

#[test]
fn test_global_pattern() {
    let principal = Principal::new("u").with_permission("state:data:read");
    assert_eq!(
        checker().check_access(&principal, &read_request("org.x")).unwrap(),
        AccessPattern::Global
    );
}

#[test]
fn test_scoped_pattern_via_scope_field_and_name() {
    let checker = checker();
    let by_field = Principal::new("u").with_permission(Permission::scoped("state:data:write", "org.x"));
    let by_name = Principal::new("v").with_permission("state:scope:org.x:write");
    for principal in [by_field, by_name] {
        assert_eq!(
            checker.check_access(&principal, &read_request("org.x")).unwrap(),
            AccessPattern::Scoped
        );
        assert!(checker.check_access(&principal, &read_request("org.y")).is_err());
    }
}

#[test]
fn test_scoped_admin_covers_data_but_not_scope_management() {
    let checker = checker();
    let principal = Principal::new("u").with_permission("state:scope:org.x:admin");
    assert_eq!(
        checker
            .check_access(&principal, &AccessRequest::new("set", "state:data:write", "org.x"))
            .unwrap(),
        AccessPattern::Admin
    );
    assert!(checker
        .check_access(&principal, &AccessRequest::new("delete-scope", "state:scope:delete", "org.x"))
        .is_err());
}

#[test]
fn test_scoped_data_delete_does_not_delete_scope() {
    let principal = Principal::new("u").with_permission("state:scope:org.x:delete");
    let request = AccessRequest::new("delete-scope", "state:scope:delete", "org.x");
    assert!(checker().check_access(&principal, &request).is_err());
}

#[test]
fn test_service_ownership_pattern() {
    let checker = checker();
    checker.ownership().register("org.x", "svc-a");
    let request = read_request("org.x");

    let owner = Principal::new("svc-a-identity").with_service("svc-a");
    assert_eq!(
        checker.check_access(&owner, &request).unwrap(),
        AccessPattern::ServiceOwnership
    );

    let foreign = Principal::new("svc-b-identity").with_service("svc-b");
    assert!(checker.check_access(&foreign, &request).is_err());

    let no_service = Principal::new("svc-a");
    assert!(checker.check_access(&no_service, &request).is_err());
}

#[test]
fn test_ownership_does_not_cover_listing() {
    let checker = checker();
    checker.ownership().register("org.x", "svc-a");
    let request = AccessRequest::new("list", "state:data:list", "org.x");
    let owner = Principal::new("p").with_service("svc-a");
    assert!(checker.check_access(&owner, &request).is_err());
}

#[test]
fn test_cross_service_pattern_requires_explicit_grant() {
    let checker = checker();
    checker.ownership().register("org.y", "svc-b");
    let explicit = Principal::new("svc-a")
        .with_service("svc-a")
        .with_permission("state:cross-service:org.y:read");
    let request = read_request("org.y");
    assert_eq!(
        checker.check_access(&explicit, &request).unwrap(),
        AccessPattern::CrossService
    );

    let other_scope = Principal::new("svc-a").with_permission("state:cross-service:org.z:read");
    assert!(checker.check_access(&other_scope, &request).is_err());

    let narrow_wildcard = Principal::new("svc-a").with_permission("state:cross-service:*");
    assert!(checker.check_access(&narrow_wildcard, &request).is_err());
}

#[test]
fn test_denial_is_distinct_from_authentication_failure() {
    let principal = Principal::new("u").with_permission("state:data:read");
    let err = checker()
        .check_access(&principal, &AccessRequest::new("set", "state:data:write", "org.x"))
        .unwrap_err();
    assert!(matches!(err, Error::PermissionDenied { .. }));
    assert_eq!(err.kind(), bastion_core::ErrorKind::Forbidden);
    assert!(!err.to_string().contains("state:data:write"));
}

#[test]
fn test_unscoped_request_only_considers_admin_and_global() {
    let checker = checker();
    let scoped = Principal::new("u").with_permission("state:scope:org.x:health");
    let request = AccessRequest::new("health", "state:health:read", "");
    assert!(checker.check_access(&scoped, &request).is_err());

    let monitor = Principal::new("m").with_permission("state:health:read");
    assert_eq!(checker.check_access(&monitor, &request).unwrap(), AccessPattern::Global);
}
