//! The authorization pipeline
//!
//! [`AuthMiddleware::authorize`] runs every request through the same steps:
//!
//! 1. reject an empty credential
//! 2. classify the operation and reject a missing required scope
//! 3. look the credential up in the [`PermissionCache`]
//! 4. on a miss, validate remotely through the circuit breaker and the
//!    resilient invoker
//! 5. build and cache the [`Principal`]
//! 6. ask the [`AccessChecker`] for a decision
//! 7. write one audit record
//!
//! Steps 1 and 2 never touch the cache or the network. A dependency failure
//! in step 4 is returned as-is (circuit open, timeout, network or internal
//! fault) and is never retried here or treated as a grant.

use crate::audit::{AuditLog, AuditOutcome, AuditRecord};
use crate::cache::{fingerprint, CacheLookup, PermissionCache};
use crate::checker::{AccessChecker, AccessPattern, AccessRequest};
use crate::health::AuthHealth;
use crate::operations::OperationTable;
use crate::ownership::ServiceOwnership;
use crate::permissions::PermissionModel;
use crate::principal::Principal;
use crate::validator::RemoteValidator;
use bastion_config::AuthConfig;
use bastion_core::{Error, Result};
use bastion_utils::resilience::{CircuitBreaker, ResilientInvoker};
use bastion_utils::telemetry::authorization_span;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::Instrument;

/// Everything the middleware needs to decide one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthRequest {
    pub operation: String,
    pub credential: String,
    pub scope: String,
}

impl AuthRequest {
    pub fn new(
        operation: impl Into<String>,
        credential: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            operation: operation.into(),
            credential: credential.into(),
            scope: scope.into(),
        }
    }
}

/// A successful decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    pub principal: Arc<Principal>,
    /// `None` when authorization was disabled and the request bypassed it
    pub pattern: Option<AccessPattern>,
}

impl Authorization {
    pub fn is_bypassed(&self) -> bool {
        self.pattern.is_none()
    }
}

/// Builder for [`AuthMiddleware`]
pub struct AuthMiddlewareBuilder {
    config: AuthConfig,
    validator: Arc<dyn RemoteValidator>,
    model: PermissionModel,
    operations: Option<OperationTable>,
    ownership: Arc<ServiceOwnership>,
    audit: AuditLog,
    breaker: Option<Arc<CircuitBreaker>>,
}

impl AuthMiddlewareBuilder {
    #[must_use]
    pub fn model(mut self, model: PermissionModel) -> Self {
        self.model = model;
        self
    }

    #[must_use]
    pub fn operations(mut self, operations: OperationTable) -> Self {
        self.operations = Some(operations);
        self
    }

    #[must_use]
    pub fn ownership(mut self, ownership: Arc<ServiceOwnership>) -> Self {
        self.ownership = ownership;
        self
    }

    #[must_use]
    pub fn audit(mut self, audit: AuditLog) -> Self {
        self.audit = audit;
        self
    }

    /// Share a breaker with other clients of the same dependency
    #[must_use]
    pub fn breaker(mut self, breaker: Arc<CircuitBreaker>) -> Self {
        self.breaker = Some(breaker);
        self
    }

    /// Validate the configuration and assemble the middleware
    ///
    /// The result enforces authorization if the configuration enables it,
    /// without probing the validator; see [`AuthMiddleware::start`].
    pub fn build(self) -> Result<AuthMiddleware> {
        self.config.validate()?;

        let operations = self
            .operations
            .unwrap_or_else(|| OperationTable::with_defaults(&self.model));
        let breaker = self
            .breaker
            .unwrap_or_else(|| Arc::new(CircuitBreaker::new(self.config.breaker_config())));

        Ok(AuthMiddleware {
            validate_invoker: ResilientInvoker::new("validate", self.config.call_timeout),
            probe_invoker: ResilientInvoker::new("ping", self.config.health_timeout),
            cache: PermissionCache::new(self.config.cache_config()),
            checker: AccessChecker::new(self.model.clone(), self.ownership),
            enabled: AtomicBool::new(self.config.enabled),
            degraded: AtomicBool::new(false),
            operations,
            breaker,
            validator: self.validator,
            model: self.model,
            audit: self.audit,
            config: self.config,
        })
    }
}

/// Authorization middleware shared by every handler of a service
pub struct AuthMiddleware {
    config: AuthConfig,
    model: PermissionModel,
    operations: OperationTable,
    validator: Arc<dyn RemoteValidator>,
    breaker: Arc<CircuitBreaker>,
    validate_invoker: ResilientInvoker,
    probe_invoker: ResilientInvoker,
    cache: PermissionCache,
    checker: AccessChecker,
    audit: AuditLog,
    enabled: AtomicBool,
    degraded: AtomicBool,
}

impl AuthMiddleware {
    pub fn builder(config: AuthConfig, validator: Arc<dyn RemoteValidator>) -> AuthMiddlewareBuilder {
        AuthMiddlewareBuilder {
            config,
            validator,
            model: PermissionModel::state(),
            operations: None,
            ownership: Arc::new(ServiceOwnership::new()),
            audit: AuditLog::default(),
            breaker: None,
        }
    }

    /// Probe the validator before serving
    ///
    /// An unreachable validator either disables authorization (degraded
    /// mode) or fails startup, depending on `degrade_on_startup_failure`.
    pub async fn start(&self) -> Result<()> {
        if !self.config.enabled {
            tracing::warn!(
                service = self.config.service_name.as_deref().unwrap_or("-"),
                "Authorization disabled by configuration"
            );
            return Ok(());
        }

        match self.probe().await {
            Ok(()) => {
                tracing::info!(endpoint = %self.validator.endpoint(), "Identity validator reachable");
                Ok(())
            }
            Err(e) if self.config.degrade_on_startup_failure => {
                self.enabled.store(false, Ordering::SeqCst);
                self.degraded.store(true, Ordering::SeqCst);
                tracing::warn!(
                    endpoint = %self.validator.endpoint(),
                    error = %e,
                    "Identity validator unreachable; authorization DISABLED until it recovers"
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(endpoint = %self.validator.endpoint(), error = %e, "Identity validator unreachable");
                Err(e)
            }
        }
    }

    /// Probe again and leave degraded mode if the validator answers
    pub async fn reprobe(&self) -> Result<()> {
        if !self.degraded.load(Ordering::SeqCst) {
            return Ok(());
        }
        self.probe().await?;
        self.breaker.reset().await;
        self.degraded.store(false, Ordering::SeqCst);
        self.enabled.store(true, Ordering::SeqCst);
        tracing::info!(endpoint = %self.validator.endpoint(), "Identity validator recovered; authorization re-enabled");
        Ok(())
    }

    async fn probe(&self) -> Result<()> {
        let validator = Arc::clone(&self.validator);
        self.probe_invoker
            .invoke_default(move || async move { validator.ping().await })
            .await
    }

    /// Authorize `operation` on `scope` for `credential`
    pub async fn validate_request(
        &self,
        operation: &str,
        credential: &str,
        scope: &str,
    ) -> Result<Arc<Principal>> {
        self.authorize(&AuthRequest::new(operation, credential, scope))
            .await
            .map(|authorization| authorization.principal)
    }

    /// Run the full pipeline for `request`
    pub async fn authorize(&self, request: &AuthRequest) -> Result<Authorization> {
        let span = authorization_span(&request.operation, &request.scope);
        self.authorize_inner(request).instrument(span).await
    }

    async fn authorize_inner(&self, request: &AuthRequest) -> Result<Authorization> {
        if !self.is_enabled() {
            tracing::warn!(
                operation = %request.operation,
                scope = %request.scope,
                "Request passed without authorization"
            );
            self.audit
                .record(AuditRecord::new(&request.operation, &request.scope, AuditOutcome::Bypassed));
            return Ok(Authorization {
                principal: Arc::new(Principal::anonymous()),
                pattern: None,
            });
        }

        let mut principal_id = None;
        let result = self.decide(request, &mut principal_id).await;

        let outcome = match &result {
            Ok((_, pattern)) => AuditOutcome::Granted { pattern: *pattern },
            Err(e) => AuditOutcome::Denied {
                reason: e.kind().as_str().to_string(),
            },
        };
        let mut record = AuditRecord::new(&request.operation, &request.scope, outcome);
        if !request.credential.is_empty() {
            record = record.with_credential(fingerprint(&request.credential));
        }
        if let Some(id) = principal_id {
            record = record.with_principal(id);
        }
        self.audit.record(record);

        result.map(|(principal, pattern)| Authorization {
            principal,
            pattern: Some(pattern),
        })
    }

    async fn decide(
        &self,
        request: &AuthRequest,
        principal_id: &mut Option<String>,
    ) -> Result<(Arc<Principal>, AccessPattern)> {
        if request.credential.is_empty() {
            return Err(Error::malformed_request(&request.operation, "missing credential"));
        }

        let rule = self.operations.rule(&request.operation);
        if request.scope.is_empty() {
            if rule.requires_scope {
                return Err(Error::malformed_request(&request.operation, "missing scope"));
            }
        } else {
            self.model
                .validate_scope(&request.scope)
                .map_err(|e| Error::malformed_request(&request.operation, e.to_string()))?;
        }

        let principal = self.principal_for(request).await?;
        *principal_id = Some(principal.id().to_string());

        let access = AccessRequest::new(&request.operation, &rule.permission, &request.scope);
        let pattern = self.checker.check_access(&principal, &access)?;

        Ok((principal, pattern))
    }

    async fn principal_for(&self, request: &AuthRequest) -> Result<Arc<Principal>> {
        match self.cache.lookup(&request.credential, &request.scope) {
            CacheLookup::Hit(principal) => {
                tracing::debug!(principal = %principal.id(), "Principal served from cache");
                return Ok(principal);
            }
            CacheLookup::Unknown => {
                return Err(Error::authentication("credential rejected by validator"));
            }
            CacheLookup::Miss => {}
        }

        let validator = Arc::clone(&self.validator);
        let credential = request.credential.clone();
        let response = self
            .breaker
            .call(|| {
                self.validate_invoker
                    .invoke_default(move || async move { validator.validate(&credential).await })
            })
            .await
            .inspect_err(|e| {
                tracing::warn!(
                    credential = %fingerprint(&request.credential),
                    endpoint = %self.validator.endpoint(),
                    error = %e,
                    "Remote validation failed"
                );
            })?;

        let principal = match Principal::from_response(&response, &self.model) {
            Ok(principal) if principal.is_expired() => {
                Err(Error::authentication("credential expired"))
            }
            other => other,
        };
        let principal = match principal {
            Ok(principal) => Arc::new(principal),
            Err(e) => {
                self.cache.store_unknown(&request.credential);
                return Err(e);
            }
        };

        self.cache
            .store(&request.credential, &request.scope, Arc::clone(&principal));
        tracing::debug!(principal = %principal.id(), "Principal validated and cached");
        Ok(principal)
    }

    /// Drop every cached principal
    pub fn clear_cache(&self) {
        self.cache.clear();
        tracing::info!("Permission cache cleared");
    }

    /// Drop cached principals for one credential
    pub fn invalidate_credential(&self, credential: &str) -> usize {
        self.cache.invalidate(credential)
    }

    pub fn register_scope(&self, scope: impl Into<String>, owner: impl Into<String>) -> Option<String> {
        self.checker.ownership().register(scope, owner)
    }

    pub fn unregister_scope(&self, scope: &str) -> Option<String> {
        self.checker.ownership().unregister(scope)
    }

    pub fn required_permission(&self, operation: &str) -> &str {
        self.operations.required_permission(operation)
    }

    pub fn requires_scope(&self, operation: &str) -> bool {
        self.operations.requires_scope(operation)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::SeqCst)
    }

    pub async fn health(&self) -> AuthHealth {
        let stats = self.breaker.stats().await;
        AuthHealth {
            auth_enabled: self.is_enabled(),
            degraded: self.is_degraded(),
            breaker_state: self.breaker.state().await,
            failure_count: stats.failure_count,
            cache_entries: self.cache.len(),
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn model(&self) -> &PermissionModel {
        &self.model
    }

    pub fn cache(&self) -> &PermissionCache {
        &self.cache
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    pub fn ownership(&self) -> &Arc<ServiceOwnership> {
        self.checker.ownership()
    }
}
