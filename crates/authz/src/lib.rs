//! Resilient authorization for bastion services
//!
//! Requests flow through [`AuthenticatedCallback`] into [`AuthMiddleware`],
//! which resolves the credential to a [`Principal`] (from the
//! [`PermissionCache`] or, through a circuit breaker and a deadline-bounded
//! invoker, from a [`RemoteValidator`]) and asks the [`AccessChecker`]
//! whether the principal may run the operation on the requested scope.

pub mod audit;
pub mod cache;
pub mod callback;
pub mod checker;
pub mod health;
pub mod middleware;
pub mod operations;
pub mod ownership;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod validator;

pub use audit::{AuditLog, AuditOutcome, AuditRecord, AuditSink, MemoryAuditSink, TracingAuditSink};
pub use cache::{CacheLookup, CacheStats, PermissionCache};
pub use callback::{
    AuthenticatedCallback, Callback, Envelope, ExemptOperations, Reply, ReplyError, ReplyStatus,
    RequestHeader, UnauthenticatedCallback,
};
pub use checker::{AccessChecker, AccessPattern, AccessRequest};
pub use health::{AuthHealth, HealthStatus};
pub use middleware::{AuthMiddleware, AuthMiddlewareBuilder, AuthRequest, Authorization};
pub use operations::{OperationRule, OperationTable};
pub use ownership::ServiceOwnership;
pub use permissions::{Permission, PermissionModel};
pub use principal::Principal;
pub use roles::{Role, RoleCatalog, ScopeClass};
pub use validator::{
    MessageChannel, QueueValidator, RemoteValidator, StaticValidator, ValidationResponse,
};
