//! Handler decorators that gate execution on authorization
//!
//! Every inbound message is a JSON object embedding a [`RequestHeader`].
//! [`AuthenticatedCallback`] reads only that header, asks the
//! [`AuthMiddleware`], and hands the untouched message to the wrapped
//! handler when access is granted. Failures of either step come back as a
//! structured [`Reply`], never as a raw error.

use crate::middleware::{AuthMiddleware, AuthRequest};
use async_trait::async_trait;
use bastion_core::{Error, ErrorKind, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;

/// A business operation
#[async_trait]
pub trait Callback: Send + Sync {
    async fn execute(&self, message: &str) -> Result<Reply>;
}

/// Fields every request carries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestHeader {
    #[serde(default)]
    pub credential: String,
    #[serde(default)]
    pub scope: String,
}

impl RequestHeader {
    /// Extract the header from a raw message
    pub fn parse(operation: &str, message: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(message)
            .map_err(|e| Error::malformed_request(operation, format!("invalid JSON: {e}")))?;
        if !value.is_object() {
            return Err(Error::malformed_request(operation, "message must be a JSON object"));
        }
        serde_json::from_value(value)
            .map_err(|e| Error::malformed_request(operation, format!("invalid header: {e}")))
    }
}

/// A request body together with its header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(flatten)]
    pub header: RequestHeader,
    #[serde(flatten)]
    pub body: T,
}

impl<T: DeserializeOwned> Envelope<T> {
    pub fn decode(operation: &str, message: &str) -> Result<Self> {
        serde_json::from_str(message)
            .map_err(|e| Error::malformed_request(operation, format!("invalid body: {e}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyStatus {
    Ok,
    /// The caller was refused
    Denied,
    /// The request could not be served
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyError {
    pub kind: String,
    pub message: String,
}

const UNAVAILABLE_MESSAGE: &str = "service unavailable";
const INTERNAL_MESSAGE: &str = "internal error";

/// Response shape shared by every operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub status: ReplyStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ReplyError>,
}

impl Reply {
    pub fn ok(data: impl Into<Option<Value>>) -> Self {
        Self {
            status: ReplyStatus::Ok,
            data: data.into(),
            error: None,
        }
    }

    /// Client errors become `denied`, everything else `error`
    ///
    /// Only client errors carry their own message; dependency and internal
    /// failures get a fixed one so endpoints and panic payloads stay in the
    /// log.
    pub fn from_error(error: &Error) -> Self {
        let kind = error.kind();
        let (status, message) = match kind {
            ErrorKind::MalformedRequest | ErrorKind::Unauthenticated | ErrorKind::Forbidden => {
                (ReplyStatus::Denied, error.to_string())
            }
            ErrorKind::Unavailable => (ReplyStatus::Error, UNAVAILABLE_MESSAGE.to_string()),
            ErrorKind::Internal => (ReplyStatus::Error, INTERNAL_MESSAGE.to_string()),
        };
        Self {
            status,
            data: None,
            error: Some(ReplyError {
                kind: kind.as_str().to_string(),
                message,
            }),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ReplyStatus::Ok
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Wraps a handler so it only runs for authorized requests
pub struct AuthenticatedCallback<H> {
    operation: String,
    middleware: Arc<AuthMiddleware>,
    inner: H,
}

impl<H: Callback> AuthenticatedCallback<H> {
    pub fn new(operation: impl Into<String>, middleware: Arc<AuthMiddleware>, inner: H) -> Self {
        Self {
            operation: operation.into(),
            middleware,
            inner,
        }
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }

    async fn authorize(&self, message: &str) -> Result<()> {
        let header = RequestHeader::parse(&self.operation, message)?;
        if header.scope.is_empty() && self.middleware.requires_scope(&self.operation) {
            return Err(Error::malformed_request(&self.operation, "missing scope"));
        }

        let request = AuthRequest::new(&self.operation, header.credential, header.scope);
        self.middleware.authorize(&request).await.map(|_| ())
    }
}

#[async_trait]
impl<H: Callback> Callback for AuthenticatedCallback<H> {
    async fn execute(&self, message: &str) -> Result<Reply> {
        if let Err(e) = self.authorize(message).await {
            if e.is_client_error() {
                tracing::debug!(operation = %self.operation, error = %e, "Request refused");
            } else {
                tracing::warn!(operation = %self.operation, error = %e, "Authorization failed");
            }
            return Ok(Reply::from_error(&e));
        }

        Ok(run_handler(&self.operation, &self.inner, message).await)
    }
}

/// Operations allowed to run without authorization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExemptOperations {
    operations: BTreeSet<String>,
}

impl ExemptOperations {
    pub fn new<I, S>(operations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            operations: operations.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, operation: &str) -> bool {
        self.operations.contains(operation)
    }
}

/// Runs a handler with no authorization; only for listed operations
pub struct UnauthenticatedCallback<H> {
    operation: String,
    inner: H,
}

impl<H: Callback> UnauthenticatedCallback<H> {
    pub fn new(operation: impl Into<String>, inner: H, exempt: &ExemptOperations) -> Result<Self> {
        let operation = operation.into();
        if !exempt.contains(&operation) {
            return Err(Error::configuration(format!(
                "operation '{operation}' is not exempt from authorization"
            )));
        }
        Ok(Self { operation, inner })
    }
}

#[async_trait]
impl<H: Callback> Callback for UnauthenticatedCallback<H> {
    async fn execute(&self, message: &str) -> Result<Reply> {
        Ok(run_handler(&self.operation, &self.inner, message).await)
    }
}

async fn run_handler<H: Callback>(operation: &str, inner: &H, message: &str) -> Reply {
    match inner.execute(message).await {
        Ok(reply) => {
            tracing::debug!(%operation, status = ?reply.status, "Handler completed");
            reply
        }
        Err(e) => {
            tracing::warn!(%operation, error = %e, "Handler failed");
            Reply::from_error(&e)
        }
    }
}
