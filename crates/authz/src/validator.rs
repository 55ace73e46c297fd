//! Remote credential validation
//!
//! [`RemoteValidator`] is the seam between the middleware and the identity
//! service. [`QueueValidator`] speaks JSON over any request/reply
//! [`MessageChannel`]; [`StaticValidator`] answers from an in-process table.

use async_trait::async_trait;
use bastion_core::{Error, Result};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

/// Validator reply for one credential
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Service the credential was issued to, if it belongs to one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    /// Credential expiry in epoch seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationResponse {
    /// A rejection with a reason
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: Some(message.into()),
            ..Self::default()
        }
    }
}

/// Something that can vouch for a credential
#[async_trait]
pub trait RemoteValidator: Send + Sync {
    /// Address used in logs and error messages
    fn endpoint(&self) -> &str;

    /// Validate one credential
    ///
    /// A credential the validator does not recognise is `Ok` with
    /// `valid: false`; `Err` is reserved for failing to get an answer.
    async fn validate(&self, credential: &str) -> Result<ValidationResponse>;

    /// Cheap reachability check
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// Opaque request/reply transport
#[async_trait]
pub trait MessageChannel: Send + Sync {
    fn endpoint(&self) -> &str;

    async fn send(&self, message: String) -> Result<String>;
}

/// Validator speaking JSON over a [`MessageChannel`]
#[derive(Debug)]
pub struct QueueValidator<C> {
    channel: C,
}

impl<C: MessageChannel> QueueValidator<C> {
    pub fn new(channel: C) -> Self {
        Self { channel }
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    async fn request(&self, body: Value) -> Result<Value> {
        let reply = self.channel.send(body.to_string()).await?;
        let value: Value = serde_json::from_str(&reply).map_err(|e| {
            Error::network(self.channel.endpoint(), format!("undecodable reply: {e}"))
        })?;

        if value.get("status").and_then(Value::as_str) == Some("error") {
            let message = value
                .get("error")
                .and_then(|e| e.get("message").or(Some(e)))
                .and_then(Value::as_str)
                .unwrap_or("validator reported an error");
            return Err(Error::network(self.channel.endpoint(), message));
        }
        Ok(value)
    }
}

#[async_trait]
impl<C: MessageChannel> RemoteValidator for QueueValidator<C> {
    fn endpoint(&self) -> &str {
        self.channel.endpoint()
    }

    async fn validate(&self, credential: &str) -> Result<ValidationResponse> {
        let value = self
            .request(json!({ "operation": "validate", "credential": credential }))
            .await?;
        let body = match value.get("data") {
            Some(data) if data.is_object() => data.clone(),
            _ => value,
        };
        serde_json::from_value(body).map_err(|e| {
            Error::network(
                self.channel.endpoint(),
                format!("malformed validation reply: {e}"),
            )
        })
    }

    async fn ping(&self) -> Result<()> {
        self.request(json!({ "operation": "ping" })).await.map(|_| ())
    }
}

/// Entry in a [`StaticValidator`]
#[derive(Debug, Clone)]
struct StaticIdentity {
    principal_id: String,
    service: Option<String>,
    permissions: Vec<String>,
    expires_at: Option<DateTime<Utc>>,
}

/// Validator backed by a fixed in-process token table
#[derive(Debug, Default)]
pub struct StaticValidator {
    tokens: RwLock<HashMap<String, StaticIdentity>>,
}

impl StaticValidator {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token<I, S>(self, credential: impl Into<String>, principal_id: impl Into<String>, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_token(credential, principal_id, permissions, None);
        self
    }

    pub fn add_token<I, S>(
        &self,
        credential: impl Into<String>,
        principal_id: impl Into<String>,
        permissions: I,
        expires_at: Option<DateTime<Utc>>,
    ) where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tokens.write().insert(
            credential.into(),
            StaticIdentity {
                principal_id: principal_id.into(),
                service: None,
                permissions: permissions.into_iter().map(Into::into).collect(),
                expires_at,
            },
        );
    }

    /// Attach a service claim to an already registered credential
    #[must_use]
    pub fn with_service(self, credential: &str, service: impl Into<String>) -> Self {
        if let Some(identity) = self.tokens.write().get_mut(credential) {
            identity.service = Some(service.into());
        }
        self
    }

    pub fn revoke_token(&self, credential: &str) -> bool {
        self.tokens.write().remove(credential).is_some()
    }
}

#[async_trait]
impl RemoteValidator for StaticValidator {
    fn endpoint(&self) -> &str {
        "static"
    }

    async fn validate(&self, credential: &str) -> Result<ValidationResponse> {
        let tokens = self.tokens.read();
        let Some(identity) = tokens.get(credential) else {
            return Ok(ValidationResponse::rejected("unknown credential"));
        };
        if identity.expires_at.is_some_and(|at| at <= Utc::now()) {
            return Ok(ValidationResponse::rejected("credential expired"));
        }
        Ok(ValidationResponse {
            valid: true,
            principal_id: Some(identity.principal_id.clone()),
            service: identity.service.clone(),
            permissions: identity.permissions.clone(),
            expires_at: identity.expires_at.map(|at| at.timestamp()),
            ..ValidationResponse::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    struct ScriptedChannel {
        reply: String,
        sent: Mutex<Vec<String>>,
    }

    impl ScriptedChannel {
        fn replying(reply: Value) -> Self {
            Self {
                reply: reply.to_string(),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MessageChannel for ScriptedChannel {
        fn endpoint(&self) -> &str {
            "tcp://identity:5555"
        }

        async fn send(&self, message: String) -> Result<String> {
            self.sent.lock().push(message);
            Ok(self.reply.clone())
        }
    }

    #[tokio::test]
    async fn test_queue_validator_round_trip() {
        let validator = QueueValidator::new(ScriptedChannel::replying(json!({
            "valid": true,
            "principalId": "u-1",
            "email": "ada@example.com",
            "permissions": ["state:data:read"],
            "service": "svc-a",
            "expiresAt": 4102444800i64
        })));

        let response = validator.validate("tok-A").await.unwrap();
        assert!(response.valid);
        assert_eq!(response.principal_id.as_deref(), Some("u-1"));
        assert_eq!(response.expires_at, Some(4_102_444_800));
        assert_eq!(response.service.as_deref(), Some("svc-a"));

        let sent = validator.channel().sent.lock().clone();
        let request: Value = serde_json::from_str(&sent[0]).unwrap();
        assert_eq!(request["operation"], "validate");
        assert_eq!(request["credential"], "tok-A");
    }

    #[tokio::test]
    async fn test_queue_validator_unwraps_data_field() {
        let validator = QueueValidator::new(ScriptedChannel::replying(json!({
            "status": "ok",
            "data": { "valid": false, "message": "expired" }
        })));
        let response = validator.validate("tok").await.unwrap();
        assert!(!response.valid);
        assert_eq!(response.message.as_deref(), Some("expired"));
    }

    #[tokio::test]
    async fn test_error_status_is_network_failure() {
        let validator = QueueValidator::new(ScriptedChannel::replying(json!({
            "status": "error",
            "error": { "kind": "internal", "message": "database down" }
        })));
        let err = validator.validate("tok").await.unwrap_err();
        assert!(matches!(err, Error::Network { .. }));
        assert!(err.is_dependency_failure());
        assert!(validator.ping().await.is_err());
    }

    #[tokio::test]
    async fn test_garbage_reply_is_network_failure() {
        struct Garbage;

        #[async_trait]
        impl MessageChannel for Garbage {
            fn endpoint(&self) -> &str {
                "garbage"
            }

            async fn send(&self, _message: String) -> Result<String> {
                Ok("not json".to_string())
            }
        }

        let err = QueueValidator::new(Garbage).validate("tok").await.unwrap_err();
        assert!(matches!(err, Error::Network { .. }));
    }

    #[tokio::test]
    async fn test_static_validator() {
        let validator = StaticValidator::new()
            .with_token("tok-A", "u-1", ["state:data:read"])
            .with_token("tok-S", "svc-a-identity", Vec::<String>::new())
            .with_service("tok-S", "svc-a");
        assert!(validator.validate("tok-A").await.unwrap().valid);
        assert!(validator.validate("tok-A").await.unwrap().service.is_none());
        assert_eq!(validator.validate("tok-S").await.unwrap().service.as_deref(), Some("svc-a"));
        assert!(!validator.validate("tok-B").await.unwrap().valid);

        validator.add_token("tok-C", "u-3", Vec::<String>::new(), Some(Utc::now() - chrono::Duration::seconds(1)));
        assert!(!validator.validate("tok-C").await.unwrap().valid);

        assert!(validator.revoke_token("tok-A"));
        assert!(!validator.validate("tok-A").await.unwrap().valid);
    }
}
