//! Shared fakes for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use bastion_authz::{
    AuditLog, AuthMiddleware, Callback, MemoryAuditSink, RemoteValidator, Reply, StaticValidator,
    ValidationResponse,
};
use bastion_config::AuthConfig;
use bastion_core::{Error, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How the fake validator behaves on the next call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Fail,
    Panic,
    Hang,
}

/// Validator that counts calls and can be told to misbehave
pub struct FakeValidator {
    tokens: StaticValidator,
    mode: Mutex<Mode>,
    validations: AtomicUsize,
    pings: AtomicUsize,
}

impl FakeValidator {
    pub fn new(tokens: StaticValidator) -> Arc<Self> {
        Arc::new(Self {
            tokens,
            mode: Mutex::new(Mode::Normal),
            validations: AtomicUsize::new(0),
            pings: AtomicUsize::new(0),
        })
    }

    pub fn set_mode(&self, mode: Mode) {
        *self.mode.lock() = mode;
    }

    pub fn validations(&self) -> usize {
        self.validations.load(Ordering::SeqCst)
    }

    pub fn pings(&self) -> usize {
        self.pings.load(Ordering::SeqCst)
    }

    pub fn tokens(&self) -> &StaticValidator {
        &self.tokens
    }

    fn mode(&self) -> Mode {
        *self.mode.lock()
    }
}

#[async_trait]
impl RemoteValidator for FakeValidator {
    fn endpoint(&self) -> &str {
        "fake://identity"
    }

    async fn validate(&self, credential: &str) -> Result<ValidationResponse> {
        self.validations.fetch_add(1, Ordering::SeqCst);
        match self.mode() {
            Mode::Normal => self.tokens.validate(credential).await,
            Mode::Fail => Err(Error::network("fake://identity", "connection refused")),
            Mode::Panic => panic!("validator bug"),
            Mode::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                self.tokens.validate(credential).await
            }
        }
    }

    async fn ping(&self) -> Result<()> {
        self.pings.fetch_add(1, Ordering::SeqCst);
        match self.mode() {
            Mode::Normal => Ok(()),
            Mode::Fail | Mode::Panic => Err(Error::network("fake://identity", "connection refused")),
            Mode::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            }
        }
    }
}

/// The tokens used across the scenarios
pub fn standard_tokens() -> StaticValidator {
    StaticValidator::new()
        .with_token("tok-A", "user-a", ["state:data:read"])
        .with_token("tok-L", "lister", ["state:scope:list"])
        .with_token("tok-W", "writer", ["state:scope:org.x:write"])
        .with_token("tok-S", "service-a", Vec::<String>::new())
        .with_token("tok-X", "service-b", ["state:cross-service:org.x:read"])
        .with_token("tok-root", "root", ["state:admin:system"])
        .with_service("tok-W", "svc-w")
        .with_service("tok-S", "svc-a")
        .with_service("tok-X", "svc-b")
}

pub struct Harness {
    pub middleware: Arc<AuthMiddleware>,
    pub validator: Arc<FakeValidator>,
    pub audit: Arc<MemoryAuditSink>,
}

pub fn harness_with(config: AuthConfig) -> Harness {
    let validator = FakeValidator::new(standard_tokens());
    let audit = Arc::new(MemoryAuditSink::default());
    let middleware = AuthMiddleware::builder(config, validator.clone())
        .audit(AuditLog::silent().with_sink(audit.clone()))
        .build()
        .unwrap();
    Harness {
        middleware: Arc::new(middleware),
        validator,
        audit,
    }
}

pub fn harness() -> Harness {
    harness_with(AuthConfig::default())
}

/// Handler that records every message it receives; clones share the record
#[derive(Clone, Default)]
pub struct RecordingHandler {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingHandler {
    pub fn calls(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

#[async_trait]
impl Callback for RecordingHandler {
    async fn execute(&self, message: &str) -> Result<Reply> {
        self.messages.lock().push(message.to_string());
        Ok(Reply::ok(serde_json::json!({ "handled": true })))
    }
}
