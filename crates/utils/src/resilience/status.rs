//! Resilient polling of service status.
//!
//! Each registered service gets its own [`CircuitBreaker`]; every probe runs
//! through the shared [`ResilientInvoker`] with the health timeout, so a hung
//! or crashing service can neither stall the poll nor take the poller down.
//! A service whose breaker is open is reported unreachable without being
//! contacted.

use super::circuit::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
use super::invoker::ResilientInvoker;
use async_trait::async_trait;
use bastion_core::{Error, Result};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// A health check for one remote service
#[async_trait]
pub trait StatusProbe: Send + Sync {
    /// Succeeds when the service answers its health request
    async fn probe(&self) -> anyhow::Result<()>;
}

/// Outcome of polling one service
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub name: String,
    pub reachable: bool,
    pub breaker_state: CircuitState,
    pub error: Option<String>,
    pub checked_at: DateTime<Utc>,
}

struct PolledService {
    probe: Arc<dyn StatusProbe>,
    breaker: Arc<CircuitBreaker>,
}

/// Polls a set of named services through per-service circuit breakers
pub struct ServicePoller {
    services: DashMap<String, PolledService>,
    invoker: ResilientInvoker,
    timeout: Duration,
    breaker_template: CircuitBreakerConfig,
    latest: RwLock<Vec<ServiceStatus>>,
}

impl ServicePoller {
    /// Create a poller; `breaker_template` is copied for every service
    pub fn new(timeout: Duration, breaker_template: CircuitBreakerConfig) -> Self {
        Self {
            services: DashMap::new(),
            invoker: ResilientInvoker::new("service-status", timeout),
            timeout,
            breaker_template,
            latest: RwLock::new(Vec::new()),
        }
    }

    /// Register (or replace) a service probe
    pub fn register(&self, name: impl Into<String>, probe: Arc<dyn StatusProbe>) {
        let name = name.into();
        let config = CircuitBreakerConfig {
            name: name.clone(),
            ..self.breaker_template.clone()
        };
        self.services.insert(
            name,
            PolledService {
                probe,
                breaker: Arc::new(CircuitBreaker::new(config)),
            },
        );
    }

    /// Stop polling a service; returns whether it was registered
    pub fn unregister(&self, name: &str) -> bool {
        self.services.remove(name).is_some()
    }

    /// Poll a single service
    pub async fn poll_one(&self, name: &str) -> Option<ServiceStatus> {
        let (probe, breaker) = {
            let entry = self.services.get(name)?;
            (Arc::clone(&entry.probe), Arc::clone(&entry.breaker))
        };
        Some(self.check(name.to_string(), probe, breaker).await)
    }

    /// Poll every registered service concurrently, sorted by name
    pub async fn poll_all(&self) -> Vec<ServiceStatus> {
        // Clone handles out first; DashMap guards must not live across awaits
        let targets: Vec<_> = self
            .services
            .iter()
            .map(|entry| {
                (
                    entry.key().clone(),
                    Arc::clone(&entry.probe),
                    Arc::clone(&entry.breaker),
                )
            })
            .collect();

        let mut statuses = futures::future::join_all(
            targets
                .into_iter()
                .map(|(name, probe, breaker)| self.check(name, probe, breaker)),
        )
        .await;
        statuses.sort_by(|a, b| a.name.cmp(&b.name));

        *self.latest.write() = statuses.clone();
        statuses
    }

    /// Statuses from the most recent [`poll_all`](Self::poll_all)
    pub fn latest(&self) -> Vec<ServiceStatus> {
        self.latest.read().clone()
    }

    /// Poll every `interval` on a background task until the handle is aborted
    pub fn spawn(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let statuses = self.poll_all().await;
                let down = statuses.iter().filter(|s| !s.reachable).count();
                if down > 0 {
                    tracing::warn!(down, total = statuses.len(), "services unreachable");
                } else {
                    tracing::debug!(total = statuses.len(), "all services reachable");
                }
            }
        })
    }

    async fn check(
        &self,
        name: String,
        probe: Arc<dyn StatusProbe>,
        breaker: Arc<CircuitBreaker>,
    ) -> ServiceStatus {
        let endpoint = name.clone();
        let result: Result<()> = breaker
            .call(|| {
                self.invoker.invoke(
                    move || async move {
                        probe
                            .probe()
                            .await
                            .map_err(|e| Error::network(endpoint, format!("{e:#}")))
                    },
                    self.timeout,
                )
            })
            .await;

        ServiceStatus {
            reachable: result.is_ok(),
            breaker_state: breaker.state().await,
            error: result.err().map(|e| e.to_string()),
            checked_at: Utc::now(),
            name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Healthy;

    #[async_trait]
    impl StatusProbe for Healthy {
        async fn probe(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    struct Down {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl StatusProbe for Down {
        async fn probe(&self) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("connection refused")
        }
    }

    struct Hung;

    #[async_trait]
    impl StatusProbe for Hung {
        async fn probe(&self) -> anyhow::Result<()> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
    }

    fn poller() -> ServicePoller {
        ServicePoller::new(
            Duration::from_millis(200),
            CircuitBreakerConfig::default().with_failure_limit(2),
        )
    }

    #[tokio::test]
    async fn test_poll_all_reports_each_service() {
        let poller = poller();
        poller.register("state", Arc::new(Healthy));
        poller.register(
            "broker",
            Arc::new(Down {
                calls: AtomicUsize::new(0),
            }),
        );

        let statuses = poller.poll_all().await;
        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].name, "broker");
        assert!(!statuses[0].reachable);
        assert!(statuses[0]
            .error
            .as_deref()
            .unwrap()
            .contains("connection refused"));
        assert_eq!(statuses[1].name, "state");
        assert!(statuses[1].reachable);
        assert_eq!(poller.latest().len(), 2);
    }

    #[tokio::test]
    async fn test_open_breaker_skips_probe() {
        let poller = poller();
        let down = Arc::new(Down {
            calls: AtomicUsize::new(0),
        });
        poller.register("broker", down.clone());

        for _ in 0..4 {
            poller.poll_one("broker").await.unwrap();
        }

        assert_eq!(down.calls.load(Ordering::SeqCst), 2);
        let status = poller.poll_one("broker").await.unwrap();
        assert_eq!(status.breaker_state, CircuitState::Open);
        assert!(!status.reachable);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_service_times_out() {
        let poller = poller();
        poller.register("identity", Arc::new(Hung));

        let status = poller.poll_one("identity").await.unwrap();
        assert!(!status.reachable);
        assert!(status.error.unwrap().contains("timed out"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_loop_keeps_polling() {
        let poller = Arc::new(poller());
        let down = Arc::new(Down {
            calls: AtomicUsize::new(0),
        });
        poller.register("broker", down.clone());
        poller.register("state", Arc::new(Healthy));
        assert!(poller.latest().is_empty());

        let handle = Arc::clone(&poller).spawn(Duration::from_secs(10));
        tokio::time::sleep(Duration::from_secs(25)).await;
        handle.abort();

        // Ticks at 0s, 10s and 20s; the third finds the breaker open
        assert_eq!(down.calls.load(Ordering::SeqCst), 2);
        let latest = poller.latest();
        assert_eq!(latest.len(), 2);
        assert!(!latest[0].reachable);
        assert!(latest[1].reachable);
    }

    #[tokio::test]
    async fn test_unknown_service() {
        let poller = poller();
        assert!(poller.poll_one("missing").await.is_none());
        assert!(!poller.unregister("missing"));
    }
}
