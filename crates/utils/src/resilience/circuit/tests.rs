//! Integration tests for circuit breaker functionality.
//!
//! These tests drive the full breaker lifecycle with a paused tokio clock.

#[cfg(test)]
mod integration_tests {
    use super::super::{
        config::CircuitBreakerConfig,
        state::CircuitBreaker,
        types::CircuitState,
    };
    use bastion_core::{Error, Result};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_full_circuit_breaker_lifecycle() {
        let config = CircuitBreakerConfig::new("identity")
            .with_failure_limit(3)
            .with_reset_timeout(Duration::from_secs(30));

        let cb = CircuitBreaker::new(config);
        let counter = Arc::new(AtomicUsize::new(0));
        let should_fail = Arc::new(AtomicBool::new(true));

        let attempt = || {
            let counter = Arc::clone(&counter);
            let should_fail = Arc::clone(&should_fail);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                if should_fail.load(Ordering::SeqCst) {
                    Err(Error::network("identity", "connection refused"))
                } else {
                    Ok(())
                }
            }
        };

        // Initially closed
        assert_eq!(cb.state().await, CircuitState::Closed);

        // Exactly failure_limit failures open the circuit
        for _ in 0..3 {
            let _: Result<()> = cb.call(attempt).await;
        }
        assert_eq!(cb.state().await, CircuitState::Open);
        assert_eq!(counter.load(Ordering::SeqCst), 3);

        // Calls before the reset timeout are rejected without running
        tokio::time::advance(Duration::from_secs(10)).await;
        let result: Result<()> = cb.call(attempt).await;
        assert!(matches!(result, Err(Error::CircuitOpen { .. })));
        assert_eq!(counter.load(Ordering::SeqCst), 3);

        // Past the reset timeout the next call is let through
        tokio::time::advance(Duration::from_secs(21)).await;
        assert_eq!(cb.state().await, CircuitState::HalfOpen);
        should_fail.store(false, Ordering::SeqCst);

        cb.call(attempt).await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 4);
        assert_eq!(cb.state().await, CircuitState::Closed);
        assert_eq!(cb.failure_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reopened_circuit_waits_a_full_timeout_again() {
        let config = CircuitBreakerConfig::new("identity")
            .with_failure_limit(1)
            .with_reset_timeout(Duration::from_secs(5));
        let cb = CircuitBreaker::new(config);

        let _: Result<()> = cb
            .call(|| async { Err(Error::timeout("validate", Duration::from_secs(1))) })
            .await;
        tokio::time::advance(Duration::from_secs(6)).await;

        // Probe fails, circuit re-opens with a fresh last-failure time
        let _: Result<()> = cb
            .call(|| async { Err(Error::internal("panicked")) })
            .await;
        assert_eq!(cb.state().await, CircuitState::Open);

        tokio::time::advance(Duration::from_secs(3)).await;
        let result: Result<()> = cb.call(|| async { Ok(()) }).await;
        assert!(matches!(result, Err(Error::CircuitOpen { .. })));

        tokio::time::advance(Duration::from_secs(3)).await;
        assert!(cb.call(|| async { Ok(()) }).await.is_ok());
    }

    #[tokio::test]
    async fn test_stats_track_calls_and_rejections() {
        let cb = CircuitBreaker::new(CircuitBreakerConfig::new("broker").with_failure_limit(2));

        for _ in 0..2 {
            let _: Result<()> = cb
                .call(|| async { Err(Error::network("broker", "down")) })
                .await;
        }
        for _ in 0..3 {
            let _: Result<()> = cb.call(|| async { Ok(()) }).await;
        }

        let stats = cb.stats().await;
        assert_eq!(stats.state, CircuitState::Open);
        assert_eq!(stats.failure_count, 2);
        assert_eq!(stats.failure_limit, 2);
        assert_eq!(stats.total_calls, 2);
        assert_eq!(stats.rejected_calls, 3);
        assert!(stats.last_failure_time.is_some());
    }

    #[tokio::test]
    async fn test_concurrent_failures_open_once() {
        let cb = Arc::new(CircuitBreaker::new(
            CircuitBreakerConfig::new("broker").with_failure_limit(4),
        ));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cb = Arc::clone(&cb);
            handles.push(tokio::spawn(async move {
                let _: Result<()> = cb
                    .call(|| async { Err(Error::network("broker", "down")) })
                    .await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(cb.state().await, CircuitState::Open);
        let stats = cb.stats().await;
        assert_eq!(stats.total_calls + stats.rejected_calls, 8);
    }
}
