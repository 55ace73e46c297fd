//! Tracing subscriber setup.
//!
//! Services call [`init`] once at startup. Authorization decisions are emitted
//! on the `bastion::audit` target, so `RUST_LOG=bastion::audit=info` isolates
//! the audit stream.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use tracing::{debug, error, info, instrument, span, trace, warn, Level, Span};

type InitResult = Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the tracing system with a compact, human-readable formatter
///
/// ANSI colours are only enabled when stderr is a terminal. Fails if a global
/// subscriber is already installed.
pub fn init() -> InitResult {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(is_tty())
        .compact()
        .with_target(true)
        .with_thread_ids(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Initialize the tracing system with one JSON object per event
pub fn init_json() -> InitResult {
    let json_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .json()
        .with_current_span(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(json_layer)
        .try_init()?;

    Ok(())
}

/// Check if we're running in a TTY environment
fn is_tty() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stderr())
}

/// Span wrapping one authorization decision
pub fn authorization_span(operation: &str, scope: &str) -> Span {
    span!(Level::INFO, "authorize", operation = %operation, scope = %scope)
}
