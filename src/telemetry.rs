// ============================================================================
// Telemetry
// Structured logging setup for binaries embedding the engine
// ============================================================================

//! The engine itself only emits `tracing` events. Hosts that do not install
//! their own subscriber can call [`init_logging`] (cargo feature `logging`).

#[cfg(feature = "logging")]
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Install a fmt subscriber filtered by `RUST_LOG` (default `info`).
///
/// Returns `false` if a global subscriber was already installed, so calling it
/// more than once is harmless.
#[cfg(feature = "logging")]
pub fn init_logging() -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()
        .is_ok()
}

#[cfg(all(test, feature = "logging"))]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging();
        assert!(!init_logging());
    }
}
