//! Logging setup.
//!
//! One global `tracing` subscriber: `RUST_LOG` when set, otherwise the
//! caller's default directive, rendered by the fmt layer.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

pub const DEFAULT_FILTER: &str = "heart_risk=info,tower_http=info";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_tracing(default_filter: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    Registry::default()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_install_is_rejected() {
        let _ = init_tracing(DEFAULT_FILTER);
        assert!(init_tracing(DEFAULT_FILTER).is_err());
    }
}
