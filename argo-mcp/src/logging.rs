//! Log output setup
//!
//! Logs go to stderr: stdout carries the MCP transport when the tools are
//! served over stdio.

use crate::config::Config;
use tracing_subscriber::EnvFilter;

const FALLBACK_FILTER: &str = "info";

/// Filter from `RUST_LOG` when set, else from the configured filter, else
/// `info` when the configured filter does not parse
pub fn env_filter(config: &Config) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new(FALLBACK_FILTER))
}

/// Install the global subscriber. Returns false when one is already installed,
/// in which case nothing changes.
pub fn init(config: &Config) -> bool {
    let installed = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter(config))
        .with_ansi(false)
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!("Logging initialized with filter '{}'", config.log_filter);
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[serial_test::serial]
    fn test_init_twice_is_a_no_op() {
        let config = Config::default();
        init(&config);
        assert!(!init(&config));
    }

    #[test]
    #[serial_test::serial]
    fn test_env_filter_falls_back_on_bad_filter() {
        std::env::remove_var("RUST_LOG");
        let config = Config {
            log_filter: "argo_mcp=notalevel".to_string(),
            ..Config::default()
        };
        assert_eq!(env_filter(&config).to_string(), FALLBACK_FILTER);

        let config = Config {
            log_filter: "argo_mcp=debug".to_string(),
            ..Config::default()
        };
        assert_eq!(env_filter(&config).to_string(), "argo_mcp=debug");
    }
}
