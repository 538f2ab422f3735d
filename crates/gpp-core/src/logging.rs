//! Tracing subscriber bootstrap

use crate::config::AnalyzerConfig;
use crate::error::GppError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter from `RUST_LOG`, falling back to `default_filter`
///
/// # Errors
/// Returns [`GppError::BadRequest`] if `default_filter` is not a valid
/// directive.
pub fn env_filter(default_filter: &str) -> Result<EnvFilter, GppError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(default_filter)
            .map_err(|e| GppError::bad_request(format!("invalid log filter '{default_filter}': {e}"))),
    }
}

/// Install the global subscriber described by `config`
///
/// # Errors
/// Returns [`GppError`] if the filter is invalid or a global subscriber is
/// already installed.
pub fn init(config: &AnalyzerConfig) -> Result<(), GppError> {
    let filter = env_filter(&config.log_filter)?;
    let result = if config.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
    };
    result.map_err(|e| GppError::internal(format!("failed to install tracing subscriber: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_module_directives() {
        assert!(env_filter("gpp_patch=debug,info").is_ok());
    }

    #[test]
    fn second_init_is_an_error_not_a_panic() {
        let config = AnalyzerConfig::default();
        let _ = init(&config);
        let err = init(&config).unwrap_err();
        assert!(err.message().starts_with("failed to install tracing subscriber"));
    }
}
