//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::config::ObservabilityConfig;

/// Environment variable that overrides the configured filter.
pub const LOG_ENV_VAR: &str = "FACTGRAPH_LOG";

/// Install a global fmt subscriber. Returns false if one was already set,
/// so embedders and tests can call this more than once.
pub fn init_tracing(config: &ObservabilityConfig) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_a_no_op() {
        let config = ObservabilityConfig {
            log_level: "debug".into(),
            json: true,
        };
        init_tracing(&config);
        assert!(!init_tracing(&ObservabilityConfig::default()));
    }
}
