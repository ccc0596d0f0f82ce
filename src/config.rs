// Configuration module for tia
// Reads from environment variables with sensible defaults

use std::env;
use std::sync::OnceLock;

/// Global configuration instance
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum reference-graph walk depth (TIA_TRACE_DEPTH)
    pub trace_depth: usize,

    /// Maximum symbols visited per trace walk (TIA_TRACE_SYMBOL_LIMIT)
    pub trace_symbol_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trace_depth: 5,
            trace_symbol_limit: 10_000,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        let mut config = Config::default();

        if let Ok(val) = env::var("TIA_TRACE_DEPTH") {
            if let Ok(parsed) = val.parse() {
                config.trace_depth = parsed;
            } else {
                eprintln!(
                    "tia: Warning: Invalid TIA_TRACE_DEPTH value: {}, using default: {}",
                    val, config.trace_depth
                );
            }
        }

        if let Ok(val) = env::var("TIA_TRACE_SYMBOL_LIMIT") {
            if let Ok(parsed) = val.parse() {
                config.trace_symbol_limit = parsed;
            } else {
                eprintln!(
                    "tia: Warning: Invalid TIA_TRACE_SYMBOL_LIMIT value: {}, using default: {}",
                    val, config.trace_symbol_limit
                );
            }
        }

        config
    }

    /// Get the global configuration instance
    pub fn get() -> &'static Config {
        CONFIG.get_or_init(Config::from_env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.trace_depth, 5);
        assert_eq!(config.trace_symbol_limit, 10_000);
    }
}
