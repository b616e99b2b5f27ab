//! Engine configuration (`rpncalc.toml`) parsing.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tunables for a calculator engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Maximum number of undo snapshots kept (default: 100).
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Whether stack-to-list puts X last and list-to-stack leaves the last
    /// element on top (default: true).
    #[serde(default = "default_invert_lists")]
    pub invert_lists: bool,

    /// Trailing snapshots the `undo` action discards before restoring
    /// (default: 2, the ones recorded by typing `undo` and committing it).
    #[serde(default = "default_undo_discard")]
    pub undo_discard: usize,

    /// Statements entered and committed when the engine starts.
    #[serde(default = "default_startup")]
    pub startup: Vec<String>,
}

fn default_history_capacity() -> usize {
    100
}

fn default_invert_lists() -> bool {
    true
}

fn default_undo_discard() -> usize {
    2
}

fn default_startup() -> Vec<String> {
    vec!["import math as math".to_string(), "import numpy as np".to_string()]
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            invert_lists: default_invert_lists(),
            undo_discard: default_undo_discard(),
            startup: default_startup(),
        }
    }
}

impl EngineConfig {
    /// The default configuration without startup statements.
    pub fn bare() -> Self {
        Self {
            startup: Vec::new(),
            ..Self::default()
        }
    }

    /// Load a configuration from a file path.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_owned(),
            source: e,
        })?;

        Self::from_str(&content, path)
    }

    /// Parse a configuration from a string.
    pub fn from_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_owned(),
            source: e,
        })?;

        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        if self.history_capacity == 0 {
            return Err(ConfigError::Invalid {
                path: path.to_owned(),
                field: "history_capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        if let Some(blank) = self.startup.iter().position(|s| s.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                path: path.to_owned(),
                field: "startup",
                reason: format!("statement {} is empty", blank + 1),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_path() -> PathBuf {
        PathBuf::from("test/rpncalc.toml")
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = EngineConfig::from_str("", &test_path()).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.history_capacity, 100);
        assert!(config.invert_lists);
        assert_eq!(config.undo_discard, 2);
        assert_eq!(config.startup, vec!["import math as math", "import numpy as np"]);
    }

    #[test]
    fn parse_full_config() {
        let content = r#"
            history_capacity = 10
            invert_lists = false
            undo_discard = 0
            startup = ["import random", "rate = 0.07"]
        "#;

        let config = EngineConfig::from_str(content, &test_path()).unwrap();
        assert_eq!(config.history_capacity, 10);
        assert!(!config.invert_lists);
        assert_eq!(config.undo_discard, 0);
        assert_eq!(config.startup, vec!["import random", "rate = 0.07"]);
    }

    #[test]
    fn zero_capacity_fails() {
        let result = EngineConfig::from_str("history_capacity = 0", &test_path());
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { field: "history_capacity", .. })
        ));
    }

    #[test]
    fn blank_startup_statement_fails() {
        let result = EngineConfig::from_str(r#"startup = ["import math", "  "]"#, &test_path());
        assert!(matches!(result, Err(ConfigError::Invalid { field: "startup", .. })));
    }

    #[test]
    fn invalid_toml_fails() {
        let result = EngineConfig::from_str("this is not valid toml [[[", &test_path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn unknown_key_fails() {
        let result = EngineConfig::from_str("history = 3", &test_path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn round_trips_through_toml() {
        let config = EngineConfig::bare();
        let text = toml::to_string(&config).unwrap();
        assert_eq!(EngineConfig::from_str(&text, &test_path()).unwrap(), config);
    }
}
