use crate::interceptor::BackupPattern;
use crate::{MockError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = ".partialmock.toml";

/// Method of the test case object wrapped by `setup_for`
pub const DEFAULT_TEARDOWN_METHOD: &str = "teardown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ScopeConfig {
    #[serde(default)]
    pub interception: InterceptionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterceptionConfig {
    /// Method of the test case that triggers `wipe`
    #[serde(default = "default_teardown_method")]
    pub teardown_method: String,
    /// Backup key pattern for hooked objects
    #[serde(default = "default_object_backup_pattern")]
    pub object_backup_pattern: String,
    /// Backup key pattern for the test case's own teardown
    #[serde(default = "default_test_case_backup_pattern")]
    pub test_case_backup_pattern: String,
    /// Keep a log of every intercepted invocation
    #[serde(default = "default_record_calls")]
    pub record_calls: bool,
}

impl Default for InterceptionConfig {
    fn default() -> Self {
        Self {
            teardown_method: default_teardown_method(),
            object_backup_pattern: default_object_backup_pattern(),
            test_case_backup_pattern: default_test_case_backup_pattern(),
            record_calls: default_record_calls(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives used when no environment override is set
    #[serde(default)]
    pub filter: Option<String>,
    /// Emit JSON lines instead of human readable output
    #[serde(default)]
    pub json: Option<bool>,
}

fn default_teardown_method() -> String {
    DEFAULT_TEARDOWN_METHOD.to_string()
}

fn default_object_backup_pattern() -> String {
    BackupPattern::SAVED_METHOD.to_string()
}

fn default_test_case_backup_pattern() -> String {
    BackupPattern::ORIGINAL.to_string()
}

fn default_record_calls() -> bool {
    true
}

impl ScopeConfig {
    /// Load configuration from a file in the working directory
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Load configuration from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(ScopeConfig::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            MockError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config: ScopeConfig = toml::from_str(&content).map_err(|e| {
            MockError::Config(format!(
                "Failed to parse TOML config from {:?}: {}",
                path, e
            ))
        })?;

        Ok(config)
    }

    /// Load default config if file is missing, otherwise fall back to defaults on parse failure
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load config: {}. Using defaults.", e);
                ScopeConfig::default()
            }
        }
    }

    /// Backup patterns, validated
    pub fn backup_patterns(&self) -> Result<(BackupPattern, BackupPattern)> {
        Ok((
            BackupPattern::new(&self.interception.object_backup_pattern)?,
            BackupPattern::new(&self.interception.test_case_backup_pattern)?,
        ))
    }
}
