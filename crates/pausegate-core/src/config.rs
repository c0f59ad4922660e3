//! Configuration file support
//!
//! Loads configuration from ~/.config/pausegate/config.toml

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::approval::ThresholdRule;
use crate::compaction::{CompactionPolicy, DEFAULT_MAX_LINE_CHARS, TranscriptSummarizer};
use crate::error::Result;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PausegateConfig {
    #[serde(default)]
    pub approval: ApprovalSettings,
    #[serde(default)]
    pub compaction: CompactionSettings,
    #[serde(default)]
    pub storage: StorageSettings,
}

/// Approval gate settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApprovalSettings {
    /// Seconds after which a pending approval counts as stale
    pub timeout_secs: u64,
    /// Rule deciding which actions are auto-approved
    pub rule: ThresholdRule,
}

impl Default for ApprovalSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 300,
            rule: ThresholdRule::default(),
        }
    }
}

impl ApprovalSettings {
    pub fn timeout(&self) -> TimeDelta {
        i64::try_from(self.timeout_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX)
    }
}

/// History compaction settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompactionSettings {
    pub compaction_interval: usize,
    pub overlap_size: usize,
    /// Maximum characters per line in generated summaries
    pub max_line_chars: usize,
}

impl Default for CompactionSettings {
    fn default() -> Self {
        Self {
            compaction_interval: 6,
            overlap_size: 2,
            max_line_chars: DEFAULT_MAX_LINE_CHARS,
        }
    }
}

impl CompactionSettings {
    /// Validate the window settings into a policy.
    pub fn policy(&self) -> Result<CompactionPolicy> {
        CompactionPolicy::new(self.compaction_interval, self.overlap_size)
    }

    pub fn summarizer(&self) -> TranscriptSummarizer {
        TranscriptSummarizer::new(self.max_line_chars)
    }
}

/// Storage settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Database path; defaults to the data directory when unset
    pub db_path: Option<PathBuf>,
}

impl PausegateConfig {
    /// Load configuration from the default path
    pub fn load() -> anyhow::Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific path. A missing file yields the
    /// defaults; an unreadable or malformed one is an error.
    pub fn load_from_path(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.compaction.policy()?;
        Ok(config)
    }

    /// Get the default configuration file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("pausegate").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = PausegateConfig::default();
        assert_eq!(config.approval.timeout(), TimeDelta::seconds(300));
        assert_eq!(config.approval.rule, ThresholdRule::new("containers", 5.0));
        let policy = config.compaction.policy().unwrap();
        assert_eq!(policy.compaction_interval(), 6);
        assert_eq!(policy.overlap_size(), 2);
        assert!(config.storage.db_path.is_none());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = PausegateConfig::from_toml_str(
            r#"
            [approval]
            timeout_secs = 60

            [approval.rule]
            field = "num_containers"
            max = 10.0

            [compaction]
            overlap_size = 1
            "#,
        )
        .unwrap();

        assert_eq!(config.approval.timeout_secs, 60);
        assert_eq!(config.approval.rule, ThresholdRule::new("num_containers", 10.0));
        assert_eq!(config.compaction.compaction_interval, 6);
        assert_eq!(config.compaction.overlap_size, 1);
        assert_eq!(config.compaction.max_line_chars, DEFAULT_MAX_LINE_CHARS);
    }

    #[test]
    fn test_invalid_window_is_rejected() {
        let err = PausegateConfig::from_toml_str(
            r#"
            [compaction]
            compaction_interval = 3
            overlap_size = 5
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("overlap"));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = PausegateConfig::load_from_path(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, PausegateConfig::default());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[approval\ntimeout_secs = ").unwrap();
        let err = PausegateConfig::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid config file"));
    }

    #[test]
    fn test_huge_timeout_saturates() {
        let settings = ApprovalSettings {
            timeout_secs: u64::MAX,
            ..ApprovalSettings::default()
        };
        assert_eq!(settings.timeout(), TimeDelta::MAX);
    }
}
