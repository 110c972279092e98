//! Layered configuration.
//!
//! Sources, highest priority first:
//! 1. Environment variables (`AIMCR_*`, `__` separates sections, e.g.
//!    `AIMCR_REPORT__NOTES_OVERFLOW_THRESHOLD=600`)
//! 2. An explicit config file, or `aimcr.toml` in the working directory
//! 3. Built-in defaults

use crate::error::{CoreError, CoreResult};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "AIMCR_";
pub const DEFAULT_CONFIG_FILE: &str = "aimcr.toml";

fn default_drafts_dir() -> PathBuf {
    PathBuf::from("drafts")
}

fn default_submissions_dir() -> PathBuf {
    PathBuf::from(".")
}

const fn default_autosave_interval_secs() -> u64 {
    30
}

const fn default_notes_overflow_threshold() -> usize {
    800
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    #[serde(default = "default_drafts_dir")]
    pub drafts_dir: PathBuf,
    /// Parent directory of final `AIMCR-<project>-<date>` folders.
    #[serde(default = "default_submissions_dir")]
    pub submissions_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            drafts_dir: default_drafts_dir(),
            submissions_dir: default_submissions_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionConfig {
    #[serde(default = "default_autosave_interval_secs")]
    pub autosave_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            autosave_interval_secs: default_autosave_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Markdown,
    Html,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportConfig {
    /// Notes longer than this many characters move out of the check table.
    #[serde(default = "default_notes_overflow_threshold")]
    pub notes_overflow_threshold: usize,
    #[serde(default)]
    pub format: ReportFormat,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            notes_overflow_threshold: default_notes_overflow_threshold(),
            format: ReportFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

impl ReviewConfig {
    /// Load from defaults, the config file and the environment.
    ///
    /// An explicit `config_file` must exist; the default `aimcr.toml` is optional.
    pub fn load(config_file: Option<&Path>) -> CoreResult<Self> {
        if let Some(path) = config_file {
            if !path.is_file() {
                return Err(CoreError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
        }
        let config: Self = Self::figment(config_file)
            .extract()
            .map_err(|e| CoreError::Config(e.to_string()))?;
        config.validated()
    }

    pub fn figment(config_file: Option<&Path>) -> Figment {
        let file = config_file
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn validated(self) -> CoreResult<Self> {
        if self.report.notes_overflow_threshold == 0 {
            return Err(CoreError::Config(
                "report.notes_overflow_threshold must be greater than zero".to_string(),
            ));
        }
        if self.session.autosave_interval_secs == 0 {
            return Err(CoreError::Config(
                "session.autosave_interval_secs must be greater than zero".to_string(),
            ));
        }
        if i64::try_from(self.session.autosave_interval_secs).is_err() {
            return Err(CoreError::Config(format!(
                "session.autosave_interval_secs must not exceed {}",
                i64::MAX
            )));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_are_correct() {
        let config = ReviewConfig::default();
        assert_eq!(config.storage.drafts_dir, PathBuf::from("drafts"));
        assert_eq!(config.session.autosave_interval_secs, 30);
        assert_eq!(config.report.notes_overflow_threshold, 800);
        assert_eq!(config.report.format, ReportFormat::Markdown);
    }

    #[test]
    fn file_then_env_layers_apply() {
        Jail::expect_with(|jail| {
            jail.create_file(
                DEFAULT_CONFIG_FILE,
                r#"
                [storage]
                drafts_dir = "review-drafts"

                [report]
                format = "html"
                notes_overflow_threshold = 400
                "#,
            )?;
            jail.set_env("AIMCR_REPORT__NOTES_OVERFLOW_THRESHOLD", "500");

            let config = ReviewConfig::load(None).expect("config loads");
            assert_eq!(config.storage.drafts_dir, PathBuf::from("review-drafts"));
            assert_eq!(config.report.format, ReportFormat::Html);
            assert_eq!(config.report.notes_overflow_threshold, 500);
            assert_eq!(config.session.autosave_interval_secs, 30);
            Ok(())
        });
    }

    #[test]
    fn zero_threshold_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("AIMCR_REPORT__NOTES_OVERFLOW_THRESHOLD", "0");
            let err = ReviewConfig::load(None).unwrap_err();
            assert!(err.to_string().contains("notes_overflow_threshold"));
            Ok(())
        });
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        Jail::expect_with(|_jail| {
            let err = ReviewConfig::load(Some(Path::new("nope.toml"))).unwrap_err();
            assert!(matches!(err, CoreError::Config(_)));
            Ok(())
        });
    }

    #[test]
    fn autosave_interval_beyond_signed_range_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("AIMCR_SESSION__AUTOSAVE_INTERVAL_SECS", u64::MAX);
            let err = ReviewConfig::load(None).unwrap_err();
            assert!(matches!(err, CoreError::Config(ref msg) if msg.contains("autosave_interval_secs")));
            Ok(())
        });
    }
}
