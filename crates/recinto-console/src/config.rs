//! Console configuration, read from TOML.
//!
//! Lookup order: `--config <path>`, then `<config dir>/recinto/config.toml`
//! when it exists, then built-in defaults. Command-line flags are applied
//! on top of whatever was loaded.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use recinto_overlay::VoteOverlayConfig;
use recinto_poll::PollConfig;
use recinto_protocol::{
    FETCH_TIMEOUT_MS, POLL_INTERVAL_MS, STATE_ENDPOINT, VOTE_RESULT_COOLDOWN_MS,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsoleConfig {
    pub backend: BackendConfig,
    pub seating: SeatingConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendConfig {
    pub base_url: String,
    pub state_endpoint: String,
    pub poll_interval_ms: u64,
    pub fetch_timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            state_endpoint: STATE_ENDPOINT.to_string(),
            poll_interval_ms: POLL_INTERVAL_MS,
            fetch_timeout_ms: FETCH_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeatingConfig {
    /// How long vote results stay on the seats after the vote closes.
    pub vote_result_cooldown_ms: u64,
    /// Columns between two seat cells.
    pub cell_gap: u16,
}

impl Default for SeatingConfig {
    fn default() -> Self {
        Self {
            vote_result_cooldown_ms: VOTE_RESULT_COOLDOWN_MS,
            cell_gap: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    pub level: String,
    pub format: LogFormat,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            file: None,
        }
    }
}

/// Values given on the command line; `None` keeps the configured value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub log_level: Option<String>,
}

/// `<config dir>/recinto/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("recinto").join("config.toml"))
}

impl ConsoleConfig {
    pub fn from_toml_str(raw: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(raw).context("invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("in config file {}", path.display()))
    }

    /// An explicit path must exist; the default location is optional.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn apply_overrides(&mut self, overrides: &Overrides) -> anyhow::Result<()> {
        if let Some(url) = &overrides.base_url {
            self.backend.base_url = url.clone();
        }
        if let Some(ms) = overrides.poll_interval_ms {
            self.backend.poll_interval_ms = ms;
        }
        if let Some(level) = &overrides.log_level {
            self.logging.level = level.clone();
        }
        self.validate()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.backend.base_url.trim().is_empty() {
            bail!("backend.base_url must not be empty");
        }
        if self.backend.state_endpoint.trim().is_empty() {
            bail!("backend.state_endpoint must not be empty");
        }
        if self.backend.poll_interval_ms == 0 {
            bail!("backend.poll_interval_ms must be greater than zero");
        }
        if self.backend.fetch_timeout_ms == 0 {
            bail!("backend.fetch_timeout_ms must be greater than zero");
        }
        if self.logging.level.trim().is_empty() {
            bail!("logging.level must not be empty");
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.backend.fetch_timeout_ms)
    }

    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval: Duration::from_millis(self.backend.poll_interval_ms),
        }
    }

    pub fn overlay_config(&self) -> VoteOverlayConfig {
        VoteOverlayConfig {
            cooldown: chrono::Duration::milliseconds(
                i64::try_from(self.seating.vote_result_cooldown_ms).unwrap_or(i64::MAX),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = ConsoleConfig::from_toml_str("").unwrap();
        assert_eq!(config, ConsoleConfig::default());
        assert_eq!(config.backend.poll_interval_ms, 300);
        assert_eq!(config.fetch_timeout(), Duration::from_millis(1500));
        assert_eq!(config.overlay_config().cooldown, chrono::Duration::seconds(6));
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config = ConsoleConfig::from_toml_str(
            r#"
            [backend]
            base_url = "http://recinto.local:9000"

            [logging]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.backend.base_url, "http://recinto.local:9000");
        assert_eq!(config.backend.state_endpoint, "/estados/estado_global");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.seating.cell_gap, 1);
    }

    #[test]
    fn test_unknown_log_format_is_rejected() {
        let err = ConsoleConfig::from_toml_str("[logging]\nformat = \"yaml\"\n").unwrap_err();
        assert!(format!("{err:#}").contains("yaml"));
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        assert!(ConsoleConfig::from_toml_str("[backend]\npoll_interval_ms = 0\n").is_err());
        assert!(ConsoleConfig::from_toml_str("[backend]\nfetch_timeout_ms = 0\n").is_err());
        assert!(ConsoleConfig::from_toml_str("[backend]\nstate_endpoint = \" \"\n").is_err());
    }

    #[test]
    fn test_overrides_win_and_are_validated() {
        let mut config = ConsoleConfig::default();
        config
            .apply_overrides(&Overrides {
                base_url: Some("http://10.0.0.2:8000".into()),
                poll_interval_ms: Some(1000),
                log_level: Some("debug".into()),
            })
            .unwrap();
        assert_eq!(config.backend.base_url, "http://10.0.0.2:8000");
        assert_eq!(config.poll_config().interval, Duration::from_secs(1));
        assert_eq!(config.logging.level, "debug");

        let zero = Overrides { poll_interval_ms: Some(0), ..Default::default() };
        assert!(config.apply_overrides(&zero).is_err());
    }
}
