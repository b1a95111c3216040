use crate::error::AppError;
use config::{Config, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

const CONFIG_FILENAME: &str = "monikavpn_config.json";
const ENV_PREFIX: &str = "MONIKA";

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RecommendationSettings {
    pub api_base: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout_secs: 15,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub handshake_delay_ms: u64,
    pub tick_interval_ms: u64,
    pub telemetry_interval_ms: u64,
    pub telemetry_window: usize,
    pub log_level: String,
    pub recommendation: RecommendationSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            handshake_delay_ms: 2500,
            tick_interval_ms: 1000,
            telemetry_interval_ms: 1000,
            telemetry_window: 20,
            log_level: "info".to_string(),
            recommendation: RecommendationSettings::default(),
        }
    }
}

/// `MONIKA_` variables, with `__` between nested keys:
/// `MONIKA_HANDSHAKE_DELAY_MS`, `MONIKA_RECOMMENDATION__API_KEY`.
pub fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

impl AppConfig {
    /// Defaults, then the config file, then `MONIKA_*` variables. A bare
    /// `API_KEY` is used only when no layer sets the recommendation key.
    pub fn load(path: Option<PathBuf>) -> Result<Self, AppError> {
        let path = path.or_else(get_config_path);
        let mut config = Self::load_from(path.as_deref(), environment())?;
        if config.recommendation.api_key.is_none() {
            config.recommendation.api_key = std::env::var("API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty());
        }
        Ok(config)
    }

    pub fn load_from(path: Option<&Path>, env: Environment) -> Result<Self, AppError> {
        let defaults = AppConfig::default();
        let mut builder = Config::builder()
            .set_default("handshake_delay_ms", defaults.handshake_delay_ms)?
            .set_default("tick_interval_ms", defaults.tick_interval_ms)?
            .set_default("telemetry_interval_ms", defaults.telemetry_interval_ms)?
            .set_default("telemetry_window", defaults.telemetry_window as u64)?
            .set_default("log_level", defaults.log_level)?
            .set_default("recommendation.api_base", defaults.recommendation.api_base)?
            .set_default("recommendation.model", defaults.recommendation.model)?
            .set_default(
                "recommendation.timeout_secs",
                defaults.recommendation.timeout_secs,
            )?;

        if let Some(path) = path {
            if path.exists() {
                info!("Loading configuration from {}", path.display());
            } else {
                debug!("No config file at {}", path.display());
            }
            builder = builder.add_source(File::from(path).format(FileFormat::Json).required(false));
        }

        let mut config: AppConfig = builder.add_source(env).build()?.try_deserialize()?;
        config.recommendation.api_key = config
            .recommendation
            .api_key
            .take()
            .filter(|key| !key.trim().is_empty());
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let mut bad = Vec::new();
        if self.tick_interval_ms == 0 {
            bad.push("tick_interval_ms");
        }
        if self.telemetry_interval_ms == 0 {
            bad.push("telemetry_interval_ms");
        }
        if self.telemetry_window == 0 {
            bad.push("telemetry_window");
        }
        if self.recommendation.timeout_secs == 0 {
            bad.push("recommendation.timeout_secs");
        }
        if !bad.is_empty() {
            return Err(AppError::Config(format!(
                "must be greater than zero: {}",
                bad.join(", ")
            )));
        }
        Ok(())
    }

    pub fn handshake_delay(&self) -> Duration {
        Duration::from_millis(self.handshake_delay_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn telemetry_interval(&self) -> Duration {
        Duration::from_millis(self.telemetry_interval_ms)
    }
}

pub fn get_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "monikavpn", "MonikaVPN")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        environment().source(Some(map))
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::load_from(None, env(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.handshake_delay(), Duration::from_millis(2500));
        assert_eq!(config.recommendation.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_environment_overrides_nested_keys() {
        let config = AppConfig::load_from(
            None,
            env(&[
                ("MONIKA_HANDSHAKE_DELAY_MS", "10"),
                ("MONIKA_RECOMMENDATION__API_BASE", "http://127.0.0.1:9000/v1"),
                ("MONIKA_RECOMMENDATION__API_KEY", "secret"),
                ("UNRELATED_TIMEOUT", "0"),
            ]),
        )
        .unwrap();

        assert_eq!(config.handshake_delay_ms, 10);
        assert_eq!(config.recommendation.api_base, "http://127.0.0.1:9000/v1");
        assert_eq!(config.recommendation.api_key.as_deref(), Some("secret"));
        assert_eq!(config.recommendation.timeout_secs, 15);
    }

    #[test]
    fn test_blank_api_key_is_unset() {
        let config =
            AppConfig::load_from(None, env(&[("MONIKA_RECOMMENDATION__API_KEY", "  ")])).unwrap();
        assert_eq!(config.recommendation.api_key, None);
    }

    #[test]
    fn test_non_numeric_override_is_an_error() {
        let err = AppConfig::load_from(None, env(&[("MONIKA_HANDSHAKE_DELAY_MS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_validate_rejects_zero_window() {
        let err = AppConfig::load_from(
            None,
            env(&[
                ("MONIKA_TELEMETRY_WINDOW", "0"),
                ("MONIKA_TICK_INTERVAL_MS", "0"),
            ]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("telemetry_window"));
        assert!(err.to_string().contains("tick_interval_ms"));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("monikavpn-does-not-exist.json");
        let config = AppConfig::load_from(Some(&path), env(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
    }
}
