use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context};
use serde::Deserialize;
use staybook_db::RestStoreConfig;

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "STAYBOOK_ENV";
const CONFIG_DIR_ENV: &str = "STAYBOOK_CONFIG_DIR";
const ENV_PREFIX: &str = "STAYBOOK";

/// Deployment environment the application is running in.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(Environment::Local),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(anyhow!(
                "unsupported environment '{}'; expected local/staging/production",
                other
            )),
        }
    }
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

impl Settings {
    /// Load configuration by layering `.env`, base file, and environment overlay.
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let environment = std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        let config_dir = std::env::var(CONFIG_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                // Default to repo root `config` directory.
                std::env::current_dir()
                    .map(|cwd| cwd.join("config"))
                    .unwrap_or_else(|_| PathBuf::from("config"))
            });

        Self::load_from(&config_dir, &environment)
    }

    /// Load `base.toml` and `{environment}.toml` from `config_dir`, then
    /// apply `STAYBOOK_*` environment overrides (`__` separates nesting, e.g.
    /// `STAYBOOK_STORE__API_KEY`).
    pub fn load_from(config_dir: &Path, environment: &str) -> anyhow::Result<Self> {
        let parsed_environment = environment.parse::<Environment>()?;

        let base_path = config_dir.join("base.toml");
        let environment_path = config_dir.join(format!("{}.toml", environment));

        let builder = config::Config::builder()
            .add_source(config::File::from(base_path).required(false))
            .add_source(config::File::from(environment_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            );

        let cfg = builder
            .build()
            .with_context(|| "failed to build configuration")?;

        let mut settings: Settings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        settings.environment = parsed_environment;

        Ok(settings)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "ServerSettings::default_host")]
    pub host: String,
    #[serde(default = "ServerSettings::default_port")]
    pub port: u16,
    #[serde(default = "ServerSettings::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ServerSettings {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        8080
    }

    fn default_request_timeout_ms() -> u64 {
        15000
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            request_timeout_ms: Self::default_request_timeout_ms(),
        }
    }
}

/// Remote record store connection.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "StoreSettings::default_url")]
    pub url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "StoreSettings::default_timeout_ms")]
    pub timeout_ms: u64,
}

impl StoreSettings {
    fn default_url() -> String {
        "http://127.0.0.1:54321".to_string()
    }

    fn default_timeout_ms() -> u64 {
        10000
    }

    /// Client configuration for the REST store described by these settings.
    pub fn rest_config(&self) -> RestStoreConfig {
        RestStoreConfig {
            base_url: self.url.clone(),
            api_key: self.api_key.clone(),
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            url: Self::default_url(),
            api_key: None,
            timeout_ms: Self::default_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySettings {
    #[serde(default)]
    pub log_format: LogFormat,
    /// Default `EnvFilter` directive; `RUST_LOG` takes precedence.
    #[serde(default = "TelemetrySettings::default_filter")]
    pub filter: String,
}

impl TelemetrySettings {
    fn default_filter() -> String {
        "info".to_string()
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            filter: Self::default_filter(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "staybook-settings-{}-{}",
            name,
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn default_environment_is_local() {
        let settings = Settings::default();
        assert_eq!(settings.environment, Environment::Local);
    }

    #[test]
    fn default_store_points_at_local_stack() {
        let settings = Settings::default();
        assert_eq!(settings.store.url, "http://127.0.0.1:54321");
        assert_eq!(
            settings.store.rest_config().timeout,
            Duration::from_secs(10)
        );
    }

    #[test]
    fn unknown_environment_is_rejected() {
        assert!("qa".parse::<Environment>().is_err());
        assert_eq!(
            "production".parse::<Environment>().unwrap(),
            Environment::Production
        );
    }

    #[test]
    fn missing_config_dir_falls_back_to_defaults() {
        let dir = std::env::temp_dir().join("staybook-settings-does-not-exist");
        let settings = Settings::load_from(&dir, "staging").unwrap();
        assert_eq!(settings.environment, Environment::Staging);
        assert_eq!(settings.server.port, 8080);
    }

    #[test]
    fn environment_file_overlays_base() {
        let dir = scratch_dir("overlay");
        std::fs::write(
            dir.join("base.toml"),
            "[server]\nport = 9000\n\n[store]\nurl = \"https://base.example\"\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("production.toml"),
            "[store]\nurl = \"https://prod.example\"\n\n[telemetry]\nlog_format = \"json\"\n",
        )
        .unwrap();

        let settings = Settings::load_from(&dir, "production").unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.store.url, "https://prod.example");
        assert_eq!(settings.telemetry.log_format, LogFormat::Json);

        std::fs::remove_dir_all(&dir).ok();
    }
}
