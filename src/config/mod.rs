use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::ClientError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub notify: NotifyConfig,
    pub flags: FlagConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub path_prefix: String,
    pub timeout_secs: u64,
    pub default_page_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    pub ttl_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagConfig {
    /// YAML file with deploy-time feature flag defaults
    pub defaults_path: Option<PathBuf>,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("COACH_API_URL") {
            self.api.base_url = v.trim().to_string();
        }
        if let Ok(v) = env::var("COACH_API_PREFIX") {
            self.api.path_prefix = v.trim().to_string();
        }
        if let Ok(v) = env::var("COACH_API_TIMEOUT_SECS") {
            self.api.timeout_secs = v.parse().unwrap_or(self.api.timeout_secs);
        }
        if let Ok(v) = env::var("COACH_PAGE_SIZE") {
            self.api.default_page_size = v.parse().unwrap_or(self.api.default_page_size);
        }
        if let Ok(v) = env::var("COACH_NOTIFY_TTL_MS") {
            self.notify.ttl_ms = v.parse().unwrap_or(self.notify.ttl_ms);
        }
        if let Ok(v) = env::var("COACH_FLAG_DEFAULTS") {
            self.flags.defaults_path = Some(PathBuf::from(v));
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: "http://localhost:8000".to_string(),
                path_prefix: "/api/v1".to_string(),
                timeout_secs: 30,
                default_page_size: 50,
            },
            notify: NotifyConfig { ttl_ms: 5_000 },
            flags: FlagConfig { defaults_path: None },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                base_url: "https://staging-api.example.com".to_string(),
                path_prefix: "/api/v1".to_string(),
                timeout_secs: 15,
                default_page_size: 50,
            },
            notify: NotifyConfig { ttl_ms: 4_000 },
            flags: FlagConfig { defaults_path: None },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                base_url: "https://api.example.com".to_string(),
                path_prefix: "/api/v1".to_string(),
                timeout_secs: 10,
                default_page_size: 25,
            },
            notify: NotifyConfig { ttl_ms: 4_000 },
            flags: FlagConfig { defaults_path: None },
        }
    }

    /// Point the config at another server (tests, `--api-url`)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> Result<Url, ClientError> {
        let mut url = Url::parse(&self.api.base_url)
            .map_err(|e| ClientError::Config(format!("invalid API base URL '{}': {}", self.api.base_url, e)))?;
        if url.cannot_be_a_base() {
            return Err(ClientError::Config(format!("API base URL '{}' cannot be a base", self.api.base_url)));
        }

        // Url::join drops the last segment unless the path ends in '/'
        let prefix = self.api.path_prefix.trim_matches('/');
        let mut path = url.path().trim_end_matches('/').to_string();
        if !prefix.is_empty() {
            path.push('/');
            path.push_str(prefix);
        }
        path.push('/');
        url.set_path(&path);
        Ok(url)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notify.ttl_ms)
    }

    pub fn load_flag_defaults(&self) -> Result<FlagDefaults, ClientError> {
        match &self.flags.defaults_path {
            Some(path) => FlagDefaults::load(path),
            None => Ok(FlagDefaults::default()),
        }
    }
}

/// Deploy-time defaults for feature flags the server has not defined
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlagDefaults {
    #[serde(default)]
    pub flags: BTreeMap<String, bool>,
}

impl FlagDefaults {
    pub fn load(path: &Path) -> Result<Self, ClientError> {
        if !path.exists() {
            tracing::warn!("Flag defaults file {} not found, using none", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ClientError> {
        serde_yaml::from_str(content)
            .map_err(|e| ClientError::Config(format!("invalid flag defaults: {}", e)))
    }

    pub fn get(&self, key: &str) -> Option<bool> {
        self.flags.get(key).copied()
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<ClientConfig> = Lazy::new(ClientConfig::from_env);

pub fn config() -> &'static ClientConfig {
    &CONFIG
}
