use anyhow::{Context, Result};
use pinboard::{AccessControl, EntityStore, MemoryHost, RedisHost};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file looked up in the working directory.
pub const CONFIG_FILE: &str = "pinboard.toml";

/// Configuration stored in pinboard.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PinboardConfig {
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub redis: RedisSettings,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Memory,
    Redis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default)]
    pub backend: BackendKind,
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// JSON fixture used by the memory backend.
    #[serde(default = "default_fixture")]
    pub fixture: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            prefix: default_prefix(),
            fixture: default_fixture(),
        }
    }
}

fn default_prefix() -> String {
    "pinboard".to_string()
}

fn default_fixture() -> String {
    "pinboard.json".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisSettings {
    #[serde(default = "default_redis_url")]
    pub url: String,
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
        }
    }
}

fn default_redis_url() -> String {
    "${REDIS_URL}".to_string()
}

impl PinboardConfig {
    /// Load `path`, or `./pinboard.toml` when present, or the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let local = PathBuf::from(CONFIG_FILE);
                if !local.exists() {
                    return Ok(Self::default());
                }
                local
            }
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Get the Redis URL, expanding environment variables
    pub fn redis_url(&self) -> Result<String> {
        let url = self.redis.url.as_str();
        if url.starts_with("${") && url.ends_with('}') {
            let var_name = &url[2..url.len() - 1];
            std::env::var(var_name).with_context(|| format!("Environment variable {var_name} not set"))
        } else {
            Ok(url.to_string())
        }
    }
}

/// Everything the commands need from a host.
pub trait Host: EntityStore + AccessControl {}

impl<T: EntityStore + AccessControl> Host for T {}

/// The configured host backend.
pub enum Backend {
    Memory { host: MemoryHost, fixture: PathBuf },
    Redis(RedisHost),
}

impl Backend {
    pub fn open(config: &PinboardConfig) -> Result<Self> {
        match config.store.backend {
            BackendKind::Memory => {
                let fixture = PathBuf::from(&config.store.fixture);
                let host = if fixture.exists() {
                    MemoryHost::load(&fixture)
                        .with_context(|| format!("Failed to load fixture {}", fixture.display()))?
                } else {
                    MemoryHost::new()
                };
                Ok(Self::Memory { host, fixture })
            }
            BackendKind::Redis => {
                let url = config.redis_url()?;
                let host = RedisHost::connect(&url, config.store.prefix.clone())
                    .context("Failed to connect to Redis")?;
                Ok(Self::Redis(host))
            }
        }
    }

    pub fn host(&self) -> &dyn Host {
        match self {
            Self::Memory { host, .. } => host,
            Self::Redis(host) => host,
        }
    }

    pub fn host_mut(&mut self) -> &mut dyn Host {
        match self {
            Self::Memory { host, .. } => host,
            Self::Redis(host) => host,
        }
    }

    /// Persist changes. Redis writes are already durable.
    pub fn flush(&self) -> Result<()> {
        if let Self::Memory { host, fixture } = self {
            host.save(fixture)
                .with_context(|| format!("Failed to write fixture {}", fixture.display()))?;
        }
        Ok(())
    }
}
