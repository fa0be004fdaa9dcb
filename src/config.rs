//! Environment configuration
//!
//! Values come from the process environment, which `main` first fills from an
//! optional `.env` file.

use crate::herd::{HerdEngine, HerdError, DEFAULT_THRESHOLD};
use crate::store::{FirebaseStore, MemoryStore, RoomStore, StoreError, DEFAULT_ROOT};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error(transparent)]
    Threshold(#[from] HerdError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Which room store backend to use
#[derive(Debug, Clone, PartialEq)]
pub enum StoreConfig {
    Memory,
    Firebase {
        database_url: String,
        auth_token: Option<String>,
        timeout: Duration,
    },
}

impl StoreConfig {
    pub fn build(&self) -> Result<Arc<dyn RoomStore>, StoreError> {
        match self {
            StoreConfig::Memory => Ok(Arc::new(MemoryStore::new())),
            StoreConfig::Firebase {
                database_url,
                auth_token,
                timeout,
            } => Ok(Arc::new(FirebaseStore::new(
                database_url.clone(),
                auth_token.clone(),
                *timeout,
            )?)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Minimum similarity for answers to join the same group
    pub threshold: f64,
    pub questions_dir: PathBuf,
    /// Store prefix all rooms live under
    pub room_root: String,
    /// How often clients poll and the room watcher refreshes
    pub poll_interval: Duration,
    pub store: StoreConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8501)),
            threshold: DEFAULT_THRESHOLD,
            questions_dir: PathBuf::from("."),
            room_root: DEFAULT_ROOT.to_string(),
            poll_interval: Duration::from_millis(3000),
            store: StoreConfig::Memory,
        }
    }
}

fn env_trimmed(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn env_parsed<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env_trimmed(name) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        None => Ok(None),
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let threshold = env_parsed("HERD_THRESHOLD")?.unwrap_or(defaults.threshold);
        // Reject out-of-range thresholds at startup rather than at the first reveal
        HerdEngine::new(threshold)?;

        let store = match env_trimmed("FIREBASE_DB_URL") {
            Some(database_url) => StoreConfig::Firebase {
                database_url,
                auth_token: env_trimmed("FIREBASE_AUTH_TOKEN"),
                timeout: env_parsed("STORE_TIMEOUT")?
                    .map(Duration::from_secs)
                    .unwrap_or(Duration::from_secs(10)),
            },
            None => StoreConfig::Memory,
        };

        let poll_interval = match env_parsed::<u64>("POLL_INTERVAL_MS")? {
            Some(0) => {
                return Err(ConfigError::InvalidValue {
                    name: "POLL_INTERVAL_MS",
                    value: "0".to_string(),
                })
            }
            Some(ms) => Duration::from_millis(ms),
            None => defaults.poll_interval,
        };

        Ok(Self {
            bind_addr: env_parsed("SHEEPISH_ADDR")?.unwrap_or(defaults.bind_addr),
            threshold,
            questions_dir: env_trimmed("QUESTIONS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.questions_dir),
            room_root: env_trimmed("ROOM_ROOT").unwrap_or(defaults.room_root),
            poll_interval,
            store,
        })
    }

    pub fn engine(&self) -> Result<HerdEngine, HerdError> {
        HerdEngine::new(self.threshold)
    }
}
