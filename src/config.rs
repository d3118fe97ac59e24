use std::{env, fmt::Display, fs::read_to_string, str::FromStr, time::Duration};

use thiserror::Error;
use tracing::{info, warn};

pub const FALLBACK_NEYNAR_API: &str = "NEYNAR_FROG_FM";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("Invalid {key} value: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Redis,
    Memory,
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(StoreKind::Redis),
            "memory" => Ok(StoreKind::Memory),
            other => Err(format!("unknown store `{other}`, expected `redis` or `memory`")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub public_url: String,
    pub redis_url: String,
    pub store: StoreKind,
    pub hub_key: String,
    pub hub_url: String,
    pub neynar_key: String,
    pub neynar_url: String,
    pub profile_timeout: Duration,
    pub store_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| var(key).ok(), read_secret)
    }

    /// Builds the config from arbitrary sources so startup rules can be
    /// checked without touching the process environment.
    pub fn from_lookup<V, S>(var: V, secret: S) -> Result<Self, ConfigError>
    where
        V: Fn(&str) -> Option<String>,
        S: Fn(&str) -> Option<String>,
    {
        let port: u16 = try_load(&var, "RUST_PORT", "3000")?;
        let default_public_url = format!("http://localhost:{port}");

        let hub_key = var("NEYNAR_HUB")
            .or_else(|| secret("NEYNAR_HUB"))
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::Missing("NEYNAR_HUB"))?;

        let neynar_key = var("NEYNAR_API")
            .or_else(|| secret("NEYNAR_API"))
            .filter(|key| !key.trim().is_empty())
            .unwrap_or_else(|| {
                warn!(
                    "NEYNAR_API not set, falling back to the shared {FALLBACK_NEYNAR_API} key; \
                     do not rely on this in production"
                );
                FALLBACK_NEYNAR_API.to_string()
            });

        let profile_timeout_ms: u64 = try_load(&var, "PROFILE_TIMEOUT_MS", "5000")?;
        let store_timeout_ms: u64 = try_load(&var, "STORE_TIMEOUT_MS", "2000")?;

        Ok(Self {
            port,
            public_url: try_load::<String, _>(&var, "PUBLIC_URL", &default_public_url)?
                .trim_end_matches('/')
                .to_string(),
            redis_url: try_load(&var, "REDIS_URL", "redis://127.0.0.1:6379")?,
            store: try_load(&var, "CURATION_STORE", "redis")?,
            hub_key,
            hub_url: try_load::<String, _>(&var, "NEYNAR_HUB_URL", "https://hub-api.neynar.com")?
                .trim_end_matches('/')
                .to_string(),
            neynar_key,
            neynar_url: try_load::<String, _>(
                &var,
                "NEYNAR_API_URL",
                "https://api.neynar.com/v2/farcaster",
            )?
            .trim_end_matches('/')
            .to_string(),
            profile_timeout: Duration::from_millis(profile_timeout_ms),
            store_timeout: Duration::from_millis(store_timeout_ms),
        })
    }

    pub fn uses_fallback_key(&self) -> bool {
        self.neynar_key == FALLBACK_NEYNAR_API
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        info!("Environment variable {key} not found");
    })
}

fn try_load<T, V>(var: &V, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    V: Fn(&str) -> Option<String>,
{
    var(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");

            ConfigError::Invalid {
                key,
                reason: e.to_string(),
            }
        })
}

fn read_secret(secret_name: &str) -> Option<String> {
    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .map_err(|e| {
            warn!("Failed to read {secret_name} from file: {e}");
        })
        .ok()
}
