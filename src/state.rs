use std::sync::Arc;

use anyhow::Error;
use tracing::{info, warn};

use super::{
    config::{Config, StoreKind},
    database::{CurationStore, MemoryStore, RedisStore, init_redis},
    profile::{NeynarClient, ProfileResolver, check_hub},
};

pub const CURATE_FRAME_PATH: &str = "/api/curate-frame";
pub const INSTALL_FRAME_PATH: &str = "/api/install-curate";
pub const TEST_FRAME_PATH: &str = "/api/curate-test";
pub const CURATE_ACTION_PATH: &str = "/api/add-curate-action";

pub struct AppState {
    pub config: Config,
    pub resolver: Arc<dyn ProfileResolver>,
    pub store: Arc<dyn CurationStore>,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Arc<Self>, Error> {
        if config.uses_fallback_key() {
            warn!("Profile lookups are using the shared fallback API key");
        }

        let resolver = Arc::new(NeynarClient::new(
            &config.neynar_url,
            &config.neynar_key,
            config.profile_timeout,
        )?);

        let store: Arc<dyn CurationStore> = match config.store {
            StoreKind::Redis => {
                info!("Connecting to Redis...");
                let connection = init_redis(&config.redis_url, config.store_timeout).await?;

                Arc::new(RedisStore::new(connection, config.store_timeout))
            }
            StoreKind::Memory => {
                warn!("Using the in-memory curation store, curations are lost on restart");

                Arc::new(MemoryStore::new())
            }
        };

        if let Err(e) = check_hub(&config.hub_url, &config.hub_key, config.profile_timeout).await {
            warn!("Hub check against {} failed: {e}", config.hub_url);
        }

        Ok(Self::with_parts(config, resolver, store))
    }

    pub fn with_parts(
        config: Config,
        resolver: Arc<dyn ProfileResolver>,
        store: Arc<dyn CurationStore>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            resolver,
            store,
        })
    }

    /// Absolute URL for a route, as handed to frame hosts.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.public_url)
    }
}
