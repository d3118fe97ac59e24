//! # Neynar
//!
//! Profile lookups for the usernames and avatars shown on frames and
//! denormalized into curation records.
//!
//! ## Endpoint
//! - `GET {base}/user/bulk?fids=<fid>`
//! - Headers: `accept: application/json`, `api_key: <key>`
//! - Body: `{ "users": [ { "username": .., "pfp_url": .., .. } ] }`
//!
//! ## Failure
//! - Transport errors, timeouts and non-2xx statuses fail the lookup
//! - An empty `users` list fails the lookup, index 0 is never assumed
//! - No retries and no caching, every call is one round trip
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header::ACCEPT};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ProfileLookupError {
    #[error("no fid to look up")]
    MissingFid,

    #[error("profile lookup timed out")]
    Timeout,

    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(StatusCode),

    #[error("no profile for fid {0}")]
    NotFound(u64),
}

impl From<reqwest::Error> for ProfileLookupError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProfileLookupError::Timeout
        } else {
            ProfileLookupError::Request(e)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Profile {
    pub username: String,
    #[serde(default)]
    pub pfp_url: String,
}

#[derive(Deserialize)]
struct BulkUsers {
    #[serde(default)]
    users: Vec<Profile>,
}

#[async_trait]
pub trait ProfileResolver: Send + Sync {
    async fn resolve(&self, fid: u64) -> Result<Profile, ProfileLookupError>;
}

pub struct NeynarClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl NeynarClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, ProfileLookupError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl ProfileResolver for NeynarClient {
    async fn resolve(&self, fid: u64) -> Result<Profile, ProfileLookupError> {
        let url = format!("{}/user/bulk", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("fids", fid)])
            .header(ACCEPT, "application/json")
            .header("api_key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Profile lookup for fid {fid} returned {status}");
            return Err(ProfileLookupError::Status(status));
        }

        let body: BulkUsers = response.json().await?;

        #[cfg(feature = "verbose")]
        info!("Profile lookup for fid {fid} returned {} users", body.users.len());

        body.users
            .into_iter()
            .next()
            .ok_or(ProfileLookupError::NotFound(fid))
    }
}

/// Pings the hub with the hub credential. Only used as a startup diagnostic.
pub async fn check_hub(hub_url: &str, hub_key: &str, timeout: Duration) -> Result<(), ProfileLookupError> {
    let http = Client::builder().timeout(timeout).build()?;
    let response = http
        .get(format!("{}/v1/info", hub_url.trim_end_matches('/')))
        .header(ACCEPT, "application/json")
        .header("api_key", hub_key)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ProfileLookupError::Status(status));
    }

    info!("Hub reachable at {hub_url}");
    Ok(())
}
