//! # Redis
//!
//! Key-value store for curations.
//!
//! Core purpose is to hand out curation ids with an atomic increment and to
//! persist each curation as a flat hash.
//!
//! ## Requirements
//!
//! - Ids strictly increase and are never reused, even under concurrent submissions
//! - Write-only from this service, nothing here reads curations back
//!
//! ## Implementation
//!
//! - Counter: `INCR curation_id`, Redis serializes increments so every caller
//!   gets a distinct value
//! - Record: `HSET curation:<id>` with one field per record attribute
//! - The two calls are not transactional. A failure between them leaves an id
//!   with no record, which is accepted as a gap
//! - Every call is bounded by the store timeout
use std::{
    collections::HashMap,
    sync::{
        Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use redis::{
    Client, Cmd, RedisError, RedisResult, cmd,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use thiserror::Error;
use tokio::time::timeout;

pub const CURATION_COUNTER: &str = "curation_id";
pub const CURATION_PREFIX: &str = "curation";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("redis: {0}")]
    Redis(#[from] RedisError),

    #[error("store call timed out")]
    Timeout,
}

pub fn curation_key(id: u64) -> String {
    format!("{CURATION_PREFIX}:{id}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurationRecord {
    pub id: u64,
    pub text: String,
    pub cast_id: String,
    pub cast_fid: u64,
    pub curator_fid: u64,
    pub curator_username: String,
    pub caster_username: String,
    pub caster_pfp_url: String,
    pub created_at: String,
}

impl CurationRecord {
    /// Flat field map written to the record hash.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("id", self.id.to_string()),
            ("text", self.text.clone()),
            ("castId", self.cast_id.clone()),
            ("castFid", self.cast_fid.to_string()),
            ("curatorFid", self.curator_fid.to_string()),
            ("curatorUsername", self.curator_username.clone()),
            ("casterUsername", self.caster_username.clone()),
            ("casterPfpUrl", self.caster_pfp_url.clone()),
            ("createdAt", self.created_at.clone()),
        ]
    }
}

#[async_trait]
pub trait CurationStore: Send + Sync {
    async fn next_id(&self) -> Result<u64, StoreError>;

    async fn put(&self, id: u64, record: &CurationRecord) -> Result<(), StoreError>;
}

pub async fn init_redis(redis_url: &str, connection_timeout: Duration) -> Result<ConnectionManager, StoreError> {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(connection_timeout);

    let client = Client::open(redis_url)?;
    let connection_manager = client.get_connection_manager_with_config(config).await?;

    Ok(connection_manager)
}

pub fn next_id_command() -> Cmd {
    let mut command = cmd("INCR");
    command.arg(CURATION_COUNTER);
    command
}

pub fn put_command(id: u64, record: &CurationRecord) -> Cmd {
    let mut command = cmd("HSET");
    command.arg(curation_key(id));
    for (field, value) in record.fields() {
        command.arg(field).arg(value);
    }
    command
}

async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = RedisResult<T>>,
{
    Ok(timeout(limit, call).await.map_err(|_| StoreError::Timeout)??)
}

pub struct RedisStore {
    connection: ConnectionManager,
    timeout: Duration,
}

impl RedisStore {
    pub fn new(connection: ConnectionManager, timeout: Duration) -> Self {
        Self { connection, timeout }
    }
}

#[async_trait]
impl CurationStore for RedisStore {
    async fn next_id(&self) -> Result<u64, StoreError> {
        let mut connection = self.connection.clone();
        let command = next_id_command();

        bounded(self.timeout, command.query_async::<u64>(&mut connection)).await
    }

    async fn put(&self, id: u64, record: &CurationRecord) -> Result<(), StoreError> {
        let mut connection = self.connection.clone();
        let command = put_command(id, record);

        bounded(self.timeout, command.query_async::<()>(&mut connection)).await
    }
}

/// In-process store with the same contract as Redis. Backs local development
/// and tests.
#[derive(Default)]
pub struct MemoryStore {
    counter: AtomicU64,
    records: Mutex<HashMap<String, HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic elsewhere never leaves a half-written record, so a poisoned map is still valid.
    fn records(&self) -> MutexGuard<'_, HashMap<String, HashMap<String, String>>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record(&self, id: u64) -> Option<HashMap<String, String>> {
        self.records().get(&curation_key(id)).cloned()
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CurationStore for MemoryStore {
    async fn next_id(&self) -> Result<u64, StoreError> {
        Ok(self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn put(&self, id: u64, record: &CurationRecord) -> Result<(), StoreError> {
        let fields = record
            .fields()
            .into_iter()
            .map(|(field, value)| (field.to_string(), value))
            .collect();

        self.records().insert(curation_key(id), fields);

        Ok(())
    }
}
