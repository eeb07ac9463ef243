use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::{config::CacheConfig, redis_client::RedisClient, services::backend::BackendClient};

pub mod buses;
pub mod schedules;

/// Кеш справочных данных бэкенда (автобусы, даты расписания).
/// Карты мест сюда никогда не попадают: они пересчитываются на каждый запрос.
#[derive(Clone)]
pub struct CacheService {
    redis: Option<RedisClient>,
    backend: BackendClient,
    ttl: CacheConfig,
}

impl CacheService {
    pub fn new(redis: Option<RedisClient>, backend: BackendClient, ttl: CacheConfig) -> Self {
        if redis.is_none() {
            warn!("Redis is not configured, cache disabled");
        }
        Self { redis, backend, ttl }
    }

    pub fn is_enabled(&self) -> bool {
        self.redis.is_some()
    }

    pub async fn ping(&self) -> redis::RedisResult<()> {
        match &self.redis {
            Some(redis) => redis.ping().await,
            None => Ok(()),
        }
    }

    // === Работа с кешем ===
    // Ошибки Redis не фатальны: при любой проблеме идём в бэкенд

    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let redis = self.redis.as_ref()?;
        let mut conn = redis.conn.clone();
        let data = match conn.get::<_, Option<String>>(key).await {
            Ok(data) => data,
            Err(e) => {
                warn!("Cache read failed for {}: {:?}", key, e);
                return None;
            }
        };
        let value = serde_json::from_str(&data?)
            .map_err(|e| warn!("Cache entry {} is corrupted: {:?}", key, e))
            .ok()?;
        debug!("Cache hit for {}", key);
        Some(value)
    }

    async fn write_json<T: Serialize>(&self, key: &str, value: &T, ttl_seconds: u64) {
        let Some(redis) = &self.redis else { return };
        let data = match serde_json::to_string(value) {
            Ok(data) => data,
            Err(e) => {
                warn!("Failed to serialize cache entry {}: {:?}", key, e);
                return;
            }
        };
        let mut conn = redis.conn.clone();
        if let Err(e) = conn.set_ex::<_, _, ()>(key, data, ttl_seconds).await {
            warn!("Cache write failed for {}: {:?}", key, e);
        }
    }
}
