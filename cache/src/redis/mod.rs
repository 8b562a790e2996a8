/**
 * Redis缓存模块实现
 *
 * 聚合评分以字符串形式存放在 `rating_aggregate:<记录类型>:<记录ID>` 键下，
 * 可配置过期时间，连接由ConnectionManager负责断线重连。
 */
use crate::AggregateCache;
use ::redis::aio::ConnectionManager;
use ::redis::{AsyncCommands, Client};
use async_trait::async_trait;
use common::config::AppConfig;
use common::error::Error;
use common::models::{RecordId, RecordType};
use std::fmt::{self, Debug, Formatter};
use std::time::Duration;
use tracing::info;

/// 聚合评分键前缀
const AGGREGATE_KEY_PREFIX: &str = "rating_aggregate";

/// 默认连接超时（毫秒）
const DEFAULT_CONNECTION_TIMEOUT_MS: u64 = 3000;

/// Redis缓存实现
#[derive(Clone)]
pub struct RedisCache {
    /// Redis客户端
    client: Client,
    /// 自动重连的连接管理器
    connection: ConnectionManager,
    /// 聚合评分过期时间（秒）
    ttl: Option<u64>,
}

/// 为RedisCache实现Debug特征
impl Debug for RedisCache {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("client", &self.client)
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// 生成聚合评分的键
fn aggregate_key(record_id: &RecordId, record_type: &RecordType) -> String {
    format!("{}:{}:{}", AGGREGATE_KEY_PREFIX, record_type, record_id)
}

impl RedisCache {
    /// 通过Redis客户端创建新的RedisCache实例
    pub async fn new(client: Client, ttl: Option<u64>) -> Result<Self, Error> {
        let connection = ConnectionManager::new(client.clone()).await?;
        Ok(Self {
            client,
            connection,
            ttl,
        })
    }

    /// 从配置创建RedisCache实例
    pub async fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let client = Client::open(config.redis.url())?;
        let timeout = Duration::from_millis(
            config
                .redis
                .connection_timeout_ms
                .unwrap_or(DEFAULT_CONNECTION_TIMEOUT_MS),
        );

        let cache = tokio::time::timeout(timeout, Self::new(client, config.redis.aggregate_ttl))
            .await
            .map_err(|_| Error::Redis(format!("连接Redis超时: {}", config.redis.url())))??;

        info!("Redis缓存已连接: {}", config.redis.url());
        Ok(cache)
    }
}

#[async_trait]
impl AggregateCache for RedisCache {
    async fn get(&self, record_id: &RecordId, record_type: &RecordType) -> Result<Option<f64>, Error> {
        let mut conn = self.connection.clone();
        let value: Option<f64> = conn.get(aggregate_key(record_id, record_type)).await?;
        Ok(value)
    }

    async fn put(&self, record_id: &RecordId, record_type: &RecordType, value: f64) -> Result<(), Error> {
        let mut conn = self.connection.clone();
        let key = aggregate_key(record_id, record_type);
        match self.ttl {
            Some(ttl) => conn.set_ex::<_, _, ()>(key, value, ttl).await?,
            None => conn.set::<_, _, ()>(key, value).await?,
        }
        Ok(())
    }
}
