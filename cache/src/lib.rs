/**
 * 缓存模块
 *
 * 保存每条记录最近一次计算出的聚合评分。缓存不是权威数据，
 * 条目缺失或过期都不影响正确性，未命中时由调用方回源到评分仓库。
 */
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use common::config::AppConfig;
use common::configs::CacheKind;
use common::error::Error;
use common::models::{RecordId, RecordType};

mod memory;
mod redis;

pub use crate::memory::MemoryCache;
pub use crate::redis::RedisCache;

/// 聚合评分缓存特征
#[async_trait]
pub trait AggregateCache: Sync + Send + Debug {
    /// 查询聚合评分，未命中返回 `None`
    async fn get(&self, record_id: &RecordId, record_type: &RecordType) -> Result<Option<f64>, Error>;

    /// 写入（覆盖）聚合评分
    async fn put(&self, record_id: &RecordId, record_type: &RecordType, value: f64) -> Result<(), Error>;
}

/// 根据配置创建缓存实例
///
/// # 返回
/// * 实现了AggregateCache特征的实例，被Arc包裹以便共享
pub async fn cache(config: &AppConfig) -> Result<Arc<dyn AggregateCache>, Error> {
    match config.storage.cache {
        CacheKind::Memory => Ok(Arc::new(MemoryCache::new())),
        CacheKind::Redis => Ok(Arc::new(RedisCache::from_config(config).await?)),
    }
}
