use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

use common::config::AppConfig;
use common::configs::RepositoryKind;
use common::models::{Rating, RecordId, RecordType};
use common::Error;

mod memory;
mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PostgresRepository;

/// 评分仓库，是评分数据的权威来源
#[async_trait]
pub trait RatingRepository: Send + Sync + Debug {
    /// 读取记录的全部评分，没有评分时返回 `RatingsNotFound`
    async fn get(&self, record_id: &RecordId, record_type: &RecordType) -> Result<Vec<Rating>, Error>;

    /// 追加一条评分
    async fn put(&self, record_id: &RecordId, record_type: &RecordType, rating: &Rating) -> Result<(), Error>;
}

pub(crate) fn ratings_not_found(record_id: &RecordId, record_type: &RecordType) -> Error {
    Error::RatingsNotFound {
        record_id: record_id.to_string(),
        record_type: record_type.to_string(),
    }
}

/// 根据配置创建评分仓库
pub async fn rating_repository(config: &AppConfig) -> Result<Arc<dyn RatingRepository>, Error> {
    match config.storage.repository {
        RepositoryKind::Memory => Ok(Arc::new(MemoryRepository::new())),
        RepositoryKind::Postgres => Ok(Arc::new(PostgresRepository::from_config(config).await?)),
    }
}
