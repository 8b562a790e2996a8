use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

use common::config::AppConfig;
use common::configs::RepositoryKind;
use common::models::Metadata;
use common::Error;

mod memory;
mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PostgresRepository;

/// 元数据仓库，进程内缓存也实现同一接口
#[async_trait]
pub trait MetadataRepository: Send + Sync + Debug {
    /// 按电影ID读取元数据，不存在时返回 `MetadataNotFound`
    async fn get(&self, id: &str) -> Result<Metadata, Error>;

    /// 写入元数据，同一ID重复写入时覆盖
    async fn put(&self, id: &str, metadata: &Metadata) -> Result<(), Error>;
}

/// 根据配置创建元数据仓库
pub async fn metadata_repository(config: &AppConfig) -> Result<Arc<dyn MetadataRepository>, Error> {
    match config.storage.repository {
        RepositoryKind::Memory => Ok(Arc::new(MemoryRepository::new())),
        RepositoryKind::Postgres => Ok(Arc::new(PostgresRepository::from_config(config).await?)),
    }
}
