use std::sync::Arc;
use tracing::{debug, warn};

use common::models::Metadata;
use common::Error;

use crate::repository::MetadataRepository;

/// 元数据业务逻辑，读取时先查缓存再查仓库
#[derive(Debug, Clone)]
pub struct MetadataController {
    repo: Arc<dyn MetadataRepository>,
    cache: Arc<dyn MetadataRepository>,
}

impl MetadataController {
    pub fn new(repo: Arc<dyn MetadataRepository>, cache: Arc<dyn MetadataRepository>) -> Self {
        Self { repo, cache }
    }

    pub async fn get(&self, id: &str) -> Result<Metadata, Error> {
        match self.cache.get(id).await {
            Ok(metadata) => {
                debug!(id, "元数据命中缓存");
                return Ok(metadata);
            }
            Err(Error::MetadataNotFound(_)) => {}
            Err(e) => warn!(id, "读取元数据缓存失败: {}", e),
        }

        let metadata = self.repo.get(id).await?;
        if let Err(e) = self.cache.put(id, &metadata).await {
            warn!(id, "回填元数据缓存失败: {}", e);
        }
        Ok(metadata)
    }

    /// 写入仓库后更新缓存，缓存失败只记录日志
    pub async fn put(&self, metadata: &Metadata) -> Result<(), Error> {
        self.repo
            .put(&metadata.id, metadata)
            .await
            .map_err(|e| Error::StoreWriteFailed(e.to_string()))?;

        if let Err(e) = self.cache.put(&metadata.id, metadata).await {
            warn!(id = %metadata.id, "更新元数据缓存失败: {}", e);
        }
        debug!(id = %metadata.id, "元数据已写入");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::repository::MemoryRepository;

    /// 记录读取次数的仓库
    #[derive(Debug, Default)]
    struct CountingRepository {
        inner: MemoryRepository,
        reads: AtomicUsize,
    }

    #[async_trait]
    impl MetadataRepository for CountingRepository {
        async fn get(&self, id: &str) -> Result<Metadata, Error> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.get(id).await
        }

        async fn put(&self, id: &str, metadata: &Metadata) -> Result<(), Error> {
            self.inner.put(id, metadata).await
        }
    }

    /// 读写都失败的存储
    #[derive(Debug)]
    struct BrokenRepository;

    #[async_trait]
    impl MetadataRepository for BrokenRepository {
        async fn get(&self, _id: &str) -> Result<Metadata, Error> {
            Err(Error::Redis("connection refused".to_string()))
        }

        async fn put(&self, _id: &str, _metadata: &Metadata) -> Result<(), Error> {
            Err(Error::Redis("connection refused".to_string()))
        }
    }

    fn heat() -> Metadata {
        Metadata {
            id: "heat".to_string(),
            title: "Heat".to_string(),
            description: "LA crime".to_string(),
            director: "Michael Mann".to_string(),
        }
    }

    #[tokio::test]
    async fn get_backfills_cache_after_repository_hit() {
        let repo = Arc::new(CountingRepository::default());
        repo.inner.put("heat", &heat()).await.unwrap();
        let controller = MetadataController::new(repo.clone(), Arc::new(MemoryRepository::new()));

        assert_eq!(controller.get("heat").await.unwrap(), heat());
        assert_eq!(controller.get("heat").await.unwrap(), heat());
        assert_eq!(repo.reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_movie_is_not_found() {
        let controller =
            MetadataController::new(Arc::new(MemoryRepository::new()), Arc::new(MemoryRepository::new()));
        let err = controller.get("missing").await.unwrap_err();
        assert!(matches!(err, Error::MetadataNotFound(_)));
    }

    #[tokio::test]
    async fn broken_cache_does_not_fail_requests() {
        let controller = MetadataController::new(Arc::new(MemoryRepository::new()), Arc::new(BrokenRepository));
        controller.put(&heat()).await.unwrap();
        assert_eq!(controller.get("heat").await.unwrap(), heat());
    }

    #[tokio::test]
    async fn repository_write_failure_is_reported() {
        let controller = MetadataController::new(Arc::new(BrokenRepository), Arc::new(MemoryRepository::new()));
        let err = controller.put(&heat()).await.unwrap_err();
        assert!(matches!(err, Error::StoreWriteFailed(_)));
        // 写入失败时缓存也不应被更新
        assert!(controller.get("heat").await.is_err());
    }
}
