use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use cache::AggregateCache;
use common::models::{mean_rating, Rating, RecordId, RecordType};
use common::Error;

use crate::ingester::RatingIngester;
use crate::repository::RatingRepository;

/// 评分业务逻辑
///
/// 仓库是权威数据源，缓存只保存聚合结果，缓存读写失败都不影响请求结果
#[derive(Debug, Clone)]
pub struct RatingController {
    repo: Arc<dyn RatingRepository>,
    cache: Arc<dyn AggregateCache>,
    ingester: Option<Arc<dyn RatingIngester>>,
}

impl RatingController {
    pub fn new(repo: Arc<dyn RatingRepository>, cache: Arc<dyn AggregateCache>) -> Self {
        Self {
            repo,
            cache,
            ingester: None,
        }
    }

    pub fn with_ingester(mut self, ingester: Arc<dyn RatingIngester>) -> Self {
        self.ingester = Some(ingester);
        self
    }

    pub fn has_ingester(&self) -> bool {
        self.ingester.is_some()
    }

    /// 获取聚合评分
    ///
    /// 先查缓存，未命中时从仓库计算平均值并回填缓存
    pub async fn get_aggregated_rating(
        &self,
        record_id: &RecordId,
        record_type: &RecordType,
    ) -> Result<f64, Error> {
        match self.cache.get(record_id, record_type).await {
            Ok(Some(value)) => {
                debug!(%record_id, %record_type, value, "聚合评分命中缓存");
                return Ok(value);
            }
            Ok(None) => {}
            Err(e) => warn!(%record_id, %record_type, "读取聚合评分缓存失败: {}", e),
        }

        let value = self.aggregate(record_id, record_type).await?;
        self.refresh_cache(record_id, record_type, value).await;
        Ok(value)
    }

    /// 写入评分并返回最新的聚合评分
    pub async fn put_rating(
        &self,
        record_id: &RecordId,
        record_type: &RecordType,
        rating: &Rating,
    ) -> Result<f64, Error> {
        self.repo
            .put(record_id, record_type, rating)
            .await
            .map_err(|e| Error::StoreWriteFailed(e.to_string()))?;

        let value = self.aggregate(record_id, record_type).await?;
        self.refresh_cache(record_id, record_type, value).await;
        debug!(%record_id, %record_type, user_id = %rating.user_id, value, "评分已写入");
        Ok(value)
    }

    /// 持续消费摄取器产生的评分事件，直到取消或通道关闭
    ///
    /// 写入失败会终止循环并返回错误
    pub async fn start_ingestion(&self, cancel: CancellationToken) -> Result<(), Error> {
        let ingester = self
            .ingester
            .as_ref()
            .ok_or_else(|| Error::Internal("未配置评分消息来源".to_string()))?;
        let mut events = ingester.ingest(cancel.clone()).await?;
        info!("开始消费评分事件");

        loop {
            let event = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("评分事件消费已取消");
                    return Ok(());
                }
                event = events.recv() => event,
            };

            let Some(event) = event else {
                info!("评分事件通道已关闭");
                return Ok(());
            };

            self.put_rating(&event.record_id, &event.record_type, &event.rating())
                .await
                .map_err(|e| {
                    error!(record_id = %event.record_id, "处理评分事件失败: {}", e);
                    e
                })?;
        }
    }

    /// 在后台任务中运行 `start_ingestion`
    pub fn spawn_ingestion(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<Result<(), Error>> {
        let controller = self.clone();
        tokio::spawn(async move { controller.start_ingestion(cancel).await })
    }

    async fn aggregate(&self, record_id: &RecordId, record_type: &RecordType) -> Result<f64, Error> {
        let ratings = self.repo.get(record_id, record_type).await?;
        mean_rating(&ratings).ok_or_else(|| Error::RatingsNotFound {
            record_id: record_id.to_string(),
            record_type: record_type.to_string(),
        })
    }

    async fn refresh_cache(&self, record_id: &RecordId, record_type: &RecordType, value: f64) {
        if let Err(e) = self.cache.put(record_id, record_type, value).await {
            warn!(%record_id, %record_type, "写入聚合评分缓存失败: {}", e);
        }
    }
}
