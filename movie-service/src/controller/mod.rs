use std::sync::Arc;
use tracing::debug;

use common::models::{MovieDetails, RecordId, RecordType};
use common::Error;

use crate::gateway::{MetadataGateway, RatingGateway};

/// 电影在评分服务中的记录类型
pub const MOVIE_RECORD_TYPE: &str = "movie";

/// 电影详情业务逻辑，组合元数据和聚合评分
#[derive(Debug, Clone)]
pub struct MovieController {
    metadata: Arc<dyn MetadataGateway>,
    rating: Arc<dyn RatingGateway>,
}

impl MovieController {
    pub fn new(metadata: Arc<dyn MetadataGateway>, rating: Arc<dyn RatingGateway>) -> Self {
        Self { metadata, rating }
    }

    /// 获取电影详情
    ///
    /// 元数据缺失时返回 `MetadataNotFound`；电影还没有评分时 `rating` 为空，
    /// 其他评分服务错误直接返回
    pub async fn get(&self, movie_id: &str) -> Result<MovieDetails, Error> {
        let metadata = self.metadata.get(movie_id).await?;

        let rating = match self
            .rating
            .get_aggregated_rating(&RecordId::from(movie_id), &RecordType::from(MOVIE_RECORD_TYPE))
            .await
        {
            Ok(value) => Some(value),
            Err(Error::NotFound(_)) | Err(Error::RatingsNotFound { .. }) => {
                debug!(movie_id, "电影暂无评分");
                None
            }
            Err(e) => return Err(e),
        };

        Ok(MovieDetails { rating, metadata })
    }
}
