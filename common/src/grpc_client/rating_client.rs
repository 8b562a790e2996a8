use std::sync::Arc;
use tonic::{Code, Request};
use tracing::debug;

use crate::models::{Rating, RecordId, RecordType};
use crate::proto::rating::rating_service_client::RatingServiceClient;
use crate::proto::rating::{GetAggregatedRatingRequest, PutRatingRequest};
use crate::service_discovery::service_connection;
use crate::service_register_center::{ServiceName, ServiceRegister};
use crate::Error;

/// 评分服务客户端
///
/// 每次调用都通过注册中心随机挑选一个存活实例，不做重试
#[derive(Debug, Clone)]
pub struct RatingClient {
    registry: Arc<dyn ServiceRegister>,
    service_name: ServiceName,
}

impl RatingClient {
    pub fn new(registry: Arc<dyn ServiceRegister>, service_name: ServiceName) -> Self {
        Self {
            registry,
            service_name,
        }
    }

    async fn client(&self) -> Result<RatingServiceClient<tonic::transport::Channel>, Error> {
        let channel = service_connection(self.registry.as_ref(), &self.service_name).await?;
        Ok(RatingServiceClient::new(channel))
    }

    /// 获取记录的聚合评分，没有评分时返回 `NotFound`
    pub async fn get_aggregated_rating(
        &self,
        record_id: &RecordId,
        record_type: &RecordType,
    ) -> Result<f64, Error> {
        let mut client = self.client().await?;
        let response = client
            .get_aggregated_rating(Request::new(GetAggregatedRatingRequest {
                record_id: record_id.to_string(),
                record_type: record_type.to_string(),
            }))
            .await
            .map_err(|status| map_status(status, record_id, record_type))?;

        let value = response.into_inner().rating_value;
        debug!(%record_id, %record_type, value, "获取聚合评分成功");
        Ok(value)
    }

    /// 写入一条评分
    pub async fn put_rating(
        &self,
        record_id: &RecordId,
        record_type: &RecordType,
        rating: &Rating,
    ) -> Result<(), Error> {
        let mut client = self.client().await?;
        client
            .put_rating(Request::new(PutRatingRequest {
                user_id: rating.user_id.to_string(),
                record_id: record_id.to_string(),
                record_type: record_type.to_string(),
                rating_value: rating.value,
            }))
            .await
            .map_err(|status| map_status(status, record_id, record_type))?;
        Ok(())
    }
}

fn map_status(status: tonic::Status, record_id: &RecordId, record_type: &RecordType) -> Error {
    match status.code() {
        Code::NotFound => Error::NotFound(format!("{}/{}", record_type, record_id)),
        _ => Error::TonicStatus(status),
    }
}
