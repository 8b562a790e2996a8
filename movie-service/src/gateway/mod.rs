//! 下游服务网关
//!
//! 控制器只依赖这里的接口，生产环境由 `common::grpc_client` 中的客户端实现，
//! 每次调用都经由服务注册中心选择实例

use async_trait::async_trait;
use std::fmt::Debug;

use common::grpc_client::{MetadataClient, RatingClient};
use common::models::{Metadata, RecordId, RecordType};
use common::Error;

#[async_trait]
pub trait MetadataGateway: Send + Sync + Debug {
    /// 获取电影元数据，不存在时返回 `MetadataNotFound`
    async fn get(&self, movie_id: &str) -> Result<Metadata, Error>;
}

#[async_trait]
pub trait RatingGateway: Send + Sync + Debug {
    /// 获取聚合评分，没有评分时返回 `NotFound`
    async fn get_aggregated_rating(
        &self,
        record_id: &RecordId,
        record_type: &RecordType,
    ) -> Result<f64, Error>;
}

#[async_trait]
impl MetadataGateway for MetadataClient {
    async fn get(&self, movie_id: &str) -> Result<Metadata, Error> {
        MetadataClient::get(self, movie_id).await
    }
}

#[async_trait]
impl RatingGateway for RatingClient {
    async fn get_aggregated_rating(
        &self,
        record_id: &RecordId,
        record_type: &RecordType,
    ) -> Result<f64, Error> {
        RatingClient::get_aggregated_rating(self, record_id, record_type).await
    }
}
