use std::sync::Arc;
use tonic::{Code, Request};
use tracing::debug;

use crate::models::Metadata;
use crate::proto::metadata::metadata_service_client::MetadataServiceClient;
use crate::proto::metadata::{GetMetadataRequest, PutMetadataRequest};
use crate::service_discovery::service_connection;
use crate::service_register_center::{ServiceName, ServiceRegister};
use crate::Error;

/// 元数据服务客户端，每次调用重新选择实例
#[derive(Debug, Clone)]
pub struct MetadataClient {
    registry: Arc<dyn ServiceRegister>,
    service_name: ServiceName,
}

impl MetadataClient {
    pub fn new(registry: Arc<dyn ServiceRegister>, service_name: ServiceName) -> Self {
        Self {
            registry,
            service_name,
        }
    }

    async fn client(&self) -> Result<MetadataServiceClient<tonic::transport::Channel>, Error> {
        let channel = service_connection(self.registry.as_ref(), &self.service_name).await?;
        Ok(MetadataServiceClient::new(channel))
    }

    /// 获取电影元数据，不存在时返回 `MetadataNotFound`
    pub async fn get(&self, movie_id: &str) -> Result<Metadata, Error> {
        let mut client = self.client().await?;
        let response = client
            .get_metadata(Request::new(GetMetadataRequest {
                movie_id: movie_id.to_string(),
            }))
            .await
            .map_err(|status| match status.code() {
                Code::NotFound => Error::MetadataNotFound(movie_id.to_string()),
                _ => Error::TonicStatus(status),
            })?;

        let metadata = response
            .into_inner()
            .metadata
            .ok_or_else(|| Error::Internal(format!("元数据服务返回空结果: {}", movie_id)))?;
        debug!(movie_id, "获取元数据成功");
        Ok(metadata.into())
    }

    pub async fn put(&self, metadata: &Metadata) -> Result<(), Error> {
        let mut client = self.client().await?;
        client
            .put_metadata(Request::new(PutMetadataRequest {
                metadata: Some(metadata.clone().into()),
            }))
            .await?;
        Ok(())
    }
}
