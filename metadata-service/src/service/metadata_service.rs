use std::sync::Arc;
use tonic::{Request, Response, Status};

use common::grpc::{require_field, to_status};
use common::models::Metadata;
use common::proto::metadata::metadata_service_server::MetadataService;
use common::proto::metadata::{
    GetMetadataRequest, GetMetadataResponse, PutMetadataRequest, PutMetadataResponse,
};
use common::Error;

use crate::controller::MetadataController;

/// 元数据gRPC服务实现
#[derive(Debug, Clone)]
pub struct MetadataServiceImpl {
    controller: Arc<MetadataController>,
}

impl MetadataServiceImpl {
    pub fn new(controller: Arc<MetadataController>) -> Self {
        Self { controller }
    }
}

#[tonic::async_trait]
impl MetadataService for MetadataServiceImpl {
    async fn get_metadata(
        &self,
        request: Request<GetMetadataRequest>,
    ) -> Result<Response<GetMetadataResponse>, Status> {
        let req = request.into_inner();
        require_field("movie_id", &req.movie_id).map_err(to_status)?;

        let metadata = self.controller.get(&req.movie_id).await.map_err(to_status)?;
        Ok(Response::new(GetMetadataResponse {
            metadata: Some(metadata.into()),
        }))
    }

    async fn put_metadata(
        &self,
        request: Request<PutMetadataRequest>,
    ) -> Result<Response<PutMetadataResponse>, Status> {
        let metadata: Metadata = request
            .into_inner()
            .metadata
            .ok_or_else(|| to_status(Error::BadRequest("metadata 不能为空".to_string())))?
            .into();
        require_field("metadata.id", &metadata.id).map_err(to_status)?;

        self.controller.put(&metadata).await.map_err(to_status)?;
        Ok(Response::new(PutMetadataResponse {}))
    }
}
