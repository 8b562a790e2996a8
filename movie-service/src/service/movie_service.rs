use std::sync::Arc;
use tonic::{Request, Response, Status};

use common::grpc::{require_field, to_status};
use common::proto::movie::movie_service_server::MovieService;
use common::proto::movie::{GetMovieDetailsRequest, GetMovieDetailsResponse};

use crate::controller::MovieController;

/// 电影gRPC服务实现
#[derive(Debug, Clone)]
pub struct MovieServiceImpl {
    controller: Arc<MovieController>,
}

impl MovieServiceImpl {
    pub fn new(controller: Arc<MovieController>) -> Self {
        Self { controller }
    }
}

#[tonic::async_trait]
impl MovieService for MovieServiceImpl {
    async fn get_movie_details(
        &self,
        request: Request<GetMovieDetailsRequest>,
    ) -> Result<Response<GetMovieDetailsResponse>, Status> {
        let req = request.into_inner();
        require_field("movie_id", &req.movie_id).map_err(to_status)?;

        let details = self.controller.get(&req.movie_id).await.map_err(to_status)?;
        Ok(Response::new(GetMovieDetailsResponse {
            movie_details: Some(details.into()),
        }))
    }
}
