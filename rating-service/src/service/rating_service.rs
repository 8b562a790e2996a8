use std::sync::Arc;
use tonic::{Request, Response, Status};

use common::models::{Rating, RecordId, RecordType, UserId};
use common::proto::rating::rating_service_server::RatingService;
use common::proto::rating::{
    GetAggregatedRatingRequest, GetAggregatedRatingResponse, PutRatingRequest, PutRatingResponse,
};
use common::grpc::{require_field, to_status};

use crate::controller::RatingController;

/// 评分gRPC服务实现
#[derive(Debug, Clone)]
pub struct RatingServiceImpl {
    controller: Arc<RatingController>,
}

impl RatingServiceImpl {
    pub fn new(controller: Arc<RatingController>) -> Self {
        Self { controller }
    }
}

#[tonic::async_trait]
impl RatingService for RatingServiceImpl {
    async fn get_aggregated_rating(
        &self,
        request: Request<GetAggregatedRatingRequest>,
    ) -> Result<Response<GetAggregatedRatingResponse>, Status> {
        let req = request.into_inner();
        require_field("record_id", &req.record_id).map_err(to_status)?;
        require_field("record_type", &req.record_type).map_err(to_status)?;

        let rating_value = self
            .controller
            .get_aggregated_rating(&RecordId::new(req.record_id), &RecordType::new(req.record_type))
            .await
            .map_err(to_status)?;

        Ok(Response::new(GetAggregatedRatingResponse { rating_value }))
    }

    async fn put_rating(
        &self,
        request: Request<PutRatingRequest>,
    ) -> Result<Response<PutRatingResponse>, Status> {
        let req = request.into_inner();
        require_field("user_id", &req.user_id).map_err(to_status)?;
        require_field("record_id", &req.record_id).map_err(to_status)?;
        require_field("record_type", &req.record_type).map_err(to_status)?;

        let rating = Rating::new(UserId::new(req.user_id), req.rating_value);
        self.controller
            .put_rating(&RecordId::new(req.record_id), &RecordType::new(req.record_type), &rating)
            .await
            .map_err(to_status)?;

        Ok(Response::new(PutRatingResponse {}))
    }
}
