pub mod rating_service;

use std::future::Future;
use std::sync::Arc;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tonic_reflection::server::Builder as ReflectionBuilder;
use tracing::info;

use common::grpc::LoggingInterceptor;
use common::proto::rating::rating_service_server::RatingServiceServer;
use common::proto::FILE_DESCRIPTOR_SET;
use common::Error;

use crate::controller::RatingController;
pub use rating_service::RatingServiceImpl;

/// 在给定监听器上运行gRPC服务，`shutdown` 完成后优雅退出
pub async fn serve(
    controller: Arc<RatingController>,
    listener: TcpListenerStream,
    shutdown: impl Future<Output = ()> + Send,
) -> Result<(), Error> {
    // 创建反射服务
    let reflection_service = ReflectionBuilder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .build()
        .map_err(|e| Error::Internal(format!("反射服务创建失败: {}", e)))?;

    let rating_service = RatingServiceServer::with_interceptor(
        RatingServiceImpl::new(controller),
        LoggingInterceptor::new(),
    );

    Server::builder()
        .add_service(rating_service)
        .add_service(reflection_service)
        .serve_with_incoming_shutdown(listener, shutdown)
        .await?;

    info!("gRPC服务已关闭");
    Ok(())
}
