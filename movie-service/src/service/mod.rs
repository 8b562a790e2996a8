pub mod movie_service;

use std::future::Future;
use std::sync::Arc;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tonic_reflection::server::Builder as ReflectionBuilder;
use tracing::info;

use common::grpc::LoggingInterceptor;
use common::proto::movie::movie_service_server::MovieServiceServer;
use common::proto::FILE_DESCRIPTOR_SET;
use common::Error;

use crate::controller::MovieController;
pub use movie_service::MovieServiceImpl;

/// 在给定监听器上运行电影gRPC服务
pub async fn serve(
    controller: Arc<MovieController>,
    listener: TcpListenerStream,
    shutdown: impl Future<Output = ()> + Send,
) -> Result<(), Error> {
    let reflection_service = ReflectionBuilder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .build()
        .map_err(|e| Error::Internal(format!("反射服务创建失败: {}", e)))?;

    let movie_service = MovieServiceServer::with_interceptor(
        MovieServiceImpl::new(controller),
        LoggingInterceptor::new(),
    );

    Server::builder()
        .add_service(movie_service)
        .add_service(reflection_service)
        .serve_with_incoming_shutdown(listener, shutdown)
        .await?;

    info!("电影gRPC服务已关闭");
    Ok(())
}
