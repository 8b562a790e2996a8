use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tonic::{Code, Request};

use cache::MemoryCache;
use common::grpc_client::{MetadataClient, RatingClient};
use common::models::{Metadata, Rating, RecordId, RecordType};
use common::proto::movie::movie_service_client::MovieServiceClient;
use common::proto::movie::GetMovieDetailsRequest;
use common::service_discovery::service_connection;
use common::service_register_center::{InstanceId, MemoryRegistry, ServiceName, ServiceRegister};
use common::Error;

use metadata_service::controller::MetadataController;
use movie_service::controller::MovieController;
use rating_service::controller::RatingController;

/// 在随机端口上启动服务并注册到内存注册中心
async fn start<F, Fut>(
    registry: &Arc<MemoryRegistry>,
    name: &str,
    cancel: CancellationToken,
    serve: F,
) -> JoinHandle<Result<(), Error>>
where
    F: FnOnce(TcpListenerStream, CancellationToken) -> Fut,
    Fut: Future<Output = Result<(), Error>> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    registry
        .register(&InstanceId::new(format!("{}-1", name)), &ServiceName::from(name), &addr)
        .await
        .unwrap();
    tokio::spawn(serve(TcpListenerStream::new(listener), cancel))
}

struct Cluster {
    registry: Arc<MemoryRegistry>,
    cancel: CancellationToken,
    servers: Vec<JoinHandle<Result<(), Error>>>,
}

impl Cluster {
    async fn start() -> Self {
        let registry = Arc::new(MemoryRegistry::new());
        let cancel = CancellationToken::new();
        let mut servers = Vec::new();

        let metadata = Arc::new(MetadataController::new(
            Arc::new(metadata_service::repository::MemoryRepository::new()),
            Arc::new(metadata_service::repository::MemoryRepository::new()),
        ));
        servers.push(
            start(&registry, "metadata", cancel.clone(), |listener, cancel| {
                metadata_service::service::serve(metadata, listener, async move {
                    cancel.cancelled().await
                })
            })
            .await,
        );

        let rating = Arc::new(RatingController::new(
            Arc::new(rating_service::repository::MemoryRepository::new()),
            Arc::new(MemoryCache::new()),
        ));
        servers.push(
            start(&registry, "rating", cancel.clone(), |listener, cancel| {
                rating_service::service::serve(rating, listener, async move {
                    cancel.cancelled().await
                })
            })
            .await,
        );

        let movie = Arc::new(MovieController::new(
            Arc::new(MetadataClient::new(registry.clone(), ServiceName::from("metadata"))),
            Arc::new(RatingClient::new(registry.clone(), ServiceName::from("rating"))),
        ));
        servers.push(
            start(&registry, "movie", cancel.clone(), |listener, cancel| {
                movie_service::service::serve(movie, listener, async move {
                    cancel.cancelled().await
                })
            })
            .await,
        );

        Self {
            registry,
            cancel,
            servers,
        }
    }

    async fn movie_client(&self) -> MovieServiceClient<tonic::transport::Channel> {
        let channel = service_connection(self.registry.as_ref(), &ServiceName::from("movie"))
            .await
            .unwrap();
        MovieServiceClient::new(channel)
    }

    async fn shutdown(self) {
        self.cancel.cancel();
        for server in self.servers {
            server.await.unwrap().unwrap();
        }
    }
}

fn details_request(movie_id: &str) -> Request<GetMovieDetailsRequest> {
    Request::new(GetMovieDetailsRequest {
        movie_id: movie_id.to_string(),
    })
}

#[tokio::test]
async fn movie_details_combine_metadata_and_ratings() {
    let cluster = Cluster::start().await;
    let metadata = Metadata {
        id: "the-movie".to_string(),
        title: "The Movie".to_string(),
        description: "Movie description".to_string(),
        director: "Mr. D".to_string(),
    };
    MetadataClient::new(cluster.registry.clone(), ServiceName::from("metadata"))
        .put(&metadata)
        .await
        .unwrap();

    let mut client = cluster.movie_client().await;

    // 还没有评分时只返回元数据
    let details = client
        .get_movie_details(details_request("the-movie"))
        .await
        .unwrap()
        .into_inner()
        .movie_details
        .unwrap();
    assert_eq!(details.rating, None);
    assert_eq!(Metadata::from(details.metadata.unwrap()), metadata);

    let ratings = RatingClient::new(cluster.registry.clone(), ServiceName::from("rating"));
    let id = RecordId::from("the-movie");
    let movie = RecordType::from("movie");
    ratings.put_rating(&id, &movie, &Rating::new("user0", 5)).await.unwrap();
    ratings.put_rating(&id, &movie, &Rating::new("user1", 1)).await.unwrap();

    let details = client
        .get_movie_details(details_request("the-movie"))
        .await
        .unwrap()
        .into_inner()
        .movie_details
        .unwrap();
    assert_eq!(details.rating, Some(3.0));

    drop(client);
    cluster.shutdown().await;
}

#[tokio::test]
async fn unknown_movie_is_not_found() {
    let cluster = Cluster::start().await;
    let mut client = cluster.movie_client().await;

    let status = client
        .get_movie_details(details_request("missing"))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::NotFound);

    let status = client.get_movie_details(details_request("")).await.unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);

    drop(client);
    cluster.shutdown().await;
}

#[tokio::test]
async fn missing_rating_service_fails_details() {
    let cluster = Cluster::start().await;
    MetadataClient::new(cluster.registry.clone(), ServiceName::from("metadata"))
        .put(&Metadata {
            id: "m1".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    cluster
        .registry
        .deregister(&InstanceId::from("rating-1"), &ServiceName::from("rating"))
        .await
        .unwrap();

    let status = cluster
        .movie_client()
        .await
        .get_movie_details(details_request("m1"))
        .await
        .unwrap_err();
    // 评分服务不可达时不能当作“暂无评分”返回
    assert_eq!(status.code(), Code::NotFound);
    assert!(status.message().contains("rating"), "{}", status.message());

    cluster.shutdown().await;
}
