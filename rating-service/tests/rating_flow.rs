use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;

use cache::MemoryCache;
use common::grpc_client::RatingClient;
use common::models::{Rating, RatingEvent, RecordId, RecordType, UserId};
use common::service_register_center::{InstanceId, MemoryRegistry, ServiceName, ServiceRegister};
use common::Error;

use rating_service::controller::RatingController;
use rating_service::ingester::{channel_broker, Ingester};
use rating_service::repository::MemoryRepository;
use rating_service::service::serve;

/// 在随机端口上启动评分服务，返回监听地址
async fn start_server(
    controller: Arc<RatingController>,
    cancel: CancellationToken,
) -> (String, JoinHandle<Result<(), Error>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let handle = tokio::spawn(serve(
        controller,
        TcpListenerStream::new(listener),
        async move { cancel.cancelled().await },
    ));
    (addr, handle)
}

fn memory_controller() -> RatingController {
    RatingController::new(Arc::new(MemoryRepository::new()), Arc::new(MemoryCache::new()))
}

async fn gateway_for(addr: &str, registry: Arc<MemoryRegistry>) -> RatingClient {
    let name = ServiceName::from("rating");
    registry
        .register(&InstanceId::from("rating-1"), &name, addr)
        .await
        .unwrap();
    RatingClient::new(registry, name)
}

#[tokio::test]
async fn put_and_get_through_gateway() {
    let cancel = CancellationToken::new();
    let (addr, server) = start_server(Arc::new(memory_controller()), cancel.clone()).await;
    let gateway = gateway_for(&addr, Arc::new(MemoryRegistry::new())).await;

    let id = RecordId::from("m1");
    let movie = RecordType::from("movie");
    gateway.put_rating(&id, &movie, &Rating::new("u1", 5)).await.unwrap();
    gateway.put_rating(&id, &movie, &Rating::new("u2", 1)).await.unwrap();
    assert_eq!(gateway.get_aggregated_rating(&id, &movie).await.unwrap(), 3.0);

    let missing = gateway
        .get_aggregated_rating(&RecordId::from("m2"), &movie)
        .await;
    assert!(matches!(missing, Err(Error::NotFound(_))));

    cancel.cancel();
    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn gateway_without_live_instances_fails() {
    let gateway = RatingClient::new(Arc::new(MemoryRegistry::new()), ServiceName::from("rating"));
    let result = gateway
        .get_aggregated_rating(&RecordId::from("m1"), &RecordType::from("movie"))
        .await;
    assert!(matches!(result, Err(Error::NoInstancesFound(_))));
}

#[tokio::test]
async fn stale_instances_are_not_selected() {
    let cancel = CancellationToken::new();
    let (addr, server) = start_server(Arc::new(memory_controller()), cancel.clone()).await;

    let registry = Arc::new(MemoryRegistry::with_staleness_window(Duration::from_millis(200)));
    let name = ServiceName::from("rating");
    // 不可达的实例注册后不再上报心跳
    registry
        .register(&InstanceId::from("rating-dead"), &name, "127.0.0.1:1")
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(400)).await;
    registry
        .register(&InstanceId::from("rating-live"), &name, &addr)
        .await
        .unwrap();

    let gateway = RatingClient::new(registry, name);
    let id = RecordId::from("m1");
    let movie = RecordType::from("movie");
    for value in 1..=5 {
        gateway
            .put_rating(&id, &movie, &Rating::new(UserId::new(format!("u{}", value)), value))
            .await
            .unwrap();
    }
    assert_eq!(gateway.get_aggregated_rating(&id, &movie).await.unwrap(), 3.0);

    cancel.cancel();
    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn ingested_events_are_visible_through_rpc() {
    let cancel = CancellationToken::new();
    let (broker, reader) = channel_broker(4);
    let controller = Arc::new(memory_controller().with_ingester(Arc::new(Ingester::new(reader))));
    let ingestion = controller.spawn_ingestion(cancel.clone());
    let (addr, server) = start_server(controller, cancel.clone()).await;
    let gateway = gateway_for(&addr, Arc::new(MemoryRegistry::new())).await;

    for (user, value) in [("u1", 5), ("u2", 3)] {
        let event = RatingEvent {
            record_id: RecordId::from("m1"),
            record_type: RecordType::from("movie"),
            user_id: UserId::from(user),
            value,
        };
        broker.send(serde_json::to_vec(&event).unwrap()).await.unwrap();
    }
    drop(broker);
    ingestion.await.unwrap().unwrap();

    let value = gateway
        .get_aggregated_rating(&RecordId::from("m1"), &RecordType::from("movie"))
        .await
        .unwrap();
    assert_eq!(value, 4.0);

    cancel.cancel();
    server.await.unwrap().unwrap();
}
