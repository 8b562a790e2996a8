use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tracing::info;

use common::config::{ConfigLoader, DEFAULT_CONFIG_PATH};
use common::configs::IngesterKind;
use common::service::{register_service, shutdown_signal, supervise};
use common::service_register_center::service_register_center;

use rating_service::controller::RatingController;
use rating_service::ingester::{Ingester, KafkaReader};
use rating_service::repository::rating_repository;
use rating_service::service::serve;

/// 评分服务
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// 配置文件路径
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// 覆盖配置中的监听端口
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    // 初始化全局配置
    let config = ConfigLoader::init_global(Some(&args.config))?;
    common::logging::init_from_config(&config)?;

    let rpc = match args.port {
        Some(port) => config.rpc.rating.with_port(port),
        None => config.rpc.rating.clone(),
    };
    info!("正在启动评分服务...");

    // 初始化存储、缓存和消息来源
    let repo = rating_repository(&config).await?;
    let cache = cache::cache(&config).await?;
    let mut controller = RatingController::new(repo, cache);
    if config.storage.ingester == IngesterKind::Kafka {
        let reader = KafkaReader::from_config(&config)?;
        controller = controller.with_ingester(Arc::new(Ingester::new(reader)));
    }
    let controller = Arc::new(controller);

    let listener = TcpListener::bind(rpc.rpc_server_url()).await?;
    let local_addr = listener.local_addr()?;
    info!("评分服务启动，监听地址: {}", local_addr);

    // 注册到服务注册中心并开始心跳
    let cancel = CancellationToken::new();
    let registration = register_service(
        service_register_center(&config),
        &rpc,
        local_addr,
        Duration::from_secs(config.service_center.heartbeat_interval),
        cancel.clone(),
    )
    .await?;
    let signal_task = tokio::spawn(shutdown_signal(cancel.clone()));

    // gRPC服务和评分事件消费任一结束都会关闭整个服务
    let mut tasks = JoinSet::new();
    let server_cancel = cancel.clone();
    tasks.spawn(serve(
        controller.clone(),
        TcpListenerStream::new(listener),
        async move { server_cancel.cancelled().await },
    ));
    if controller.has_ingester() {
        let controller = controller.clone();
        let ingest_cancel = cancel.clone();
        tasks.spawn(async move { controller.start_ingestion(ingest_cancel).await });
    }

    let result = supervise(tasks, cancel.clone()).await;
    signal_task.await?;
    registration.deregister().await;
    info!("评分服务已完全关闭");

    result?;
    Ok(())
}
