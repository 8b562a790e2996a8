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
use common::grpc_client::{MetadataClient, RatingClient};
use common::service::{register_service, shutdown_signal, supervise};
use common::service_register_center::{service_register_center, ServiceName};

use movie_service::controller::MovieController;
use movie_service::service::serve;

/// 电影详情服务
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

    let config = ConfigLoader::init_global(Some(&args.config))?;
    common::logging::init_from_config(&config)?;

    let rpc = match args.port {
        Some(port) => config.rpc.movie.with_port(port),
        None => config.rpc.movie.clone(),
    };
    info!("正在启动电影服务...");

    // 下游服务通过同一个注册中心发现
    let registry = service_register_center(&config);
    let controller = Arc::new(MovieController::new(
        Arc::new(MetadataClient::new(
            registry.clone(),
            ServiceName::new(config.rpc.metadata.name.clone()),
        )),
        Arc::new(RatingClient::new(
            registry.clone(),
            ServiceName::new(config.rpc.rating.name.clone()),
        )),
    ));

    let listener = TcpListener::bind(rpc.rpc_server_url()).await?;
    let local_addr = listener.local_addr()?;
    info!("电影服务启动，监听地址: {}", local_addr);

    let cancel = CancellationToken::new();
    let registration = register_service(
        registry,
        &rpc,
        local_addr,
        Duration::from_secs(config.service_center.heartbeat_interval),
        cancel.clone(),
    )
    .await?;
    let signal_task = tokio::spawn(shutdown_signal(cancel.clone()));

    let mut tasks = JoinSet::new();
    let server_cancel = cancel.clone();
    tasks.spawn(serve(
        controller,
        TcpListenerStream::new(listener),
        async move { server_cancel.cancelled().await },
    ));

    let result = supervise(tasks, cancel.clone()).await;
    signal_task.await?;
    registration.deregister().await;
    info!("电影服务已完全关闭");

    result?;
    Ok(())
}
