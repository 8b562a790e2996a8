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
use common::service::{register_service, shutdown_signal, supervise};
use common::service_register_center::service_register_center;

use metadata_service::controller::MetadataController;
use metadata_service::repository::{metadata_repository, MemoryRepository};
use metadata_service::service::serve;

/// 电影元数据服务
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
        Some(port) => config.rpc.metadata.with_port(port),
        None => config.rpc.metadata.clone(),
    };
    info!("正在启动元数据服务...");

    let repo = metadata_repository(&config).await?;
    let controller = Arc::new(MetadataController::new(repo, Arc::new(MemoryRepository::new())));

    let listener = TcpListener::bind(rpc.rpc_server_url()).await?;
    let local_addr = listener.local_addr()?;
    info!("元数据服务启动，监听地址: {}", local_addr);

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
    info!("元数据服务已完全关闭");

    result?;
    Ok(())
}
