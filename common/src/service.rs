use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::RpcServiceConfig;
use crate::service_register_center::{
    generate_instance_id, InstanceId, ServiceName, ServiceRegister,
};
use crate::Error;

/// 计算注册到服务中心的地址
///
/// 优先使用配置的 `advertise_host`，否则使用监听器实际绑定的地址；
/// 绑定在通配地址上时退回到回环地址
pub fn advertise_address(rpc: &RpcServiceConfig, local_addr: SocketAddr) -> String {
    let host = match &rpc.advertise_host {
        Some(host) => host.clone(),
        None if local_addr.ip().is_unspecified() => "127.0.0.1".to_string(),
        None => local_addr.ip().to_string(),
    };
    format!("{}:{}", host, local_addr.port())
}

/// 已注册到服务中心的实例
#[derive(Debug)]
pub struct Registration {
    pub instance_id: InstanceId,
    pub service_name: ServiceName,
    pub address: String,
    registry: Arc<dyn ServiceRegister>,
    heartbeat: JoinHandle<()>,
}

impl Registration {
    /// 等待心跳任务退出并注销实例，注销失败只记录日志
    pub async fn deregister(self) {
        if let Err(e) = self.heartbeat.await {
            error!("心跳任务异常退出: {}", e);
        }
        if let Err(e) = self
            .registry
            .deregister(&self.instance_id, &self.service_name)
            .await
        {
            warn!(instance_id = %self.instance_id, "注销服务失败: {}", e);
        }
    }
}

/// 注册服务实例并启动心跳任务
pub async fn register_service(
    registry: Arc<dyn ServiceRegister>,
    rpc: &RpcServiceConfig,
    local_addr: SocketAddr,
    heartbeat_interval: Duration,
    cancel: CancellationToken,
) -> Result<Registration, Error> {
    let service_name = ServiceName::new(rpc.name.clone());
    let instance_id = generate_instance_id(&service_name);
    let address = advertise_address(rpc, local_addr);

    registry
        .register(&instance_id, &service_name, &address)
        .await?;
    info!(%service_name, %instance_id, %address, "服务已注册到服务注册中心");

    let heartbeat = spawn_heartbeat(
        registry.clone(),
        instance_id.clone(),
        service_name.clone(),
        heartbeat_interval,
        cancel,
    );

    Ok(Registration {
        instance_id,
        service_name,
        address,
        registry,
        heartbeat,
    })
}

/// 监管一组长期运行的任务
///
/// 任一任务结束（无论成功与否）都会触发取消令牌，随后等待其余任务退出。
/// 返回第一个失败任务的错误
pub async fn supervise(
    mut tasks: JoinSet<Result<(), Error>>,
    cancel: CancellationToken,
) -> Result<(), Error> {
    let mut first_error = None;
    while let Some(joined) = tasks.join_next().await {
        if !cancel.is_cancelled() {
            info!("后台任务已结束，准备关闭其余任务");
            cancel.cancel();
        }

        let result = joined
            .map_err(|e| Error::Internal(format!("任务异常退出: {}", e)))
            .and_then(|result| result);
        if let Err(e) = result {
            error!("后台任务失败: {}", e);
            first_error.get_or_insert(e);
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// 启动心跳任务
///
/// 按固定间隔向注册中心上报健康状态，上报失败只记录日志并继续，
/// 取消令牌触发后任务退出
pub fn spawn_heartbeat(
    registry: Arc<dyn ServiceRegister>,
    instance_id: InstanceId,
    service_name: ServiceName,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(%service_name, %instance_id, ?interval, "心跳任务已启动");
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    match registry.report_healthy_state(&instance_id, &service_name).await {
                        Ok(()) => debug!(%instance_id, "上报健康状态成功"),
                        Err(e) => error!(%instance_id, "上报健康状态失败: {}", e),
                    }
                }
            }
        }

        info!(%service_name, %instance_id, "心跳任务已停止");
    })
}

/// 等待关闭信号
///
/// 收到 Ctrl+C 或 SIGTERM 后触发取消令牌
pub async fn shutdown_signal(cancel: CancellationToken) {
    use tokio::signal;

    // 监听 Ctrl+C 信号
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("无法安装Ctrl+C处理器: {}", e);
            std::future::pending::<()>().await;
        }
    };

    // 在Unix系统上监听 SIGTERM 信号
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("无法安装SIGTERM处理器: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    // 在非Unix系统上创建一个永不返回的future
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
        _ = cancel.cancelled() => {},
    }

    info!("接收到关闭信号，准备优雅关闭...");
    cancel.cancel();
}
