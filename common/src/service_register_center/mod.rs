// 导入标准库和必要的依赖
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use crate::config::{AppConfig, RegistryKind};
use crate::Error;

// 声明子模块
pub mod consul;
pub mod memory;
pub mod typos;

// 导入类型定义
pub use crate::service_register_center::consul::Consul;
pub use crate::service_register_center::memory::MemoryRegistry;
pub use crate::service_register_center::typos::{
    generate_instance_id, parse_host_port, InstanceId, ServiceInstance, ServiceName,
};

/// 服务注册与发现接口
///
/// 推模式：实例注册后需周期性调用 `report_healthy_state`，
/// 超过存活窗口没有心跳的实例不会出现在 `service_endpoints` 结果中
#[async_trait]
pub trait ServiceRegister: Send + Sync + Debug {
    /// 注册（或覆盖）一个服务实例
    ///
    /// # 参数
    /// * `instance_id` - 实例ID
    /// * `service_name` - 服务名称
    /// * `host_port` - "host:port" 形式的地址，格式错误时返回 `InvalidAddress`
    async fn register(
        &self,
        instance_id: &InstanceId,
        service_name: &ServiceName,
        host_port: &str,
    ) -> Result<(), Error>;

    /// 注销服务实例，实例不存在时不报错
    async fn deregister(
        &self,
        instance_id: &InstanceId,
        service_name: &ServiceName,
    ) -> Result<(), Error>;

    /// 返回服务所有存活实例的地址，没有存活实例时返回 `NoInstancesFound`
    async fn service_endpoints(&self, service_name: &ServiceName) -> Result<Vec<String>, Error>;

    /// 上报健康状态，实例未注册时返回 `NotRegistered`
    async fn report_healthy_state(
        &self,
        instance_id: &InstanceId,
        service_name: &ServiceName,
    ) -> Result<(), Error>;
}

/// 创建服务注册中心实例
///
/// 根据配置中的 `service_center.kind` 选择Consul或进程内实现
///
/// # 返回
/// 返回一个实现了 ServiceRegister 特征的 Arc 包装对象
pub fn service_register_center(config: &AppConfig) -> Arc<dyn ServiceRegister> {
    match config.service_center.kind {
        RegistryKind::Consul => Arc::new(Consul::from_config(config)),
        RegistryKind::Memory => Arc::new(MemoryRegistry::with_staleness_window(
            Duration::from_secs(config.service_center.staleness_window),
        )),
    }
}
