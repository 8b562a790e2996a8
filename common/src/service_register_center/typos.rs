// 导入 serde 用于序列化和反序列化
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::time::Instant;

use crate::Error;

/// 逻辑服务名称，例如 "rating"
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ServiceName(String);

impl ServiceName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServiceName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// 服务实例ID，在同一服务名下唯一
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct InstanceId(String);

impl InstanceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstanceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// 生成伪唯一的实例ID: `<服务名>-<随机数>`
///
/// 不保证全局唯一，冲突时注册中心按最后一次写入覆盖
pub fn generate_instance_id(service_name: &ServiceName) -> InstanceId {
    let suffix: u64 = rand::rng().random();
    InstanceId(format!("{}-{}", service_name, suffix))
}

/// 已注册的服务实例
#[derive(Debug, Clone)]
pub struct ServiceInstance {
    pub service_name: ServiceName,
    pub instance_id: InstanceId,
    /// "host:port" 形式的地址
    pub host_port: String,
    /// 最近一次注册或心跳的时间
    pub last_active: Instant,
}

impl ServiceInstance {
    /// 实例在 `window` 内有过心跳即视为存活
    pub fn is_live(&self, now: Instant, window: std::time::Duration) -> bool {
        now.saturating_duration_since(self.last_active) < window
    }
}

/// 把 "host:port" 解析为主机和端口
pub fn parse_host_port(host_port: &str) -> Result<(String, u16), Error> {
    let (host, port) = host_port
        .rsplit_once(':')
        .ok_or_else(|| Error::InvalidAddress(host_port.to_string()))?;
    if host.is_empty() {
        return Err(Error::InvalidAddress(host_port.to_string()));
    }
    let port = port
        .parse::<u16>()
        .map_err(|_| Error::InvalidAddress(host_port.to_string()))?;
    Ok((host.to_string(), port))
}
