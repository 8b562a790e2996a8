use config::{Config, ConfigError, File, FileFormat};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::configs::{DatabaseConfig, LogConfig, StorageConfig};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "./config/config.yaml";

// 定义一个静态全局配置，可以在任何地方访问
pub static GLOBAL_CONFIG: Lazy<RwLock<Option<Arc<AppConfig>>>> = Lazy::new(|| RwLock::new(None));

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub log: LogConfig,
    pub service_center: ServiceCenterConfig,
    pub rpc: RpcConfig,
    pub redis: RedisConfig,
    pub kafka: KafkaConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    /// 聚合评分在Redis中的过期时间（秒），不设置则永不过期
    pub aggregate_ttl: Option<u64>,
    pub connection_timeout_ms: Option<u64>,
}

impl RedisConfig {
    pub fn url(&self) -> String {
        format!("redis://{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct KafkaProducerConfig {
    pub timeout: u64,
    pub acks: String,
    pub max_retry: u32,
    pub retry_interval: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KafkaConsumerConfig {
    pub auto_offset_reset: String,
    pub session_timeout: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KafkaConfig {
    pub hosts: Vec<String>,
    pub topic: String,
    pub group: String,
    pub connect_timeout: u64,
    pub producer: KafkaProducerConfig,
    pub consumer: KafkaConsumerConfig,
}

impl KafkaConfig {
    pub fn brokers(&self) -> String {
        self.hosts.join(",")
    }
}

/// 服务注册中心的实现类型
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RegistryKind {
    #[default]
    Consul,
    Memory,
}

/// 服务发现配置
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceCenterConfig {
    #[serde(default)]
    pub kind: RegistryKind,
    pub host: String,
    pub port: u16,
    pub timeout: u64,
    pub protocol: String,
    /// Consul TTL健康检查的过期时间（秒）
    #[serde(default = "default_check_ttl")]
    pub check_ttl: u64,
    /// 心跳上报间隔（秒）
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval: u64,
    /// 本地注册中心判定实例失活的窗口（秒）
    #[serde(default = "default_staleness_window")]
    pub staleness_window: u64,
}

fn default_check_ttl() -> u64 {
    5
}

fn default_heartbeat_interval() -> u64 {
    1
}

fn default_staleness_window() -> u64 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct RpcServiceConfig {
    /// 监听地址
    pub host: String,
    pub port: u16,
    /// 注册到服务中心的服务名
    pub name: String,
    /// 注册到服务中心的主机名，不设置时使用实际监听的地址
    pub advertise_host: Option<String>,
}

impl RpcServiceConfig {
    #[inline]
    pub fn rpc_server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn with_port(&self, port: u16) -> RpcServiceConfig {
        RpcServiceConfig {
            port,
            ..self.clone()
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RpcConfig {
    pub rating: RpcServiceConfig,
    pub metadata: RpcServiceConfig,
    pub movie: RpcServiceConfig,
}

impl AppConfig {
    // 从默认路径创建AppConfig实例
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_file(None)
    }

    // 从多个来源加载配置
    pub fn from_file(file_path: Option<&str>) -> Result<Self, ConfigError> {
        let path = file_path.unwrap_or(DEFAULT_CONFIG_PATH);
        if !Path::new(path).exists() {
            return Err(ConfigError::NotFound(path.to_string()));
        }

        let format = if path.ends_with(".json") {
            FileFormat::Json
        } else if path.ends_with(".yaml") || path.ends_with(".yml") {
            FileFormat::Yaml
        } else {
            FileFormat::Toml
        };

        let config = Config::builder()
            .add_source(File::with_name(path).format(format))
            // 环境变量优先级最高，例如 RATING__REDIS__HOST=redis
            .add_source(
                config::Environment::with_prefix("RATING")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        // 转换为AppConfig结构体
        config.try_deserialize()
    }
}

/// 全局配置单例的访问入口
pub struct ConfigLoader;

impl ConfigLoader {
    // 初始化全局配置单例
    pub fn init_global(file_path: Option<&str>) -> Result<Arc<AppConfig>, ConfigError> {
        let config = Arc::new(AppConfig::from_file(file_path)?);
        *GLOBAL_CONFIG.write() = Some(config.clone());
        info!("全局配置已加载: {}", file_path.unwrap_or(DEFAULT_CONFIG_PATH));
        Ok(config)
    }

    // 获取全局配置单例
    pub fn get_global() -> Option<Arc<AppConfig>> {
        GLOBAL_CONFIG.read().clone()
    }
}
