use serde::Deserialize;

/// 评分仓库的实现类型
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryKind {
    #[default]
    Memory,
    Postgres,
}

/// 聚合评分缓存的实现类型
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CacheKind {
    #[default]
    Memory,
    Redis,
}

/// 评分消息来源
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IngesterKind {
    /// 不消费外部消息，只通过RPC写入
    #[default]
    Disabled,
    Kafka,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub repository: RepositoryKind,
    #[serde(default)]
    pub cache: CacheKind,
    #[serde(default)]
    pub ingester: IngesterKind,
}
