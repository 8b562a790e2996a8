use thiserror::Error;

/// 错误分类，决定错误如何被调用方处理以及如何映射为RPC状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 预期内的缺失：没有存活实例、没有评分、实例未注册
    NotFound,
    /// 非法输入：地址格式错误、请求字段缺失
    InvalidInput,
    /// 外部依赖不可用：存储、消息队列、注册中心、缓存
    UpstreamUnavailable,
    /// 其他未预期的错误
    Internal,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("内部服务错误: {0}")]
    Internal(String),

    #[error("资源不存在: {0}")]
    NotFound(String),

    #[error("请求无效: {0}")]
    BadRequest(String),

    #[error("地址格式无效, 需要 <host>:<port>: {0}")]
    InvalidAddress(String),

    #[error("服务 {service_name} 的实例 {instance_id} 尚未注册")]
    NotRegistered {
        instance_id: String,
        service_name: String,
    },

    #[error("未找到服务 {0} 的存活实例")]
    NoInstancesFound(String),

    #[error("记录 {record_type}/{record_id} 没有评分")]
    RatingsNotFound {
        record_id: String,
        record_type: String,
    },

    #[error("电影 {0} 没有元数据")]
    MetadataNotFound(String),

    #[error("评分写入失败: {0}")]
    StoreWriteFailed(String),

    #[error("上游服务不可用: {0}")]
    UpstreamUnavailable(String),

    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Redis错误: {0}")]
    Redis(String),

    #[error("Kafka错误: {0}")]
    Kafka(String),

    #[error("IO错误: {0}")]
    IO(#[from] std::io::Error),

    #[error("JSON错误: {0}")]
    Json(#[from] serde_json::Error),

    #[error("gRPC传输错误: {0}")]
    Tonic(#[from] tonic::transport::Error),

    #[error("gRPC状态错误: {0}")]
    TonicStatus(#[from] tonic::Status),
}

impl Error {
    /// 返回错误所属的分类
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound(_)
            | Error::NotRegistered { .. }
            | Error::NoInstancesFound(_)
            | Error::RatingsNotFound { .. }
            | Error::MetadataNotFound(_) => ErrorKind::NotFound,
            Error::BadRequest(_) | Error::InvalidAddress(_) => ErrorKind::InvalidInput,
            Error::StoreWriteFailed(_)
            | Error::UpstreamUnavailable(_)
            | Error::Database(_)
            | Error::Redis(_)
            | Error::Kafka(_)
            | Error::IO(_)
            | Error::Tonic(_) => ErrorKind::UpstreamUnavailable,
            Error::TonicStatus(status) => match status.code() {
                tonic::Code::NotFound => ErrorKind::NotFound,
                tonic::Code::InvalidArgument => ErrorKind::InvalidInput,
                tonic::Code::Unavailable => ErrorKind::UpstreamUnavailable,
                _ => ErrorKind::Internal,
            },
            Error::Internal(_) | Error::Json(_) => ErrorKind::Internal,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl From<String> for Error {
    fn from(err: String) -> Self {
        Error::Internal(err)
    }
}

impl From<&str> for Error {
    fn from(err: &str) -> Self {
        Error::Internal(err.to_string())
    }
}

// Redis错误转换实现
impl From<redis::RedisError> for Error {
    fn from(err: redis::RedisError) -> Self {
        Error::Redis(format!("Redis错误: {}", err))
    }
}

// 从Error转换为tonic::Status，用于gRPC响应
impl From<Error> for tonic::Status {
    fn from(error: Error) -> Self {
        match error.kind() {
            ErrorKind::NotFound => tonic::Status::not_found(error.to_string()),
            ErrorKind::InvalidInput => tonic::Status::invalid_argument(error.to_string()),
            _ => tonic::Status::internal(error.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
