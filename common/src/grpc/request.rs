use tonic::Status;
use tracing::error;

use crate::{Error, ErrorKind};

/// 校验必填字段，为空时返回 `BadRequest`
pub fn require_field(field: &str, value: &str) -> Result<(), Error> {
    if value.is_empty() {
        return Err(Error::BadRequest(format!("{} 不能为空", field)));
    }
    Ok(())
}

/// 把业务错误转换为gRPC状态，预期内的错误不记录错误日志
pub fn to_status(err: Error) -> Status {
    if matches!(err.kind(), ErrorKind::Internal | ErrorKind::UpstreamUnavailable) {
        error!("请求处理失败: {}", err);
    }
    err.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Code;

    #[test]
    fn empty_field_is_invalid_argument() {
        assert!(require_field("movie_id", "m1").is_ok());
        let err = require_field("movie_id", "").unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
        assert_eq!(to_status(err).code(), Code::InvalidArgument);
    }

    #[test]
    fn store_errors_become_internal() {
        let status = to_status(Error::StoreWriteFailed("disk full".to_string()));
        assert_eq!(status.code(), Code::Internal);
    }
}
