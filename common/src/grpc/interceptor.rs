use tonic::{Request, Status};
use tracing::info;

/// 用于记录gRPC请求的拦截器
#[derive(Debug, Clone, Default)]
pub struct LoggingInterceptor {}

impl LoggingInterceptor {
    pub fn new() -> Self {
        Self {}
    }
}

fn metadata_value<'a>(request: &'a Request<()>, key: &str, default: &'a str) -> &'a str {
    request
        .metadata()
        .get(key)
        .map(|v| v.to_str().unwrap_or("unknown"))
        .unwrap_or(default)
}

impl tonic::service::Interceptor for LoggingInterceptor {
    fn call(&mut self, request: Request<()>) -> Result<Request<()>, Status> {
        // 从请求元数据中提取trace_id和调用方信息
        let trace_id = metadata_value(&request, "x-trace-id", "none");
        let caller = metadata_value(&request, "caller", "unknown");
        let remote = request
            .remote_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| "unknown".to_string());

        info!(trace_id = %trace_id, caller = %caller, remote = %remote, "收到gRPC请求");

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::service::Interceptor;

    #[test]
    fn interceptor_passes_request_through() {
        let mut request = Request::new(());
        request
            .metadata_mut()
            .insert("x-trace-id", "trace-1".parse().unwrap());
        let mut interceptor = LoggingInterceptor::new();
        let request = interceptor.call(request).unwrap();
        assert_eq!(metadata_value(&request, "x-trace-id", "none"), "trace-1");
        assert_eq!(metadata_value(&request, "caller", "unknown"), "unknown");
    }
}
