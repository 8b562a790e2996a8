mod interceptor;
mod request;

pub use interceptor::LoggingInterceptor;
pub use request::{require_field, to_status};
