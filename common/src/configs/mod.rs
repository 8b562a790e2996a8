mod database_config;
mod log_config;
mod storage_config;

pub use database_config::*;
pub use log_config::*;
pub use storage_config::*;
