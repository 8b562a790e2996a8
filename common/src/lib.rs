pub mod config;
pub mod configs;
pub mod error;
pub mod grpc;
pub mod grpc_client;
pub mod logging;
pub mod models;
pub mod proto;
pub mod service;
pub mod service_discovery;
pub mod service_register_center;

pub use error::{Error, ErrorKind};
pub type Result<T> = std::result::Result<T, Error>;
