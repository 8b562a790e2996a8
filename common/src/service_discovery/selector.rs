use rand::Rng;
use tonic::transport::{Channel, Endpoint};
use tracing::debug;

use crate::service_register_center::{ServiceName, ServiceRegister};
use crate::Error;

/// 从地址列表中均匀随机地选出一个
pub fn select_endpoint<'a, R: Rng + ?Sized>(endpoints: &'a [String], rng: &mut R) -> Option<&'a String> {
    if endpoints.is_empty() {
        return None;
    }
    endpoints.get(rng.random_range(0..endpoints.len()))
}

/// 随机选择服务的一个存活实例并建立gRPC连接
///
/// 不做重试和退避，调用方需要自行处理 `NoInstancesFound` 和连接错误
pub async fn service_connection(
    registry: &dyn ServiceRegister,
    service_name: &ServiceName,
) -> Result<Channel, Error> {
    let endpoints = registry.service_endpoints(service_name).await?;
    let address = select_endpoint(&endpoints, &mut rand::rng())
        .cloned()
        .ok_or_else(|| Error::NoInstancesFound(service_name.to_string()))?;

    debug!(%service_name, %address, "连接服务实例");
    let channel = Endpoint::from_shared(format!("http://{}", address))?
        .connect()
        .await?;
    Ok(channel)
}
