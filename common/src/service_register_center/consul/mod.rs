use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::AppConfig;
use crate::service_register_center::typos::{parse_host_port, InstanceId, ServiceName};
use crate::service_register_center::ServiceRegister;
use crate::Error;

/// Consul client configuration options
#[derive(Debug, Clone)]
pub struct ConsulOptions {
    pub host: String,
    pub port: u16,
    pub protocol: String,
    pub timeout: u64,
    /// TTL of the health check installed on registration, in seconds
    pub check_ttl: u64,
}

impl ConsulOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            host: config.service_center.host.clone(),
            port: config.service_center.port,
            timeout: config.service_center.timeout,
            protocol: config.service_center.protocol.clone(),
            check_ttl: config.service_center.check_ttl,
        }
    }

    fn base_url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }
}

/// Consul service registry implementation
///
/// Every registered instance gets a TTL check whose id equals the instance id.
/// Consul marks the check critical on its own when heartbeats stop arriving.
#[derive(Debug)]
pub struct Consul {
    pub options: ConsulOptions,
    client: reqwest::Client,
}

impl Consul {
    /// Create a new Consul client from application config
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(ConsulOptions::from_config(config))
    }

    pub fn new(options: ConsulOptions) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(options.timeout))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { options, client }
    }

    /// 构建服务注册请求体
    fn registration_payload(
        &self,
        instance_id: &InstanceId,
        service_name: &ServiceName,
        host: &str,
        port: u16,
    ) -> serde_json::Value {
        json!({
            "ID": instance_id.as_str(),
            "Name": service_name.as_str(),
            "Address": host,
            "Port": port,
            "Check": {
                "CheckID": instance_id.as_str(),
                "Name": format!("{} TTL Check", service_name),
                "Notes": "TTL health check refreshed by instance heartbeats",
                "TTL": format!("{}s", self.options.check_ttl),
            }
        })
    }

    async fn error_from_response(response: reqwest::Response) -> Error {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Error::UpstreamUnavailable(format!("Consul HTTP {}: {}", status, error_text))
    }
}

/// 从 /v1/health/service 的响应中提取实例地址
///
/// 服务没有设置地址时回退到节点地址
pub(crate) fn endpoints_from_health_entries(entries: &[serde_json::Value]) -> Vec<String> {
    entries
        .iter()
        .filter_map(|entry| {
            let service = entry.get("Service")?;
            let port = service.get("Port").and_then(|v| v.as_u64())?;
            let address = service
                .get("Address")
                .and_then(|v| v.as_str())
                .filter(|a| !a.is_empty())
                .or_else(|| {
                    entry
                        .get("Node")
                        .and_then(|n| n.get("Address"))
                        .and_then(|a| a.as_str())
                })?;
            Some(format!("{}:{}", address, port))
        })
        .collect()
}

#[async_trait]
impl ServiceRegister for Consul {
    async fn register(
        &self,
        instance_id: &InstanceId,
        service_name: &ServiceName,
        host_port: &str,
    ) -> Result<(), Error> {
        let (host, port) = parse_host_port(host_port)?;
        let url = format!("{}/v1/agent/service/register", self.options.base_url());

        debug!("Registering service: {} ({}:{})", service_name, host, port);

        let payload = self.registration_payload(instance_id, service_name, &host, port);
        let response = self
            .client
            .put(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::UpstreamUnavailable(format!("HTTP request failed: {}", e)))?;

        if response.status().is_success() {
            info!("Service registered successfully: {}", instance_id);
            Ok(())
        } else {
            let err = Self::error_from_response(response).await;
            error!("Failed to register service: {}", err);
            Err(err)
        }
    }

    async fn deregister(
        &self,
        instance_id: &InstanceId,
        _service_name: &ServiceName,
    ) -> Result<(), Error> {
        let url = format!(
            "{}/v1/agent/service/deregister/{}",
            self.options.base_url(),
            instance_id
        );

        debug!("Deregistering service: {}", instance_id);

        let response = self
            .client
            .put(&url)
            .send()
            .await
            .map_err(|e| Error::UpstreamUnavailable(format!("HTTP request failed: {}", e)))?;

        match response.status() {
            status if status.is_success() => {
                info!("Service deregistered successfully: {}", instance_id);
                Ok(())
            }
            // 实例已不存在
            StatusCode::NOT_FOUND => {
                debug!("Service {} was not registered", instance_id);
                Ok(())
            }
            _ => {
                let err = Self::error_from_response(response).await;
                error!("Failed to deregister service: {}", err);
                Err(err)
            }
        }
    }

    async fn service_endpoints(&self, service_name: &ServiceName) -> Result<Vec<String>, Error> {
        // 使用health API只获取健康的服务
        let url = format!(
            "{}/v1/health/service/{}?passing=true",
            self.options.base_url(),
            service_name
        );

        debug!("Finding healthy services with name: {}", service_name);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::UpstreamUnavailable(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let err = Self::error_from_response(response).await;
            error!("Failed to find services: {}", err);
            return Err(err);
        }

        let entries: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| Error::UpstreamUnavailable(format!("Failed to parse response: {}", e)))?;

        let endpoints = endpoints_from_health_entries(&entries);
        if endpoints.is_empty() {
            debug!("No healthy services found with name: {}", service_name);
            return Err(Error::NoInstancesFound(service_name.to_string()));
        }

        debug!(
            "Found {} healthy instances of service: {}",
            endpoints.len(),
            service_name
        );
        Ok(endpoints)
    }

    async fn report_healthy_state(
        &self,
        instance_id: &InstanceId,
        service_name: &ServiceName,
    ) -> Result<(), Error> {
        let url = format!(
            "{}/v1/agent/check/pass/{}",
            self.options.base_url(),
            instance_id
        );

        let response = self
            .client
            .put(&url)
            .send()
            .await
            .map_err(|e| Error::UpstreamUnavailable(format!("HTTP request failed: {}", e)))?;

        match response.status() {
            status if status.is_success() => {
                debug!("TTL health check updated for service: {}", instance_id);
                Ok(())
            }
            // 未知的检查ID，说明实例尚未注册
            StatusCode::NOT_FOUND => Err(Error::NotRegistered {
                instance_id: instance_id.to_string(),
                service_name: service_name.to_string(),
            }),
            _ => Err(Self::error_from_response(response).await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn consul() -> Consul {
        Consul::new(ConsulOptions {
            host: "localhost".to_string(),
            port: 8500,
            protocol: "http".to_string(),
            timeout: 5,
            check_ttl: 5,
        })
    }

    #[test]
    fn registration_installs_ttl_check() {
        let payload = consul().registration_payload(
            &InstanceId::from("rating-42"),
            &ServiceName::from("rating"),
            "localhost",
            8082,
        );
        assert_eq!(payload["ID"], "rating-42");
        assert_eq!(payload["Name"], "rating");
        assert_eq!(payload["Address"], "localhost");
        assert_eq!(payload["Port"], 8082);
        assert_eq!(payload["Check"]["CheckID"], "rating-42");
        assert_eq!(payload["Check"]["TTL"], "5s");
    }

    #[test]
    fn endpoints_fall_back_to_node_address() {
        let entries: Vec<serde_json::Value> = serde_json::from_str(
            r#"[
                {"Node": {"Address": "10.0.0.1"}, "Service": {"ID": "rating-1", "Address": "", "Port": 8082}},
                {"Node": {"Address": "10.0.0.2"}, "Service": {"ID": "rating-2", "Address": "rating.local", "Port": 8083}},
                {"Node": {"Address": "10.0.0.3"}, "Service": {"ID": "broken"}}
            ]"#,
        )
        .unwrap();
        assert_eq!(
            endpoints_from_health_entries(&entries),
            vec!["10.0.0.1:8082".to_string(), "rating.local:8083".to_string()]
        );
    }

    #[tokio::test]
    async fn register_rejects_malformed_address() {
        let result = consul()
            .register(&InstanceId::from("rating-1"), &ServiceName::from("rating"), "rating")
            .await;
        assert!(matches!(result, Err(Error::InvalidAddress(_))));
    }

    #[tokio::test]
    #[ignore = "requires a local Consul agent"]
    async fn register_heartbeat_deregister_should_work() {
        let consul = consul();
        let name = ServiceName::from("rating-test");
        let id = crate::service_register_center::generate_instance_id(&name);

        consul.register(&id, &name, "localhost:18082").await.unwrap();
        consul.report_healthy_state(&id, &name).await.unwrap();

        let endpoints = consul.service_endpoints(&name).await.unwrap();
        assert!(endpoints.contains(&"localhost:18082".to_string()));

        consul.deregister(&id, &name).await.unwrap();
        consul.deregister(&id, &name).await.unwrap();
    }
}
