use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::service_register_center::typos::{
    parse_host_port, InstanceId, ServiceInstance, ServiceName,
};
use crate::service_register_center::ServiceRegister;
use crate::Error;

/// 默认存活窗口
pub const DEFAULT_STALENESS_WINDOW: Duration = Duration::from_secs(5);

type Instances = HashMap<InstanceId, ServiceInstance>;

/// 进程内服务注册中心
///
/// 不主动探测实例健康，完全依赖实例上报的心跳；
/// 失活实例不会被自动删除，只在查询时被过滤
#[derive(Debug)]
pub struct MemoryRegistry {
    services: RwLock<HashMap<ServiceName, Instances>>,
    staleness_window: Duration,
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::with_staleness_window(DEFAULT_STALENESS_WINDOW)
    }

    pub fn with_staleness_window(staleness_window: Duration) -> Self {
        Self {
            services: RwLock::new(HashMap::new()),
            staleness_window,
        }
    }
}

#[async_trait]
impl ServiceRegister for MemoryRegistry {
    async fn register(
        &self,
        instance_id: &InstanceId,
        service_name: &ServiceName,
        host_port: &str,
    ) -> Result<(), Error> {
        parse_host_port(host_port)?;

        let instance = ServiceInstance {
            service_name: service_name.clone(),
            instance_id: instance_id.clone(),
            host_port: host_port.to_string(),
            last_active: Instant::now(),
        };
        self.services
            .write()
            .entry(service_name.clone())
            .or_default()
            .insert(instance_id.clone(), instance);

        info!(%service_name, %instance_id, host_port, "服务实例已注册");
        Ok(())
    }

    async fn deregister(
        &self,
        instance_id: &InstanceId,
        service_name: &ServiceName,
    ) -> Result<(), Error> {
        let removed = self
            .services
            .write()
            .get_mut(service_name)
            .and_then(|instances| instances.remove(instance_id));

        if removed.is_some() {
            info!(%service_name, %instance_id, "服务实例已注销");
        } else {
            debug!(%service_name, %instance_id, "注销的服务实例不存在");
        }
        Ok(())
    }

    async fn service_endpoints(&self, service_name: &ServiceName) -> Result<Vec<String>, Error> {
        let now = Instant::now();
        let endpoints: Vec<String> = {
            let services = self.services.read();
            services
                .get(service_name)
                .map(|instances| {
                    instances
                        .values()
                        .filter(|instance| {
                            let live = instance.is_live(now, self.staleness_window);
                            if !live {
                                debug!(
                                    %service_name,
                                    instance_id = %instance.instance_id,
                                    "实例已失活，跳过"
                                );
                            }
                            live
                        })
                        .map(|instance| instance.host_port.clone())
                        .collect()
                })
                .unwrap_or_default()
        };

        if endpoints.is_empty() {
            return Err(Error::NoInstancesFound(service_name.to_string()));
        }
        Ok(endpoints)
    }

    async fn report_healthy_state(
        &self,
        instance_id: &InstanceId,
        service_name: &ServiceName,
    ) -> Result<(), Error> {
        let mut services = self.services.write();
        let instance = services
            .get_mut(service_name)
            .and_then(|instances| instances.get_mut(instance_id))
            .ok_or_else(|| Error::NotRegistered {
                instance_id: instance_id.to_string(),
                service_name: service_name.to_string(),
            })?;
        instance.last_active = Instant::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn rating() -> ServiceName {
        ServiceName::from("rating")
    }

    #[tokio::test(start_paused = true)]
    async fn registered_instance_is_listed() {
        let registry = MemoryRegistry::new();
        let id = InstanceId::from("rating-1");
        registry.register(&id, &rating(), "localhost:8082").await.unwrap();

        let endpoints = registry.service_endpoints(&rating()).await.unwrap();
        assert_eq!(endpoints, vec!["localhost:8082".to_string()]);
    }

    #[tokio::test]
    async fn register_rejects_malformed_address() {
        let registry = MemoryRegistry::new();
        let result = registry
            .register(&InstanceId::from("rating-1"), &rating(), "localhost")
            .await;
        assert!(matches!(result, Err(Error::InvalidAddress(_))));
        assert!(matches!(
            registry.service_endpoints(&rating()).await,
            Err(Error::NoInstancesFound(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn heartbeats_keep_instance_live() {
        let registry = MemoryRegistry::new();
        let id = InstanceId::from("rating-1");
        registry.register(&id, &rating(), "localhost:8082").await.unwrap();

        // 每秒一次心跳，持续超过一个存活窗口
        for _ in 0..10 {
            tokio::time::advance(Duration::from_secs(1)).await;
            registry.report_healthy_state(&id, &rating()).await.unwrap();
            assert_eq!(registry.service_endpoints(&rating()).await.unwrap().len(), 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stale_instance_is_filtered_without_deregistration() {
        let registry = MemoryRegistry::new();
        let stale = InstanceId::from("rating-1");
        let fresh = InstanceId::from("rating-2");
        registry.register(&stale, &rating(), "localhost:8082").await.unwrap();
        registry.register(&fresh, &rating(), "localhost:8083").await.unwrap();

        tokio::time::advance(Duration::from_secs(3)).await;
        registry.report_healthy_state(&fresh, &rating()).await.unwrap();
        tokio::time::advance(Duration::from_secs(3)).await;

        let endpoints = registry.service_endpoints(&rating()).await.unwrap();
        assert_eq!(endpoints, vec!["localhost:8083".to_string()]);

        // 失活实例依然存在，仍然可以恢复心跳
        registry.report_healthy_state(&stale, &rating()).await.unwrap();
        assert_eq!(registry.service_endpoints(&rating()).await.unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn fully_stale_service_has_no_instances() {
        let registry = MemoryRegistry::new();
        let id = InstanceId::from("rating-1");
        registry.register(&id, &rating(), "localhost:8082").await.unwrap();

        tokio::time::advance(DEFAULT_STALENESS_WINDOW).await;
        assert!(matches!(
            registry.service_endpoints(&rating()).await,
            Err(Error::NoInstancesFound(_))
        ));
    }

    #[tokio::test]
    async fn unknown_service_has_no_instances() {
        let registry = MemoryRegistry::new();
        assert!(matches!(
            registry.service_endpoints(&ServiceName::from("metadata")).await,
            Err(Error::NoInstancesFound(_))
        ));
    }

    #[tokio::test]
    async fn heartbeat_for_unknown_instance_fails() {
        let registry = MemoryRegistry::new();
        let id = InstanceId::from("rating-1");
        let result = registry.report_healthy_state(&id, &rating()).await;
        assert!(matches!(result, Err(Error::NotRegistered { .. })));

        registry.register(&id, &rating(), "localhost:8082").await.unwrap();
        let other = InstanceId::from("rating-2");
        let result = registry.report_healthy_state(&other, &rating()).await;
        assert!(matches!(result, Err(Error::NotRegistered { .. })));
    }

    #[tokio::test]
    async fn deregister_is_idempotent() {
        let registry = MemoryRegistry::new();
        let id = InstanceId::from("rating-1");
        registry.deregister(&id, &rating()).await.unwrap();

        registry.register(&id, &rating(), "localhost:8082").await.unwrap();
        registry.deregister(&id, &rating()).await.unwrap();
        registry.deregister(&id, &rating()).await.unwrap();
        assert!(matches!(
            registry.service_endpoints(&rating()).await,
            Err(Error::NoInstancesFound(_))
        ));
        assert!(matches!(
            registry.report_healthy_state(&id, &rating()).await,
            Err(Error::NotRegistered { .. })
        ));
    }

    #[tokio::test]
    async fn colliding_instance_id_overwrites_only_its_entry() {
        let registry = MemoryRegistry::new();
        let id = InstanceId::from("rating-1");
        let other = InstanceId::from("rating-2");
        registry.register(&id, &rating(), "localhost:8082").await.unwrap();
        registry.register(&other, &rating(), "localhost:8083").await.unwrap();
        registry.register(&id, &rating(), "localhost:9000").await.unwrap();

        let mut endpoints = registry.service_endpoints(&rating()).await.unwrap();
        endpoints.sort();
        assert_eq!(endpoints, vec!["localhost:8083".to_string(), "localhost:9000".to_string()]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_registrations() {
        let registry = Arc::new(MemoryRegistry::new());
        let mut handles = Vec::new();
        for i in 0..32u16 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                let id = InstanceId::new(format!("rating-{i}"));
                registry
                    .register(&id, &rating(), &format!("localhost:{}", 9000 + i))
                    .await
                    .unwrap();
                registry.report_healthy_state(&id, &rating()).await.unwrap();
                registry.service_endpoints(&rating()).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(registry.service_endpoints(&rating()).await.unwrap().len(), 32);
    }
}
