use tracing::info;

use crate::error::ReportError;
use crate::inventory::InventoryProvider;
use crate::metrics::MetricsProvider;
use crate::report::{NodeReport, PodReport, ReportAssembler};
use crate::types::Config;

/// Takes an inventory snapshot and runs one report pass over it.
pub struct ReportCollector<'a, I: ?Sized, M: ?Sized> {
    inventory: &'a I,
    metrics: &'a M,
    config: &'a Config,
}

impl<'a, I, M> ReportCollector<'a, I, M>
where
    I: InventoryProvider + ?Sized,
    M: MetricsProvider + ?Sized,
{
    pub fn new(inventory: &'a I, metrics: &'a M, config: &'a Config) -> Self {
        Self { inventory, metrics, config }
    }

    fn assembler(&self) -> ReportAssembler<'a, I, M> {
        ReportAssembler::new(self.inventory, self.metrics, self.config.report_mode)
    }

    /// Fails only when the node list or server version cannot be fetched.
    pub async fn collect_node_report(&self) -> Result<NodeReport, ReportError> {
        let nodes = self
            .inventory
            .list_nodes()
            .await
            .map_err(|source| ReportError::Inventory { what: "nodes", source })?;
        let version = self
            .inventory
            .server_version()
            .await
            .map_err(|source| ReportError::Inventory { what: "kubernetes version", source })?;
        info!("Collecting node report for {} nodes", nodes.len());

        Ok(self.assembler().node_report(version, &nodes).await)
    }

    /// Fails only when the pod list cannot be fetched.
    pub async fn collect_pod_report(&self) -> Result<PodReport, ReportError> {
        let namespace = self.config.namespace.as_deref();
        let pods = self
            .inventory
            .list_pods(namespace)
            .await
            .map_err(|source| ReportError::Inventory { what: "pods", source })?;
        info!(
            "Collecting pod report for {} pods in {}",
            pods.len(),
            namespace.unwrap_or("all namespaces")
        );

        Ok(self.assembler().pod_report(&pods).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::types::{
        CapacityReference, ContainerUsage, NodeInfo, PodInfo, ReportMode, UsageSample,
    };
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::Mutex;

    struct Unreachable;

    #[async_trait]
    impl InventoryProvider for Unreachable {
        async fn server_version(&self) -> Result<String, ProviderError> {
            Ok("v1.30.0".to_string())
        }
        async fn list_nodes(&self) -> Result<Vec<NodeInfo>, ProviderError> {
            Err(ProviderError::NotFound { kind: "nodes", name: "*".to_string() })
        }
        async fn list_pods(&self, _namespace: Option<&str>) -> Result<Vec<PodInfo>, ProviderError> {
            Err(ProviderError::NotFound { kind: "pods", name: "*".to_string() })
        }
        async fn get_node(&self, name: &str) -> Result<NodeInfo, ProviderError> {
            Err(ProviderError::NotFound { kind: "node", name: name.to_string() })
        }
        async fn count_pods_on_node(&self, _name: &str) -> Result<usize, ProviderError> {
            Ok(0)
        }
    }

    /// One node and one pod; remembers the namespace filter it was asked for.
    #[derive(Default)]
    struct SingleNode {
        requested_namespace: Mutex<Option<Option<String>>>,
    }

    fn worker() -> NodeInfo {
        NodeInfo {
            name: "worker-1".to_string(),
            addresses: Vec::new(),
            capacity: CapacityReference { memory_bytes: 1_000 },
            cpu_capacity_millicores: None,
            labels: Default::default(),
            has_taints: false,
            unschedulable: false,
            condition: "Ready".to_string(),
        }
    }

    #[async_trait]
    impl InventoryProvider for SingleNode {
        async fn server_version(&self) -> Result<String, ProviderError> {
            Ok("v1.30.0".to_string())
        }
        async fn list_nodes(&self) -> Result<Vec<NodeInfo>, ProviderError> {
            Ok(vec![worker()])
        }
        async fn list_pods(&self, namespace: Option<&str>) -> Result<Vec<PodInfo>, ProviderError> {
            *self.requested_namespace.lock().unwrap() = Some(namespace.map(str::to_string));
            Ok(vec![PodInfo {
                name: "api".to_string(),
                namespace: "prod".to_string(),
                ip: None,
                node_name: Some("worker-1".to_string()),
                phase: "Running".to_string(),
            }])
        }
        async fn get_node(&self, _name: &str) -> Result<NodeInfo, ProviderError> {
            Ok(worker())
        }
        async fn count_pods_on_node(&self, _name: &str) -> Result<usize, ProviderError> {
            Ok(1)
        }
    }

    #[async_trait]
    impl MetricsProvider for SingleNode {
        async fn node_usage(&self, _node: &str) -> Result<UsageSample, ProviderError> {
            Ok(UsageSample::new(500, 500))
        }
        async fn pod_usage(
            &self,
            _namespace: &str,
            _pod: &str,
        ) -> Result<Vec<ContainerUsage>, ProviderError> {
            Ok(vec![ContainerUsage { name: "app".to_string(), usage: UsageSample::new(10, 10) }])
        }
    }

    fn config(namespace: Option<&str>) -> Config {
        Config {
            namespace: namespace.map(str::to_string),
            report_mode: ReportMode::default(),
            logs_dir: PathBuf::from("komlogs"),
            fail_if_no_metrics: false,
        }
    }

    #[tokio::test]
    async fn test_inventory_failure_is_fatal() {
        let cfg = config(None);
        let metrics = SingleNode::default();
        let collector = ReportCollector::new(&Unreachable, &metrics, &cfg);

        let err = collector.collect_node_report().await.unwrap_err();
        assert!(matches!(err, ReportError::Inventory { what: "nodes", .. }));

        let err = collector.collect_pod_report().await.unwrap_err();
        assert!(matches!(err, ReportError::Inventory { what: "pods", .. }));
    }

    #[tokio::test]
    async fn test_collects_reports() {
        let cfg = config(Some("prod"));
        let cluster = SingleNode::default();
        let collector = ReportCollector::new(&cluster, &cluster, &cfg);

        let nodes = collector.collect_node_report().await.unwrap();
        assert_eq!(nodes.kubernetes_version, "v1.30.0");
        assert_eq!(nodes.rows.len(), 1);
        assert_eq!(nodes.rows[0].utilization.memory_percent, 50);

        let pods = collector.collect_pod_report().await.unwrap();
        assert_eq!(pods.rows.len(), 1);
        assert_eq!(pods.rows[0].utilization.memory_percent, 1);
        assert_eq!(
            *cluster.requested_namespace.lock().unwrap(),
            Some(Some("prod".to_string()))
        );
    }
}
