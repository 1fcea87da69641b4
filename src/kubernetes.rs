use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Node, Pod};
use kube::api::{ListParams, LogParams};
use kube::{Api, Client};
use tracing::info;

use crate::error::ProviderError;
use crate::inventory::{node_info_from, pod_info_from, InventoryProvider};
use crate::logs::{LogSource, LogStream};
use crate::metrics::{get_node_usage, get_pod_usage, probe_node_metrics, MetricsProvider};
use crate::types::{ContainerUsage, NodeInfo, PodInfo, UsageSample};

/// Cluster access through the API server and the metrics.k8s.io aggregation layer.
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn try_default() -> Result<Self, ProviderError> {
        Ok(Self::new(Client::try_default().await?))
    }

    fn nodes(&self) -> Api<Node> {
        Api::all(self.client.clone())
    }

    fn pods(&self, namespace: Option<&str>) -> Api<Pod> {
        match namespace {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        }
    }
}

/// Fails if metrics.k8s.io is not being served.
pub async fn ensure_metrics_available(cluster: &KubeCluster) -> Result<(), ProviderError> {
    let nodes = probe_node_metrics(&cluster.client).await?;
    info!("metrics API available ({} node samples)", nodes);
    Ok(())
}

#[async_trait]
impl InventoryProvider for KubeCluster {
    async fn server_version(&self) -> Result<String, ProviderError> {
        Ok(self.client.apiserver_version().await?.git_version)
    }

    async fn list_nodes(&self) -> Result<Vec<NodeInfo>, ProviderError> {
        let nodes = self.nodes().list(&ListParams::default()).await?;
        Ok(nodes.items.iter().filter_map(node_info_from).collect())
    }

    async fn list_pods(&self, namespace: Option<&str>) -> Result<Vec<PodInfo>, ProviderError> {
        let pods = self.pods(namespace).list(&ListParams::default()).await?;
        Ok(pods.items.iter().filter_map(pod_info_from).collect())
    }

    async fn get_node(&self, name: &str) -> Result<NodeInfo, ProviderError> {
        let node = self.nodes().get(name).await?;
        node_info_from(&node).ok_or_else(|| ProviderError::NotFound {
            kind: "node",
            name: name.to_string(),
        })
    }

    async fn count_pods_on_node(&self, name: &str) -> Result<usize, ProviderError> {
        let lp = ListParams::default().fields(&format!("spec.nodeName={}", name));
        let pods = self.pods(None).list(&lp).await?;
        Ok(pods.items.len())
    }
}

#[async_trait]
impl MetricsProvider for KubeCluster {
    async fn node_usage(&self, node: &str) -> Result<UsageSample, ProviderError> {
        get_node_usage(&self.client, node).await
    }

    async fn pod_usage(
        &self,
        namespace: &str,
        pod: &str,
    ) -> Result<Vec<ContainerUsage>, ProviderError> {
        get_pod_usage(&self.client, namespace, pod).await
    }
}

#[async_trait]
impl LogSource for KubeCluster {
    async fn open_log_stream(
        &self,
        namespace: &str,
        pod: &str,
        container: Option<&str>,
    ) -> Result<LogStream, ProviderError> {
        let params = LogParams {
            container: container.map(str::to_string),
            ..LogParams::default()
        };
        let stream = self.pods(Some(namespace)).log_stream(pod, &params).await?;
        Ok(Box::pin(stream))
    }
}
