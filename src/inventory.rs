use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Node, Pod};

use crate::error::ProviderError;
use crate::parsing::{parse_cpu_to_millicores, parse_memory_to_bytes};
use crate::types::{CapacityReference, NodeInfo, PodInfo};

const UNSCHEDULABLE_TAINT: &str = "node.kubernetes.io/unschedulable";

/// Static cluster listing consumed by the report pipelines.
#[async_trait]
pub trait InventoryProvider: Send + Sync {
    async fn server_version(&self) -> Result<String, ProviderError>;

    async fn list_nodes(&self) -> Result<Vec<NodeInfo>, ProviderError>;

    /// Pods of one namespace, or of every namespace when `namespace` is `None`.
    async fn list_pods(&self, namespace: Option<&str>) -> Result<Vec<PodInfo>, ProviderError>;

    async fn get_node(&self, name: &str) -> Result<NodeInfo, ProviderError>;

    async fn count_pods_on_node(&self, name: &str) -> Result<usize, ProviderError>;
}

/// Builds a `NodeInfo`; nodes without a name are skipped.
pub fn node_info_from(node: &Node) -> Option<NodeInfo> {
    let name = node.metadata.name.clone()?;
    let status = node.status.as_ref();
    let capacity = status.and_then(|s| s.capacity.as_ref());

    let memory_bytes = capacity
        .and_then(|c| c.get("memory"))
        .and_then(|q| parse_memory_to_bytes(&q.0))
        .unwrap_or(0);
    let cpu_capacity_millicores = capacity
        .and_then(|c| c.get("cpu"))
        .and_then(|q| parse_cpu_to_millicores(&q.0));

    let addresses = status
        .and_then(|s| s.addresses.as_ref())
        .map(|addrs| {
            addrs
                .iter()
                .filter(|a| a.type_ == "InternalIP" || a.type_ == "ExternalIP")
                .map(|a| a.address.clone())
                .collect()
        })
        .unwrap_or_default();

    let taints = node.spec.as_ref().and_then(|s| s.taints.as_ref());
    let has_taints = taints.map(|t| !t.is_empty()).unwrap_or(false);
    let cordoned = node
        .spec
        .as_ref()
        .and_then(|s| s.unschedulable)
        .unwrap_or(false);
    let unschedulable = cordoned
        || taints
            .map(|t| t.iter().any(|t| t.key == UNSCHEDULABLE_TAINT))
            .unwrap_or(false);

    Some(NodeInfo {
        name,
        addresses,
        capacity: CapacityReference { memory_bytes },
        cpu_capacity_millicores,
        labels: node.metadata.labels.clone().unwrap_or_default(),
        has_taints,
        unschedulable,
        condition: ready_condition(node),
    })
}

fn ready_condition(node: &Node) -> String {
    let ready = node
        .status
        .as_ref()
        .and_then(|s| s.conditions.as_ref())
        .and_then(|conditions| conditions.iter().find(|c| c.type_ == "Ready"));
    match ready.map(|c| c.status.as_str()) {
        Some("True") => "Ready".to_string(),
        Some(_) => "NotReady".to_string(),
        None => "Unknown".to_string(),
    }
}

/// Builds a `PodInfo`; pods without a name are skipped.
pub fn pod_info_from(pod: &Pod) -> Option<PodInfo> {
    let name = pod.metadata.name.clone()?;
    let status = pod.status.as_ref();
    Some(PodInfo {
        name,
        namespace: pod.metadata.namespace.clone().unwrap_or_default(),
        ip: status.and_then(|s| s.pod_ip.clone()),
        node_name: pod
            .spec
            .as_ref()
            .and_then(|s| s.node_name.clone())
            .filter(|n| !n.is_empty()),
        phase: status
            .and_then(|s| s.phase.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
    })
}
