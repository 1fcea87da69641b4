//! Assembly of node and pod utilization reports.
//!
//! Entities are processed one at a time in inventory order. A failure for one entity never
//! aborts the pass: metrics failures route the entity into the attention set, and a pod whose
//! hosting node cannot be resolved is logged and skipped.

pub mod attention;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::{ProviderError, UtilizationError};
use crate::inventory::InventoryProvider;
use crate::metrics::MetricsProvider;
use crate::types::{
    NodeInfo, PodInfo, ReportMode, Severity, UsageSample, UtilizationResult,
};

pub use attention::{AttentionEntry, AttentionSet};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeRow {
    pub name: String,
    pub addresses: Vec<String>,
    pub pod_count: usize,
    pub utilization: UtilizationResult,
    pub unschedulable: bool,
    /// `key=value` pairs, present only when labels are requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    pub has_taints: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PodRow {
    pub namespace: String,
    pub pod: String,
    pub ip: Option<String>,
    pub node: String,
    /// `None` for whole-pod rows.
    pub container: Option<String>,
    pub utilization: UtilizationResult,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NodeReport {
    pub kubernetes_version: String,
    pub rows: Vec<NodeRow>,
    pub attention: AttentionSet,
    pub skipped: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PodReport {
    pub rows: Vec<PodRow>,
    pub attention: AttentionSet,
    pub skipped: usize,
}

impl NodeReport {
    pub fn summary(&self) -> ReportSummary {
        ReportSummary::tally(
            self.rows.iter().map(|r| &r.utilization),
            self.attention.len(),
            self.skipped,
        )
    }
}

impl PodReport {
    pub fn summary(&self) -> ReportSummary {
        ReportSummary::tally(
            self.rows.iter().map(|r| &r.utilization),
            self.attention.len(),
            self.skipped,
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub rows: usize,
    pub attention: usize,
    pub skipped: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl ReportSummary {
    fn tally<'a, I>(results: I, attention: usize, skipped: usize) -> Self
    where
        I: IntoIterator<Item = &'a UtilizationResult>,
    {
        let mut summary = Self { attention, skipped, ..Self::default() };
        for result in results {
            summary.rows += 1;
            match result.severity {
                Severity::High => summary.high += 1,
                Severity::Medium => summary.medium += 1,
                Severity::Low => summary.low += 1,
            }
        }
        summary
    }

    pub fn needs_attention(&self) -> bool {
        self.high > 0 || self.attention > 0
    }
}

#[derive(Debug, Error)]
enum EntityFailure {
    #[error("hosting node unavailable: {0}")]
    NodeResolution(#[source] ProviderError),
    #[error("metrics unavailable: {0}")]
    Metrics(#[source] ProviderError),
    #[error(transparent)]
    Utilization(#[from] UtilizationError),
}

pub struct ReportAssembler<'a, I: ?Sized, M: ?Sized> {
    inventory: &'a I,
    metrics: &'a M,
    mode: ReportMode,
}

impl<'a, I, M> ReportAssembler<'a, I, M>
where
    I: InventoryProvider + ?Sized,
    M: MetricsProvider + ?Sized,
{
    pub fn new(inventory: &'a I, metrics: &'a M, mode: ReportMode) -> Self {
        Self { inventory, metrics, mode }
    }

    pub async fn node_report(&self, kubernetes_version: String, nodes: &[NodeInfo]) -> NodeReport {
        let mut report = NodeReport {
            kubernetes_version,
            ..NodeReport::default()
        };

        for node in nodes {
            match self.node_row(node).await {
                Ok(row) => {
                    debug!(node = %node.name, severity = ?row.utilization.severity, "node row");
                    report.rows.push(row);
                }
                Err(failure) => {
                    warn!(node = %node.name, "routing node to attention report: {}", failure);
                    report.attention.record(AttentionEntry::for_node(node, failure));
                }
            }
        }

        report
    }

    pub async fn pod_report(&self, pods: &[PodInfo]) -> PodReport {
        let mut report = PodReport::default();

        for pod in pods {
            match self.pod_rows(pod).await {
                Ok(rows) => {
                    debug!(namespace = %pod.namespace, pod = %pod.name, rows = rows.len(), "pod rows");
                    report.rows.extend(rows);
                }
                Err(failure @ EntityFailure::NodeResolution(_)) => {
                    warn!(namespace = %pod.namespace, pod = %pod.name, "skipping pod: {}", failure);
                    report.skipped += 1;
                }
                Err(failure) => {
                    warn!(namespace = %pod.namespace, pod = %pod.name, "routing pod to attention report: {}", failure);
                    report.attention.record(AttentionEntry::for_pod(pod, failure));
                }
            }
        }

        report
    }

    async fn node_row(&self, node: &NodeInfo) -> Result<NodeRow, EntityFailure> {
        let sample = self
            .metrics
            .node_usage(&node.name)
            .await
            .map_err(EntityFailure::Metrics)?;
        let utilization = UtilizationResult::from_sample(&sample, &node.capacity)?;

        let pod_count = match self.inventory.count_pods_on_node(&node.name).await {
            Ok(count) => count,
            Err(e) => {
                warn!(node = %node.name, "error getting pods on node: {}", e);
                0
            }
        };

        let labels = self.mode.include_labels.then(|| {
            node.labels
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect()
        });

        Ok(NodeRow {
            name: node.name.clone(),
            addresses: node.addresses.clone(),
            pod_count,
            utilization,
            unschedulable: node.unschedulable,
            labels,
            has_taints: node.has_taints,
        })
    }

    async fn pod_rows(&self, pod: &PodInfo) -> Result<Vec<PodRow>, EntityFailure> {
        let node_name = pod.node_name.as_deref().ok_or_else(|| {
            EntityFailure::NodeResolution(ProviderError::Unscheduled {
                pod: format!("{}/{}", pod.namespace, pod.name),
            })
        })?;
        let capacity = self
            .inventory
            .get_node(node_name)
            .await
            .map_err(EntityFailure::NodeResolution)?
            .capacity;

        let containers = self
            .metrics
            .pod_usage(&pod.namespace, &pod.name)
            .await
            .map_err(EntityFailure::Metrics)?;
        if containers.is_empty() {
            return Err(EntityFailure::Metrics(ProviderError::MissingUsage {
                entity: format!("{}/{}", pod.namespace, pod.name),
                resource: "container",
            }));
        }

        let samples: Vec<(Option<String>, UsageSample)> = if self.mode.per_container {
            containers
                .into_iter()
                .map(|c| (Some(c.name), c.usage))
                .collect()
        } else {
            vec![(None, UsageSample::total(containers.iter().map(|c| &c.usage)))]
        };

        samples
            .into_iter()
            .map(|(container, sample)| {
                Ok(PodRow {
                    namespace: pod.namespace.clone(),
                    pod: pod.name.clone(),
                    ip: pod.ip.clone(),
                    node: node_name.to_string(),
                    container,
                    utilization: UtilizationResult::from_sample(&sample, &capacity)?,
                })
            })
            .collect()
    }
}
