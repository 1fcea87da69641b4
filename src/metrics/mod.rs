//! Access to the metrics.k8s.io API.
pub mod base;
pub mod nodes;
pub mod pods;

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::types::{ContainerUsage, UsageSample};

pub use base::{get_metrics_http, sample_from_usage, METRICS_API_PREFIX};
pub use nodes::{get_node_usage, probe_node_metrics};
pub use pods::get_pod_usage;

/// Instantaneous usage samples per entity.
#[async_trait]
pub trait MetricsProvider: Send + Sync {
    async fn node_usage(&self, node: &str) -> Result<UsageSample, ProviderError>;

    /// One sample per container of the pod, in the order the metrics API reports them.
    async fn pod_usage(
        &self,
        namespace: &str,
        pod: &str,
    ) -> Result<Vec<ContainerUsage>, ProviderError>;
}
