use kube::Client;

use super::base::{get_metrics_http, sample_from_usage, MetricsList, NodeMetricsItem};
use crate::error::ProviderError;
use crate::types::UsageSample;

pub async fn get_node_usage(client: &Client, node: &str) -> Result<UsageSample, ProviderError> {
    let item: NodeMetricsItem = get_metrics_http(client, &format!("/nodes/{}", node)).await?;
    node_sample(node, &item)
}

/// Lists node metrics once; succeeds only if the metrics API is being served.
pub async fn probe_node_metrics(client: &Client) -> Result<usize, ProviderError> {
    let list: MetricsList<NodeMetricsItem> = get_metrics_http(client, "/nodes").await?;
    Ok(list.items.len())
}

fn node_sample(node: &str, item: &NodeMetricsItem) -> Result<UsageSample, ProviderError> {
    sample_from_usage(node, &item.usage)
}
