use kube::Client;

use super::base::{get_metrics_http, sample_from_usage, PodMetricsItem};
use crate::error::ProviderError;
use crate::types::ContainerUsage;

pub async fn get_pod_usage(
    client: &Client,
    namespace: &str,
    pod: &str,
) -> Result<Vec<ContainerUsage>, ProviderError> {
    let path = format!("/namespaces/{}/pods/{}", namespace, pod);
    let item: PodMetricsItem = get_metrics_http(client, &path).await?;
    container_usages(namespace, pod, &item)
}

fn container_usages(
    namespace: &str,
    pod: &str,
    item: &PodMetricsItem,
) -> Result<Vec<ContainerUsage>, ProviderError> {
    item.containers
        .iter()
        .map(|c| {
            let entity = format!("{}/{}[{}]", namespace, pod, c.name);
            Ok(ContainerUsage {
                name: c.name.clone(),
                usage: sample_from_usage(&entity, &c.usage)?,
            })
        })
        .collect()
}
