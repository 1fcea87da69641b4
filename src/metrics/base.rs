use std::collections::HashMap;

use kube::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ProviderError;
use crate::parsing::{parse_cpu_to_millicores, parse_memory_to_bytes};
use crate::types::UsageSample;

pub const METRICS_API_PREFIX: &str = "/apis/metrics.k8s.io/v1beta1";

#[derive(Debug, Deserialize)]
pub struct ContainerMetrics {
    pub name: String,
    #[serde(default)]
    pub usage: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct PodMetricsItem {
    pub metadata: serde_json::Value,
    #[serde(default)]
    pub containers: Vec<ContainerMetrics>,
}

#[derive(Debug, Deserialize)]
pub struct NodeMetricsItem {
    pub metadata: serde_json::Value,
    #[serde(default)]
    pub usage: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct MetricsList<T> {
    pub items: Vec<T>,
}

/// GET against the metrics API; `path` is relative to `METRICS_API_PREFIX`.
pub async fn get_metrics_http<T: DeserializeOwned>(
    client: &Client,
    path: &str,
) -> Result<T, ProviderError> {
    use http::Request as HttpRequest;
    let req = HttpRequest::builder()
        .method("GET")
        .uri(format!("{}{}", METRICS_API_PREFIX, path))
        .body(Vec::new())?;
    Ok(client.request(req).await?)
}

/// Reads the `cpu` and `memory` entries of a metrics usage map.
pub fn sample_from_usage(
    entity: &str,
    usage: &HashMap<String, String>,
) -> Result<UsageSample, ProviderError> {
    let cpu = usage.get("cpu").ok_or_else(|| ProviderError::MissingUsage {
        entity: entity.to_string(),
        resource: "cpu",
    })?;
    let memory = usage.get("memory").ok_or_else(|| ProviderError::MissingUsage {
        entity: entity.to_string(),
        resource: "memory",
    })?;

    let invalid = |value: &String| ProviderError::InvalidQuantity {
        entity: entity.to_string(),
        value: value.clone(),
    };
    Ok(UsageSample {
        cpu_millicores: parse_cpu_to_millicores(cpu).ok_or_else(|| invalid(cpu))?,
        memory_bytes: parse_memory_to_bytes(memory).ok_or_else(|| invalid(memory))?,
    })
}
