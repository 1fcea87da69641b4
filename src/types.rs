use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

/// Point-in-time resource consumption of a node, pod or container.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UsageSample {
    pub cpu_millicores: u64,
    pub memory_bytes: u64,
}

impl UsageSample {
    pub fn new(cpu_millicores: u64, memory_bytes: u64) -> Self {
        Self { cpu_millicores, memory_bytes }
    }

    /// Sums samples, saturating instead of wrapping.
    pub fn total<'a, I>(samples: I) -> Self
    where
        I: IntoIterator<Item = &'a UsageSample>,
    {
        samples.into_iter().fold(Self::default(), |acc, s| Self {
            cpu_millicores: acc.cpu_millicores.saturating_add(s.cpu_millicores),
            memory_bytes: acc.memory_bytes.saturating_add(s.memory_bytes),
        })
    }
}

/// Memory denominator for utilization. For pods this is the hosting node's capacity,
/// not the pod's own limit.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CapacityReference {
    pub memory_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UtilizationResult {
    pub cpu_percent: u64,
    pub memory_percent: u64,
    pub cpu_severity: Severity,
    pub memory_severity: Severity,
    /// Worst of the two dimensions.
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeInfo {
    pub name: String,
    pub addresses: Vec<String>,
    pub capacity: CapacityReference,
    pub cpu_capacity_millicores: Option<u64>,
    pub labels: BTreeMap<String, String>,
    pub has_taints: bool,
    pub unschedulable: bool,
    /// `Ready`, `NotReady` or `Unknown`.
    pub condition: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PodInfo {
    pub name: String,
    pub namespace: String,
    pub ip: Option<String>,
    pub node_name: Option<String>,
    pub phase: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContainerUsage {
    pub name: String,
    pub usage: UsageSample,
}

/// Which optional parts of a report are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportMode {
    pub include_labels: bool,
    pub per_container: bool,
    pub track_attention: bool,
}

impl Default for ReportMode {
    fn default() -> Self {
        Self {
            include_labels: true,
            per_container: true,
            track_attention: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub namespace: Option<String>,
    pub report_mode: ReportMode,
    pub logs_dir: PathBuf,
    pub fail_if_no_metrics: bool,
}
