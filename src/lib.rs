// Public modules
pub mod types;
pub mod error;
pub mod config;
pub mod parsing;
pub mod utilization;
pub mod inventory;
pub mod metrics;
pub mod kubernetes;
pub mod report;
pub mod collector;
pub mod logs;
pub mod render;

// Re-export commonly used items
pub use types::*;
pub use error::{ProviderError, ReportError, UtilizationError};
pub use config::{load_config, load_config_with_env, EnvironmentProvider, SystemEnvironment, MockEnvironment};
pub use parsing::{parse_cpu_to_millicores, parse_memory_to_bytes};
pub use utilization::{classify, combined_indicator, cpu_percent, memory_percent};
pub use inventory::InventoryProvider;
pub use metrics::MetricsProvider;
pub use kubernetes::{ensure_metrics_available, KubeCluster};
pub use report::{AttentionEntry, AttentionSet, NodeReport, PodReport, ReportAssembler, ReportSummary};
pub use collector::ReportCollector;
pub use logs::{collect_pod_logs, CollectedLogs, LogRequest, LogSource};
pub use render::OutputFormat;
