//! `kom`: node and pod utilization reports and pod log collection.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use kom::config::load_config;
use kom::kubernetes::{ensure_metrics_available, KubeCluster};
use kom::logs::{collect_pod_logs, LogRequest};
use kom::render::{print_node_report, print_pod_report, OutputFormat};
use kom::report::ReportSummary;
use kom::collector::ReportCollector;
use kom::types::Config;

#[derive(Parser)]
#[command(name = "kom")]
#[command(author, version, about = "Kubernetes node and pod utilization reports", long_about = None)]
struct Cli {
    /// Output format
    #[arg(long, short, global = true, env = "KOM_OUTPUT", value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Utilization of every node in the cluster
    Nodes {
        /// Leave out the node labels column
        #[arg(long)]
        no_labels: bool,

        /// Do not report nodes without metrics
        #[arg(long)]
        no_attention: bool,
    },

    /// Utilization of pods, per container unless aggregated
    Pods {
        /// Restrict to a namespace (all namespaces by default)
        #[arg(long, short)]
        namespace: Option<String>,

        /// One row per pod instead of one per container
        #[arg(long)]
        aggregate: bool,

        /// Do not report pods without metrics
        #[arg(long)]
        no_attention: bool,
    },

    /// Fetch the logs of a pod
    Logs {
        /// Pod name
        pod: String,

        #[arg(long, short, default_value = "default")]
        namespace: String,

        /// Container name, for multi-container pods
        #[arg(long, short)]
        container: Option<String>,

        /// Write to a file instead of stdout
        #[arg(long, short)]
        save: bool,

        /// Directory for saved logs (defaults to KOM_LOGS_DIR)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let mut cfg = load_config().context("loading configuration")?;

    let cluster = KubeCluster::try_default()
        .await
        .context("connecting to the Kubernetes API")?;

    match cli.command {
        Commands::Nodes { no_labels, no_attention } => {
            if no_labels {
                cfg.report_mode.include_labels = false;
            }
            if no_attention {
                cfg.report_mode.track_attention = false;
            }
            check_metrics(&cluster, &cfg).await?;

            let report = ReportCollector::new(&cluster, &cluster, &cfg)
                .collect_node_report()
                .await?;
            log_summary("node", &report.summary());
            print_node_report(&report, &cfg.report_mode, cli.output)?;
        }
        Commands::Pods { namespace, aggregate, no_attention } => {
            if namespace.is_some() {
                cfg.namespace = namespace;
            }
            if aggregate {
                cfg.report_mode.per_container = false;
            }
            if no_attention {
                cfg.report_mode.track_attention = false;
            }
            check_metrics(&cluster, &cfg).await?;

            let report = ReportCollector::new(&cluster, &cluster, &cfg)
                .collect_pod_report()
                .await?;
            log_summary("pod", &report.summary());
            print_pod_report(&report, &cfg.report_mode, cli.output)?;
        }
        Commands::Logs { pod, namespace, container, save, dir } => {
            let request = LogRequest { namespace, pod, container };
            let logs = collect_pod_logs(&cluster, &request, Utc::now()).await?;
            if save {
                let dir = dir.unwrap_or_else(|| cfg.logs_dir.clone());
                logs.save(&dir).await?;
            } else {
                logs.display();
            }
        }
    }

    Ok(())
}

// Check metrics API availability early (fail fast if requested)
async fn check_metrics(cluster: &KubeCluster, cfg: &Config) -> Result<()> {
    if cfg.fail_if_no_metrics {
        ensure_metrics_available(cluster).await?;
    }
    Ok(())
}

fn log_summary(kind: &str, summary: &ReportSummary) {
    info!(
        "{} report: {} rows ({} high, {} medium, {} low), {} need attention, {} skipped",
        kind, summary.rows, summary.high, summary.medium, summary.low, summary.attention, summary.skipped
    );
    if summary.needs_attention() {
        warn!("{} report has entries that need attention", kind);
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
