//! Tabular and JSON presentation of reports.

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crate::report::{AttentionSet, NodeReport, NodeRow, PodReport, PodRow};
use crate::types::{ReportMode, Severity};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Coloured tables
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
}

pub fn severity_glyph(severity: Severity) -> &'static str {
    match severity {
        Severity::High => "🟥",
        Severity::Medium => "🟨",
        Severity::Low => "🟩",
    }
}

pub fn colorize_value(value: u64, severity: Severity) -> String {
    let text = value.to_string();
    match severity {
        Severity::High => text.red().to_string(),
        Severity::Medium => text.yellow().to_string(),
        Severity::Low => text.green().to_string(),
    }
}

#[derive(Tabled)]
struct NodeTableRow {
    #[tabled(rename = "Node")]
    name: String,
    #[tabled(rename = "K8s Version")]
    version: String,
    #[tabled(rename = "IP")]
    ips: String,
    #[tabled(rename = "Pod Count")]
    pods: usize,
    #[tabled(rename = "CPU Usage %")]
    cpu: String,
    #[tabled(rename = "Memory Usage %")]
    memory: String,
    #[tabled(rename = "h")]
    health: &'static str,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Labels")]
    labels: String,
    #[tabled(rename = "Taints")]
    taints: &'static str,
}

#[derive(Tabled)]
struct PodTableRow {
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Pod")]
    pod: String,
    #[tabled(rename = "Pod IP")]
    ip: String,
    #[tabled(rename = "Container")]
    container: String,
    #[tabled(rename = "CPU Usage %")]
    cpu: String,
    #[tabled(rename = "Memory Usage %")]
    memory: String,
    #[tabled(rename = "h")]
    health: &'static str,
}

#[derive(Tabled)]
struct AttentionTableRow {
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Node")]
    node: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

fn node_table_row(version: &str, row: &NodeRow) -> NodeTableRow {
    let u = &row.utilization;
    NodeTableRow {
        name: row.name.clone(),
        version: version.to_string(),
        ips: row.addresses.join(", "),
        pods: row.pod_count,
        cpu: colorize_value(u.cpu_percent, u.cpu_severity),
        memory: colorize_value(u.memory_percent, u.memory_severity),
        health: severity_glyph(u.severity),
        status: if row.unschedulable { "NOSchedule" } else { "OK" },
        labels: row.labels.as_ref().map(|l| l.join(", ")).unwrap_or_default(),
        taints: if row.has_taints { "Yes" } else { "No" },
    }
}

fn pod_table_row(row: &PodRow) -> PodTableRow {
    let u = &row.utilization;
    PodTableRow {
        namespace: row.namespace.clone(),
        pod: row.pod.clone(),
        ip: row.ip.clone().unwrap_or_default(),
        container: row.container.clone().unwrap_or_else(|| "-".to_string()),
        cpu: colorize_value(u.cpu_percent, u.cpu_severity),
        memory: colorize_value(u.memory_percent, u.memory_severity),
        health: severity_glyph(u.severity),
    }
}

pub fn render_node_table(report: &NodeReport) -> String {
    let rows: Vec<NodeTableRow> = report
        .rows
        .iter()
        .map(|r| node_table_row(&report.kubernetes_version, r))
        .collect();
    Table::new(rows).with(Style::ascii()).to_string()
}

pub fn render_pod_table(report: &PodReport) -> String {
    let rows: Vec<PodTableRow> = report.rows.iter().map(pod_table_row).collect();
    Table::new(rows).with(Style::ascii()).to_string()
}

/// `None` when there is nothing to show.
pub fn render_attention_table(attention: &AttentionSet) -> Option<String> {
    if attention.is_empty() {
        return None;
    }
    let rows: Vec<AttentionTableRow> = attention
        .iter()
        .map(|e| AttentionTableRow {
            namespace: e.namespace.clone(),
            name: e.name.clone(),
            node: e.node.clone(),
            status: e.status.clone(),
            reason: e.reason.clone(),
        })
        .collect();
    Some(Table::new(rows).with(Style::ascii()).to_string())
}

/// Notice for entities left out of the table because their hosting node could not be resolved.
pub fn render_skipped_notice(skipped: usize) -> Option<String> {
    match skipped {
        0 => None,
        1 => Some("1 entry skipped: hosting node could not be resolved".to_string()),
        n => Some(format!("{} entries skipped: hosting node could not be resolved", n)),
    }
}

fn to_json<T: Serialize>(report: &T, mode: &ReportMode) -> serde_json::Result<String> {
    let mut value = serde_json::to_value(report)?;
    if !mode.track_attention {
        if let Some(object) = value.as_object_mut() {
            object.remove("attention");
        }
    }
    serde_json::to_string_pretty(&value)
}

pub fn print_node_report(
    report: &NodeReport,
    mode: &ReportMode,
    format: OutputFormat,
) -> serde_json::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", to_json(report, mode)?),
        OutputFormat::Table => {
            let table = render_node_table(report);
            println!("{}", with_footer(table, report.skipped, &report.attention, mode));
        }
    }
    Ok(())
}

pub fn print_pod_report(
    report: &PodReport,
    mode: &ReportMode,
    format: OutputFormat,
) -> serde_json::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", to_json(report, mode)?),
        OutputFormat::Table => {
            let table = render_pod_table(report);
            println!("{}", with_footer(table, report.skipped, &report.attention, mode));
        }
    }
    Ok(())
}

/// Main table followed by the skipped notice and, when tracked, the attention table.
fn with_footer(
    mut out: String,
    skipped: usize,
    attention: &AttentionSet,
    mode: &ReportMode,
) -> String {
    if let Some(notice) = render_skipped_notice(skipped) {
        out.push('\n');
        out.push_str(&notice.yellow().to_string());
    }
    if mode.track_attention {
        if let Some(table) = render_attention_table(attention) {
            out.push_str("\n\n");
            out.push_str(&"Needs attention (metrics unavailable)".yellow().bold().to_string());
            out.push('\n');
            out.push_str(&table);
        }
    }
    out
}
