use anyhow::Result;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::types::{Config, ReportMode};

pub const DEFAULT_LOGS_DIR: &str = "komlogs";

/// Trait for abstracting environment variable access
pub trait EnvironmentProvider {
    fn get_var(&self, key: &str) -> Option<String>;
}

/// Production implementation using std::env
pub struct SystemEnvironment;

impl EnvironmentProvider for SystemEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// In-memory environment for tests
#[derive(Debug, Default)]
pub struct MockEnvironment {
    vars: HashMap<String, String>,
}

impl MockEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_var<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl EnvironmentProvider for MockEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

pub fn load_config() -> Result<Config> {
    load_config_with_env(&SystemEnvironment)
}

pub fn load_config_with_env<E: EnvironmentProvider>(env: &E) -> Result<Config> {
    let namespace = env
        .get_var("KOM_NAMESPACE")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let report_mode = ReportMode {
        include_labels: bool_var(env, "KOM_INCLUDE_LABELS", true),
        per_container: bool_var(env, "KOM_PER_CONTAINER", true),
        track_attention: bool_var(env, "KOM_TRACK_ATTENTION", true),
    };

    let logs_dir = env
        .get_var("KOM_LOGS_DIR")
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOGS_DIR));

    let fail_if_no_metrics = bool_var(env, "KOM_FAIL_IF_NO_METRICS", false);

    Ok(Config {
        namespace,
        report_mode,
        logs_dir,
        fail_if_no_metrics,
    })
}

fn bool_var<E: EnvironmentProvider>(env: &E, key: &str, default: bool) -> bool {
    env.get_var(key)
        .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "True"))
        .unwrap_or(default)
}
