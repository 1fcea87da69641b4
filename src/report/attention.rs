use std::collections::btree_map::{BTreeMap, Values};

use serde::{Serialize, Serializer};

use crate::types::{NodeInfo, PodInfo};

/// An entity whose inventory entry is valid but whose metrics could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttentionEntry {
    pub name: String,
    /// Empty for cluster-scoped entities.
    pub namespace: String,
    pub node: String,
    pub status: String,
    pub reason: String,
}

impl AttentionEntry {
    pub fn for_node(node: &NodeInfo, reason: impl ToString) -> Self {
        Self {
            name: node.name.clone(),
            namespace: String::new(),
            node: node.name.clone(),
            status: node.condition.clone(),
            reason: reason.to_string(),
        }
    }

    pub fn for_pod(pod: &PodInfo, reason: impl ToString) -> Self {
        Self {
            name: pod.name.clone(),
            namespace: pod.namespace.clone(),
            node: pod.node_name.clone().unwrap_or_default(),
            status: pod.phase.clone(),
            reason: reason.to_string(),
        }
    }
}

/// Attention entries keyed by (namespace, name), iterated in key order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttentionSet {
    entries: BTreeMap<(String, String), AttentionEntry>,
}

impl AttentionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an entry, returning the one it replaced under the same key.
    pub fn record(&mut self, entry: AttentionEntry) -> Option<AttentionEntry> {
        let key = (entry.namespace.clone(), entry.name.clone());
        self.entries.insert(key, entry)
    }

    pub fn get(&self, namespace: &str, name: &str) -> Option<&AttentionEntry> {
        self.entries.get(&(namespace.to_string(), name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> Values<'_, (String, String), AttentionEntry> {
        self.entries.values()
    }
}

impl<'a> IntoIterator for &'a AttentionSet {
    type Item = &'a AttentionEntry;
    type IntoIter = Values<'a, (String, String), AttentionEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for AttentionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.values())
    }
}
