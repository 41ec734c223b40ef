//! In-memory anchor store keyed by node id.

use indexmap::IndexMap;
use log::debug;

use super::anchors_model::AnchorRecord;

/// Insertion-ordered map from node id to the latest anchor for that node.
///
/// Re-reporting a known node replaces its record but keeps its original slot,
/// so store order is the order in which nodes were first seen. Records are
/// never evicted.
#[derive(Debug, Default)]
pub struct AnchorStore {
    records: IndexMap<String, AnchorRecord>,
}

impl AnchorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the record for its node id and returns the
    /// resulting number of distinct nodes.
    pub fn upsert(&mut self, record: AnchorRecord) -> usize {
        let node_id = record.node_id.clone();
        if self.records.insert(node_id, record).is_some() {
            debug!("Anchor record replaced in place");
        }
        self.records.len()
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Node ids in store order.
    pub fn keys(&self) -> Vec<String> {
        self.records.keys().cloned().collect()
    }

    pub fn get(&self, node_id: &str) -> Option<&AnchorRecord> {
        self.records.get(node_id)
    }

    /// All records in store order.
    pub fn records(&self) -> Vec<AnchorRecord> {
        self.records.values().cloned().collect()
    }
}
