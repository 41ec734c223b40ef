//! The relay hub: one owned service object for all shared session state.
//!
//! Connection registry, anchor store, model catalog and mapping engine live
//! behind a single mutex. Every public operation takes the lock once and
//! finishes its whole read-modify-broadcast step before releasing it, so the
//! reshuffle timer and inbound frames never observe each other half-done.
//! The lock is never held across an `.await`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{error, info};
use serde::Serialize;

use crate::anchors::{AnchorRecord, AnchorStore};
use crate::catalog::{ModelCatalog, ModelDescriptor};
use crate::mapping::{MappingEngine, MappingState, ObjectMapping, DEFAULT_ACTIVATION_THRESHOLD};
use crate::protocol::OutboundMessage;
use crate::registry::{ConnectionId, ConnectionRegistry, Frame, FrameReceiver};

/// Tunables for the mapping engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HubSettings {
    pub activation_threshold: usize,
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            activation_threshold: DEFAULT_ACTIVATION_THRESHOLD,
        }
    }
}

/// Point-in-time summary of the hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HubStatus {
    pub connections: usize,
    pub anchors: usize,
    pub catalog_size: usize,
    pub mapping_state: MappingState,
    pub mapped_nodes: usize,
}

/// What happened when an anchor was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorOutcome {
    pub total_anchors: usize,
    /// True only for the upsert that moved the engine to `Active`.
    pub activated: bool,
}

/// What happened when a model load failure was reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadFailureOutcome {
    pub removed: bool,
    pub reshuffled: bool,
}

struct HubState {
    registry: ConnectionRegistry,
    anchors: AnchorStore,
    catalog: ModelCatalog,
    engine: MappingEngine,
}

impl HubState {
    /// The single reshuffle path shared by the timer and load failures.
    fn reassign(&mut self) -> bool {
        if self.engine.reassign(&self.anchors, &self.catalog).is_none() {
            return false;
        }
        self.broadcast_mappings();
        true
    }

    fn broadcast_mappings(&mut self) {
        let message = OutboundMessage::object_mapping(self.engine.current());
        match message.to_frame() {
            Ok(text) => {
                let frame: Frame = Arc::from(text);
                let delivered = self.registry.broadcast_all(&frame);
                info!("Sent mapping update to {} clients", delivered);
            }
            Err(e) => error!("Failed to serialize mapping update: {}", e),
        }
    }
}

pub struct RelayHub {
    state: Mutex<HubState>,
}

impl RelayHub {
    pub fn new(seed: Vec<ModelDescriptor>, settings: HubSettings) -> Self {
        Self::with_engine(seed, MappingEngine::new(settings.activation_threshold))
    }

    /// Builds a hub around a pre-configured engine, e.g. one with a seeded RNG.
    pub fn with_engine(seed: Vec<ModelDescriptor>, engine: MappingEngine) -> Self {
        Self {
            state: Mutex::new(HubState {
                registry: ConnectionRegistry::new(),
                anchors: AnchorStore::new(),
                catalog: ModelCatalog::new(seed),
                engine,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a new client and returns the channel its frames arrive on.
    pub fn connect(&self) -> (ConnectionId, FrameReceiver) {
        self.lock().registry.open()
    }

    pub fn disconnect(&self, id: ConnectionId) {
        self.lock().registry.unregister(id);
    }

    /// Stops broadcasting to a client that has started closing.
    pub fn mark_closing(&self, id: ConnectionId) {
        self.lock().registry.mark_closing(id);
    }

    /// Forwards a frame verbatim to every live client except its sender.
    pub fn relay(&self, sender: ConnectionId, text: &str) -> usize {
        let frame: Frame = Arc::from(text);
        self.lock().registry.broadcast_except(sender, &frame)
    }

    /// Stores an anchor and activates mapping once the threshold is reached.
    pub fn record_anchor(&self, record: AnchorRecord) -> AnchorOutcome {
        let mut state = self.lock();
        let state = &mut *state;

        let total_anchors = state.anchors.upsert(record);
        info!("Stored node data. Total stored nodes: {}", total_anchors);

        let activated = state.engine.observe(&state.anchors, &state.catalog);
        if activated {
            state.broadcast_mappings();
        }
        AnchorOutcome {
            total_anchors,
            activated,
        }
    }

    /// Drops the failing model from the catalog and, if mapping is active,
    /// reshuffles immediately.
    pub fn report_load_failure(&self, url: &str) -> LoadFailureOutcome {
        let mut state = self.lock();
        let removed = state.catalog.remove_by_url(url);
        let reshuffled = if state.engine.is_active() {
            info!("Reshuffling mappings due to model load error");
            state.reassign()
        } else {
            false
        };
        LoadFailureOutcome {
            removed,
            reshuffled,
        }
    }

    /// Timer entry point. Returns whether a new assignment was broadcast.
    pub fn reshuffle(&self) -> bool {
        self.lock().reassign()
    }

    pub fn status(&self) -> HubStatus {
        let state = self.lock();
        HubStatus {
            connections: state.registry.len(),
            anchors: state.anchors.count(),
            catalog_size: state.catalog.len(),
            mapping_state: state.engine.state(),
            mapped_nodes: state.engine.current().len(),
        }
    }

    pub fn mapping_state(&self) -> MappingState {
        self.lock().engine.state()
    }

    pub fn anchors(&self) -> Vec<AnchorRecord> {
        self.lock().anchors.records()
    }

    pub fn anchor(&self, node_id: &str) -> Option<AnchorRecord> {
        self.lock().anchors.get(node_id).cloned()
    }

    pub fn catalog(&self) -> Vec<ModelDescriptor> {
        self.lock().catalog.list().to_vec()
    }

    pub fn mappings(&self) -> Vec<ObjectMapping> {
        self.lock().engine.current().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn seed() -> Vec<ModelDescriptor> {
        ["a", "b", "c"]
            .iter()
            .map(|id| ModelDescriptor::new(*id, id.to_uppercase(), format!("https://assets.test/{id}.glb")))
            .collect()
    }

    fn hub() -> RelayHub {
        RelayHub::with_engine(seed(), MappingEngine::with_rng(5, StdRng::seed_from_u64(5)))
    }

    fn drain(rx: &mut FrameReceiver) -> Vec<String> {
        let mut frames = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            frames.push(frame.to_string());
        }
        frames
    }

    fn decode(frame: &str) -> Vec<ObjectMapping> {
        match serde_json::from_str::<OutboundMessage>(frame).unwrap() {
            OutboundMessage::ObjectMapping { mappings, .. } => mappings,
        }
    }

    #[test]
    fn test_activation_broadcasts_to_everyone() {
        let hub = hub();
        let (_a, mut rx_a) = hub.connect();
        let (_b, mut rx_b) = hub.connect();

        for i in 1..=4 {
            let outcome = hub.record_anchor(AnchorRecord::new(format!("n{i}"), "cube", i));
            assert!(!outcome.activated);
        }
        assert_eq!(hub.mapping_state(), MappingState::Idle);
        assert!(drain(&mut rx_a).is_empty());

        let outcome = hub.record_anchor(AnchorRecord::new("n5", "cube", 5));
        assert_eq!(
            outcome,
            AnchorOutcome {
                total_anchors: 5,
                activated: true
            }
        );

        let frames_a = drain(&mut rx_a);
        let frames_b = drain(&mut rx_b);
        assert_eq!(frames_a.len(), 1);
        assert_eq!(frames_a, frames_b);
        let nodes: HashSet<_> = decode(&frames_a[0]).into_iter().map(|m| m.node_id).collect();
        assert_eq!(nodes.len(), 5);
    }

    #[test]
    fn test_load_failure_while_idle_only_shrinks_catalog() {
        let hub = hub();
        let (_a, mut rx_a) = hub.connect();
        let outcome = hub.report_load_failure("https://assets.test/b.glb");
        assert_eq!(
            outcome,
            LoadFailureOutcome {
                removed: true,
                reshuffled: false
            }
        );
        assert_eq!(hub.catalog().len(), 2);
        assert!(drain(&mut rx_a).is_empty());
    }

    #[test]
    fn test_load_failure_while_active_reshuffles_without_removed_model() {
        let hub = hub();
        let (_a, mut rx_a) = hub.connect();
        for i in 1..=5 {
            hub.record_anchor(AnchorRecord::new(format!("n{i}"), "cube", i));
        }
        drain(&mut rx_a);

        let outcome = hub.report_load_failure("https://assets.test/b.glb");
        assert!(outcome.removed && outcome.reshuffled);

        for _ in 0..10 {
            assert!(hub.reshuffle());
        }
        let frames = drain(&mut rx_a);
        assert_eq!(frames.len(), 11);
        for frame in frames {
            let mappings = decode(&frame);
            assert_eq!(mappings.len(), 5);
            assert!(mappings.iter().all(|m| m.object_id != "b"));
        }
    }

    #[test]
    fn test_unknown_url_still_reshuffles_when_active() {
        let hub = hub();
        for i in 1..=5 {
            hub.record_anchor(AnchorRecord::new(format!("n{i}"), "cube", i));
        }
        let outcome = hub.report_load_failure("https://assets.test/zzz.glb");
        assert!(!outcome.removed);
        assert!(outcome.reshuffled);
    }

    #[test]
    fn test_reshuffle_picks_up_late_anchors() {
        let hub = hub();
        for i in 1..=5 {
            hub.record_anchor(AnchorRecord::new(format!("n{i}"), "cube", i));
        }
        let outcome = hub.record_anchor(AnchorRecord::new("n6", "cube", 6));
        assert!(!outcome.activated);
        assert_eq!(hub.mappings().len(), 5);

        assert!(hub.reshuffle());
        assert_eq!(hub.mappings().len(), 6);
    }

    #[test]
    fn test_reshuffle_is_noop_while_idle() {
        let hub = hub();
        assert!(!hub.reshuffle());
        assert!(hub.mappings().is_empty());
    }

    #[test]
    fn test_status_snapshot() {
        let hub = hub();
        let (_a, _rx_a) = hub.connect();
        hub.record_anchor(AnchorRecord::new("n1", "cube", 1));
        assert_eq!(
            hub.status(),
            HubStatus {
                connections: 1,
                anchors: 1,
                catalog_size: 3,
                mapping_state: MappingState::Idle,
                mapped_nodes: 0,
            }
        );
        assert_eq!(hub.anchor("n1").unwrap().node_type, "cube");
        assert!(hub.anchor("n2").is_none());
    }
}
