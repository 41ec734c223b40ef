use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::assign::assign_objects;
use super::mapping_model::{MappingState, ObjectMapping};
use crate::anchors::AnchorStore;
use crate::catalog::ModelCatalog;

/// Number of distinct anchors needed before mapping starts.
pub const DEFAULT_ACTIVATION_THRESHOLD: usize = 5;

/// Threshold-activated state machine holding the current assignment.
#[derive(Debug)]
pub struct MappingEngine {
    state: MappingState,
    threshold: usize,
    current: Vec<ObjectMapping>,
    rng: StdRng,
}

impl MappingEngine {
    /// Creates an idle engine seeded from OS entropy.
    pub fn new(threshold: usize) -> Self {
        Self::with_rng(threshold, StdRng::from_entropy())
    }

    /// Creates an idle engine with a caller-supplied generator.
    pub fn with_rng(threshold: usize, rng: StdRng) -> Self {
        Self {
            state: MappingState::Idle,
            threshold,
            current: Vec::new(),
            rng,
        }
    }

    pub fn state(&self) -> MappingState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == MappingState::Active
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// The latest assignment. Empty while idle.
    pub fn current(&self) -> &[ObjectMapping] {
        &self.current
    }

    /// Checks the anchor count against the threshold after an upsert.
    ///
    /// Returns `true` exactly once: on the call that moves the engine from
    /// `Idle` to `Active`. That call also performs the initial assignment.
    /// Once active, anchor arrivals leave the current assignment untouched.
    pub fn observe(&mut self, anchors: &AnchorStore, catalog: &ModelCatalog) -> bool {
        if self.is_active() || anchors.count() < self.threshold {
            return false;
        }

        info!(
            "Dynamic mapping activated: {} anchors reached threshold {}",
            anchors.count(),
            self.threshold
        );
        self.state = MappingState::Active;
        self.assign(anchors, catalog, "initial");
        true
    }

    /// Recomputes the assignment from the current anchors and catalog.
    ///
    /// Callers only reshuffle an active engine; an idle one is left alone and
    /// `None` is returned.
    pub fn reassign(
        &mut self,
        anchors: &AnchorStore,
        catalog: &ModelCatalog,
    ) -> Option<&[ObjectMapping]> {
        if !self.is_active() {
            return None;
        }
        self.assign(anchors, catalog, "reshuffle");
        Some(self.current.as_slice())
    }

    fn assign(&mut self, anchors: &AnchorStore, catalog: &ModelCatalog, reason: &str) {
        self.current = assign_objects(&anchors.keys(), catalog.list(), &mut self.rng);
        info!(
            "Mapping {} produced {} assignments from {} models",
            reason,
            self.current.len(),
            catalog.len()
        );
        for mapping in &self.current {
            info!(
                "  {} -> {} ({})",
                mapping.node_id, mapping.object_name, mapping.object_url
            );
        }
    }
}
