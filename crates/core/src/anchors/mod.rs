//! Anchors module - anchor records and the in-memory anchor store.

mod anchors_model;
mod anchors_store;

pub use anchors_model::{AnchorRecord, NodeTransform, Quaternion, Vec3};
pub use anchors_store::AnchorStore;
