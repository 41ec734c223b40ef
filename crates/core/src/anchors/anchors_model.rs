//! Anchor domain models.

use serde::{Deserialize, Serialize};

/// A point or scale vector in AR world space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Orientation as a unit quaternion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }
}

/// Local transform of the scene node attached to an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeTransform {
    pub position: Vec3,
    pub rotation: Quaternion,
    pub scale: Vec3,
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self {
            position: Vec3::default(),
            rotation: Quaternion::default(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

/// Latest anchor reported by a client for one scene node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorRecord {
    pub node_id: String,
    pub node_type: String,
    /// Client-side capture time in epoch milliseconds.
    pub timestamp: i64,
    pub anchor_position: Vec3,
    pub anchor_rotation: Quaternion,
    pub node_transform: NodeTransform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_anchor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_anchor_state: Option<String>,
}

impl AnchorRecord {
    /// Creates a record at the origin with identity rotation and unit scale.
    pub fn new(node_id: impl Into<String>, node_type: impl Into<String>, timestamp: i64) -> Self {
        Self {
            node_id: node_id.into(),
            node_type: node_type.into(),
            timestamp,
            anchor_position: Vec3::default(),
            anchor_rotation: Quaternion::default(),
            node_transform: NodeTransform::default(),
            cloud_anchor_id: None,
            cloud_anchor_state: None,
        }
    }

    pub fn is_cloud_anchor(&self) -> bool {
        self.cloud_anchor_id.is_some()
    }
}
