use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::anchors::{AnchorRecord, NodeTransform, Quaternion, Vec3};
use crate::errors::MessageError;

pub const DEVICE_POSE: &str = "devicePose";
pub const NODE_ANCHOR: &str = "nodeAnchor";
pub const ANCHOR_UPDATE: &str = "anchorUpdate";
pub const MODEL_LOAD_ERROR: &str = "modelLoadError";

/// Discriminant of an inbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    DevicePose,
    NodeAnchor,
    AnchorUpdate,
    ModelLoadError,
    Unknown,
}

impl MessageKind {
    fn from_type(kind: &str) -> Self {
        match kind {
            DEVICE_POSE => MessageKind::DevicePose,
            NODE_ANCHOR => MessageKind::NodeAnchor,
            ANCHOR_UPDATE => MessageKind::AnchorUpdate,
            MODEL_LOAD_ERROR => MessageKind::ModelLoadError,
            _ => MessageKind::Unknown,
        }
    }
}

/// A classified inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    DevicePose {
        selected_node_type: Option<String>,
    },
    NodeAnchor(NodeAnchorPayload),
    AnchorUpdate {
        anchor_id: Option<String>,
    },
    ModelLoadError(ModelLoadErrorPayload),
    Unknown {
        kind: String,
    },
}

impl InboundMessage {
    /// Classifies a text frame.
    ///
    /// Fails when the frame is not a JSON object with a string `type`, or when
    /// a `nodeAnchor` / `modelLoadError` frame is missing required fields.
    pub fn parse(text: &str) -> Result<Self, MessageError> {
        let value: Value = serde_json::from_str(text).map_err(MessageError::InvalidJson)?;
        let Value::Object(object) = value else {
            return Err(MessageError::NotAnObject);
        };
        let kind = match object.get("type") {
            Some(Value::String(kind)) => kind.clone(),
            _ => return Err(MessageError::MissingType),
        };

        let message = match MessageKind::from_type(&kind) {
            MessageKind::DevicePose => InboundMessage::DevicePose {
                selected_node_type: string_field(&object, "selectedNodeType"),
            },
            MessageKind::NodeAnchor => {
                InboundMessage::NodeAnchor(decode(NODE_ANCHOR, Value::Object(object))?)
            }
            MessageKind::AnchorUpdate => InboundMessage::AnchorUpdate {
                anchor_id: string_field(&object, "anchorId"),
            },
            MessageKind::ModelLoadError => {
                InboundMessage::ModelLoadError(decode(MODEL_LOAD_ERROR, Value::Object(object))?)
            }
            MessageKind::Unknown => InboundMessage::Unknown { kind },
        };
        Ok(message)
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            InboundMessage::DevicePose { .. } => MessageKind::DevicePose,
            InboundMessage::NodeAnchor(_) => MessageKind::NodeAnchor,
            InboundMessage::AnchorUpdate { .. } => MessageKind::AnchorUpdate,
            InboundMessage::ModelLoadError(_) => MessageKind::ModelLoadError,
            InboundMessage::Unknown { .. } => MessageKind::Unknown,
        }
    }
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_owned)
}

fn decode<T: DeserializeOwned>(kind: &'static str, value: Value) -> Result<T, MessageError> {
    serde_json::from_value(value).map_err(|source| MessageError::InvalidPayload { kind, source })
}

/// Flat anchor report as sent by the AR client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeAnchorPayload {
    pub timestamp: i64,
    pub node_id: String,
    pub node_type: String,
    pub anchor_position_x: f64,
    pub anchor_position_y: f64,
    pub anchor_position_z: f64,
    pub anchor_rotation_x: f64,
    pub anchor_rotation_y: f64,
    pub anchor_rotation_z: f64,
    pub anchor_rotation_w: f64,
    pub node_position_x: f64,
    pub node_position_y: f64,
    pub node_position_z: f64,
    pub node_rotation_x: f64,
    pub node_rotation_y: f64,
    pub node_rotation_z: f64,
    pub node_rotation_w: f64,
    pub node_scale_x: f64,
    pub node_scale_y: f64,
    pub node_scale_z: f64,
    #[serde(default)]
    pub cloud_anchor_id: Option<String>,
    #[serde(default)]
    pub cloud_anchor_state: Option<String>,
}

impl From<NodeAnchorPayload> for AnchorRecord {
    fn from(p: NodeAnchorPayload) -> Self {
        // An empty cloud id means the anchor was never hosted.
        let cloud_anchor_id = p.cloud_anchor_id.filter(|id| !id.is_empty());
        let cloud_anchor_state = cloud_anchor_id.as_ref().and(p.cloud_anchor_state);
        AnchorRecord {
            node_id: p.node_id,
            node_type: p.node_type,
            timestamp: p.timestamp,
            anchor_position: Vec3::new(p.anchor_position_x, p.anchor_position_y, p.anchor_position_z),
            anchor_rotation: Quaternion::new(
                p.anchor_rotation_x,
                p.anchor_rotation_y,
                p.anchor_rotation_z,
                p.anchor_rotation_w,
            ),
            node_transform: NodeTransform {
                position: Vec3::new(p.node_position_x, p.node_position_y, p.node_position_z),
                rotation: Quaternion::new(
                    p.node_rotation_x,
                    p.node_rotation_y,
                    p.node_rotation_z,
                    p.node_rotation_w,
                ),
                scale: Vec3::new(p.node_scale_x, p.node_scale_y, p.node_scale_z),
            },
            cloud_anchor_id,
            cloud_anchor_state,
        }
    }
}

/// Report that a client could not load the model at `object_url`.
///
/// Only `object_url` is required. Clients send `error` as a string, a status
/// code or a whole error object, so both descriptive fields keep their raw
/// JSON value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelLoadErrorPayload {
    #[serde(default)]
    pub node_id: Option<Value>,
    pub object_url: String,
    #[serde(default)]
    pub error: Option<Value>,
}

impl ModelLoadErrorPayload {
    pub fn node_label(&self) -> String {
        display_value(self.node_id.as_ref(), "unknown node")
    }

    pub fn error_text(&self) -> String {
        display_value(self.error.as_ref(), "unknown error")
    }
}

fn display_value(value: Option<&Value>, fallback: &str) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => fallback.to_string(),
    }
}
