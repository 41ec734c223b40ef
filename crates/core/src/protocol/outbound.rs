use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::mapping::ObjectMapping;

/// Messages originated by the hub itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundMessage {
    ObjectMapping {
        timestamp: i64,
        mappings: Vec<ObjectMapping>,
    },
}

impl OutboundMessage {
    /// Mapping update stamped with the current time in epoch milliseconds.
    pub fn object_mapping(mappings: &[ObjectMapping]) -> Self {
        OutboundMessage::ObjectMapping {
            timestamp: Utc::now().timestamp_millis(),
            mappings: mappings.to_vec(),
        }
    }

    pub fn to_frame(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
