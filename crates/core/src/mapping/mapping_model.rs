//! Mapping domain models.

use serde::{Deserialize, Serialize};

use crate::catalog::ModelDescriptor;

/// One anchor paired with the model it should display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMapping {
    pub node_id: String,
    pub object_id: String,
    pub object_name: String,
    pub object_url: String,
}

impl ObjectMapping {
    pub fn new(node_id: impl Into<String>, model: &ModelDescriptor) -> Self {
        Self {
            node_id: node_id.into(),
            object_id: model.id.clone(),
            object_name: model.name.clone(),
            object_url: model.url.clone(),
        }
    }
}

/// Lifecycle of the mapping engine. Only ever moves from `Idle` to `Active`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MappingState {
    #[default]
    Idle,
    Active,
}

impl MappingState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MappingState::Idle => "idle",
            MappingState::Active => "active",
        }
    }
}
