//! Wire protocol shared with AR clients and visualisers.
//!
//! Every frame is a JSON object with a `type` discriminant. Only the message
//! kinds the hub acts on are decoded into typed payloads; everything else is
//! relayed as the original text.

mod inbound;
mod outbound;

pub use inbound::{InboundMessage, MessageKind, ModelLoadErrorPayload, NodeAnchorPayload};
pub use outbound::OutboundMessage;
