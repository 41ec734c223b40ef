//! Routes inbound frames into the hub and relays them to other clients.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::anchors::AnchorRecord;
use crate::errors::Result;
use crate::hub::RelayHub;
use crate::protocol::{InboundMessage, MessageKind};
use crate::registry::ConnectionId;

/// Summary of one dispatched frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub kind: MessageKind,
    /// Number of other clients the original frame was relayed to.
    pub relayed: usize,
    /// The frame pushed the mapping engine from idle to active. The caller
    /// is expected to start the reshuffle timer.
    pub activated: bool,
    /// The frame caused an out-of-cycle mapping broadcast.
    pub reshuffled: bool,
}

#[derive(Clone)]
pub struct ProtocolDispatcher {
    hub: Arc<RelayHub>,
}

impl ProtocolDispatcher {
    pub fn new(hub: Arc<RelayHub>) -> Self {
        Self { hub }
    }

    pub fn hub(&self) -> &Arc<RelayHub> {
        &self.hub
    }

    /// Handles one text frame from `sender`.
    ///
    /// Recognised kinds update the hub first; then the original text is
    /// relayed unchanged to every other live client. A frame that fails to
    /// parse is rejected without relaying and without touching any state.
    pub fn dispatch(&self, sender: ConnectionId, text: &str) -> Result<DispatchOutcome> {
        let message = match InboundMessage::parse(text) {
            Ok(message) => message,
            Err(e) => {
                warn!("Discarding frame from client {}: {}", sender, e);
                return Err(e.into());
            }
        };

        let kind = message.kind();
        let mut activated = false;
        let mut reshuffled = false;

        match message {
            InboundMessage::DevicePose { selected_node_type } => {
                debug!(
                    "Device pose from client {} (selected node type: {:?})",
                    sender, selected_node_type
                );
            }
            InboundMessage::NodeAnchor(payload) => {
                let record = AnchorRecord::from(payload);
                info!(
                    "New AR node {} of type {} from client {}",
                    record.node_id, record.node_type, sender
                );
                if let Some(id) = &record.cloud_anchor_id {
                    info!("  cloud anchor {} state {:?}", id, record.cloud_anchor_state);
                }
                let outcome = self.hub.record_anchor(record);
                activated = outcome.activated;
            }
            InboundMessage::AnchorUpdate { anchor_id } => {
                debug!("Anchor update {:?} from client {}", anchor_id, sender);
            }
            InboundMessage::ModelLoadError(payload) => {
                warn!(
                    "Model load error on node {} for {}: {}",
                    payload.node_label(),
                    payload.object_url,
                    payload.error_text()
                );
                let outcome = self.hub.report_load_failure(&payload.object_url);
                reshuffled = outcome.reshuffled;
            }
            InboundMessage::Unknown { kind } => {
                info!("Unknown data type '{}' from client {}, relaying", kind, sender);
            }
        }

        let relayed = self.hub.relay(sender, text);
        Ok(DispatchOutcome {
            kind,
            relayed,
            activated,
            reshuffled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ModelDescriptor;
    use crate::errors::Error;
    use crate::hub::HubSettings;
    use crate::registry::FrameReceiver;
    use serde_json::json;

    fn dispatcher() -> ProtocolDispatcher {
        let seed = vec![
            ModelDescriptor::new("a", "A", "https://assets.test/a.glb"),
            ModelDescriptor::new("b", "B", "https://assets.test/b.glb"),
        ];
        ProtocolDispatcher::new(Arc::new(RelayHub::new(seed, HubSettings::default())))
    }

    fn anchor_frame(node_id: &str) -> String {
        json!({
            "type": "nodeAnchor", "timestamp": 1, "nodeId": node_id, "nodeType": "cube",
            "anchorPositionX": 0.0, "anchorPositionY": 0.0, "anchorPositionZ": 0.0,
            "anchorRotationX": 0.0, "anchorRotationY": 0.0, "anchorRotationZ": 0.0,
            "anchorRotationW": 1.0,
            "nodePositionX": 0.0, "nodePositionY": 0.0, "nodePositionZ": 0.0,
            "nodeRotationX": 0.0, "nodeRotationY": 0.0, "nodeRotationZ": 0.0,
            "nodeRotationW": 1.0,
            "nodeScaleX": 1.0, "nodeScaleY": 1.0, "nodeScaleZ": 1.0
        })
        .to_string()
    }

    fn drain(rx: &mut FrameReceiver) -> Vec<String> {
        let mut frames = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            frames.push(frame.to_string());
        }
        frames
    }

    #[test]
    fn test_relay_is_verbatim_and_skips_sender() {
        let dispatcher = dispatcher();
        let (a, mut rx_a) = dispatcher.hub().connect();
        let (_b, mut rx_b) = dispatcher.hub().connect();

        let text = r#"{"type":"laserPointer",  "beam": {"z": 1e3, "x": 0.10}, "tags":[]}"#;
        let outcome = dispatcher.dispatch(a, text).unwrap();
        assert_eq!(outcome.kind, MessageKind::Unknown);
        assert_eq!(outcome.relayed, 1);
        assert!(drain(&mut rx_a).is_empty());
        assert_eq!(drain(&mut rx_b), vec![text.to_string()]);
    }

    #[test]
    fn test_resent_anchor_does_not_activate() {
        let dispatcher = dispatcher();
        let (a, _rx_a) = dispatcher.hub().connect();
        for node in ["n1", "n2", "n3", "n4", "n1"] {
            let outcome = dispatcher.dispatch(a, &anchor_frame(node)).unwrap();
            assert!(!outcome.activated);
        }
        assert_eq!(dispatcher.hub().status().anchors, 4);

        let outcome = dispatcher.dispatch(a, &anchor_frame("n5")).unwrap();
        assert!(outcome.activated);
    }

    #[test]
    fn test_malformed_frame_changes_nothing() {
        let dispatcher = dispatcher();
        let (a, _rx_a) = dispatcher.hub().connect();
        let (_b, mut rx_b) = dispatcher.hub().connect();
        let before = dispatcher.hub().status();

        for text in ["{not json", "42", r#"{"type":"nodeAnchor","nodeId":"n1"}"#] {
            let err = dispatcher.dispatch(a, text).unwrap_err();
            assert!(matches!(err, Error::Malformed(_)));
        }
        assert!(drain(&mut rx_b).is_empty());
        assert_eq!(dispatcher.hub().status(), before);
    }

    #[test]
    fn test_model_load_error_is_relayed_and_shrinks_catalog() {
        let dispatcher = dispatcher();
        let (a, _rx_a) = dispatcher.hub().connect();
        let (_b, mut rx_b) = dispatcher.hub().connect();

        let text = json!({
            "type": "modelLoadError",
            "nodeId": "n1",
            "objectUrl": "https://assets.test/a.glb",
            "error": "HTTP 404"
        })
        .to_string();
        let outcome = dispatcher.dispatch(a, &text).unwrap();
        assert_eq!(outcome.kind, MessageKind::ModelLoadError);
        assert!(!outcome.reshuffled);
        assert_eq!(drain(&mut rx_b), vec![text]);
        assert_eq!(dispatcher.hub().catalog().len(), 1);
    }

    #[test]
    fn test_model_load_error_with_non_string_error_still_removes_model() {
        let dispatcher = dispatcher();
        let (a, _rx_a) = dispatcher.hub().connect();
        let (_b, mut rx_b) = dispatcher.hub().connect();

        let structured = json!({
            "type": "modelLoadError",
            "nodeId": "n1",
            "objectUrl": "https://assets.test/a.glb",
            "error": {"code": 404, "message": "Not Found"}
        })
        .to_string();
        let outcome = dispatcher.dispatch(a, &structured).unwrap();
        assert_eq!(outcome.kind, MessageKind::ModelLoadError);
        assert_eq!(drain(&mut rx_b), vec![structured]);
        assert_eq!(dispatcher.hub().catalog().len(), 1);

        let numeric = json!({
            "type": "modelLoadError",
            "objectUrl": "https://assets.test/b.glb",
            "error": 500
        })
        .to_string();
        dispatcher.dispatch(a, &numeric).unwrap();
        assert_eq!(drain(&mut rx_b), vec![numeric]);
        assert!(dispatcher.hub().catalog().is_empty());
    }

    #[test]
    fn test_pass_through_kinds_leave_state_alone() {
        let dispatcher = dispatcher();
        let (a, _rx_a) = dispatcher.hub().connect();
        let pose = json!({"type": "devicePose", "devicePositionX": 1.0}).to_string();
        let update = json!({"type": "anchorUpdate", "anchorId": "x", "anchorPositionX": 1.0}).to_string();

        assert_eq!(dispatcher.dispatch(a, &pose).unwrap().kind, MessageKind::DevicePose);
        assert_eq!(dispatcher.dispatch(a, &update).unwrap().kind, MessageKind::AnchorUpdate);
        assert_eq!(dispatcher.hub().status().anchors, 0);
    }
}
