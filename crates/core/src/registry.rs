//! Live client connections and broadcast fan-out.
//!
//! Each connection is represented by the sending half of an unbounded
//! channel; the transport drains the receiving half into its socket. Sending
//! never blocks, so one slow peer cannot hold up a broadcast. A send that
//! fails means the transport side is gone, and only that connection is
//! dropped.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use log::{debug, info};
use tokio::sync::mpsc;

/// A text frame shared between all recipients of a broadcast.
pub type Frame = Arc<str>;
pub type FrameSender = mpsc::UnboundedSender<Frame>;
pub type FrameReceiver = mpsc::UnboundedReceiver<Frame>;

/// Stable handle issued at registration. Never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct ClientConnection {
    outbound: FrameSender,
    alive: bool,
}

#[derive(Default)]
pub struct ConnectionRegistry {
    next_id: u64,
    connections: BTreeMap<ConnectionId, ClientConnection>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, outbound: FrameSender) -> ConnectionId {
        self.next_id += 1;
        let id = ConnectionId(self.next_id);
        self.connections.insert(
            id,
            ClientConnection {
                outbound,
                alive: true,
            },
        );
        info!("Client {} connected ({} total)", id, self.connections.len());
        id
    }

    /// Registers a connection backed by a fresh channel.
    pub fn open(&mut self) -> (ConnectionId, FrameReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (self.register(tx), rx)
    }

    pub fn unregister(&mut self, id: ConnectionId) -> bool {
        let removed = self.connections.remove(&id).is_some();
        if removed {
            info!(
                "Client {} disconnected ({} total)",
                id,
                self.connections.len()
            );
        }
        removed
    }

    /// Clears the liveness flag; the connection stops receiving broadcasts
    /// but stays registered until it is unregistered.
    pub fn mark_closing(&mut self, id: ConnectionId) {
        if let Some(connection) = self.connections.get_mut(&id) {
            connection.alive = false;
        }
    }

    pub fn is_alive(&self, id: ConnectionId) -> bool {
        self.connections.get(&id).is_some_and(|c| c.alive)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Sends to every live connection except `sender`. Returns the number of
    /// connections the frame was handed to.
    pub fn broadcast_except(&mut self, sender: ConnectionId, frame: &Frame) -> usize {
        self.fan_out(Some(sender), frame)
    }

    /// Sends to every live connection, the originator included.
    pub fn broadcast_all(&mut self, frame: &Frame) -> usize {
        self.fan_out(None, frame)
    }

    fn fan_out(&mut self, skip: Option<ConnectionId>, frame: &Frame) -> usize {
        let mut delivered = 0;
        let mut failed = Vec::new();

        for (id, connection) in &self.connections {
            if Some(*id) == skip || !connection.alive {
                continue;
            }
            match connection.outbound.send(Arc::clone(frame)) {
                Ok(()) => delivered += 1,
                Err(_) => failed.push(*id),
            }
        }

        for id in failed {
            debug!("Dropping client {} after failed write", id);
            self.unregister(id);
        }
        delivered
    }
}
