//! WebSocket transport for AR clients and visualisers.

use std::sync::Arc;

use anchorcast_core::registry::ConnectionId;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tracing::{debug, warn};

use crate::main_lib::AppState;
use crate::scheduler;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (id, mut outbound) = state.hub.connect();
    let (mut sink, mut stream) = socket.split();

    // Drains this client's queue into the socket. Exits when the hub drops the
    // connection or a write fails.
    let mut writer = tokio::spawn(async move {
        while let Some(frame) = outbound.recv().await {
            if let Err(e) = sink.send(Message::Text(frame.to_string().into())).await {
                debug!("WS server: write to client {} failed: {e}", id);
                break;
            }
        }
        let _ = sink.close().await;
    });

    loop {
        tokio::select! {
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => handle_text(&state, id, text.as_str()),
                Some(Ok(Message::Close(frame))) => {
                    debug!("Client {} sent close: {:?}", id, frame);
                    state.hub.mark_closing(id);
                    break;
                }
                // Ping/pong is answered by the socket layer; binary frames are not
                // part of the protocol.
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("WS server: error on client {}: {e}", id);
                    break;
                }
                None => break,
            },
            _ = &mut writer => break,
        }
    }

    state.hub.disconnect(id);
    writer.abort();
}

fn handle_text(state: &Arc<AppState>, id: ConnectionId, text: &str) {
    // Rejected frames are logged by the dispatcher; the connection stays open.
    let Ok(outcome) = state.dispatcher.dispatch(id, text) else {
        return;
    };
    debug!(
        "Client {} {:?} frame relayed to {} clients",
        id, outcome.kind, outcome.relayed
    );
    if outcome.activated {
        scheduler::start_reshuffle_timer(state.hub.clone(), state.reshuffle_interval);
    }
}
