/// Websocket event channel
///
/// Exposes the board-scoped event stream to clients. Each connection:
///
/// 1. Upgrades at `GET /ws`.
/// 2. Sends `join-board` immediately (and again after every reconnect;
///    nothing is replayed for the time it was away).
/// 3. Receives board events as JSON text frames until it disconnects.
///
/// The room subscription lives in a [`RoomGuard`], so membership is
/// released on every exit path: clean close, protocol error, or task
/// abort alike.

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::{Query, State},
    response::Response,
};
use boardcast_shared::events::{BoardEvent, ClientMessage};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::hub::{ConnectionId, RelayHub, RoomGuard};

/// Websocket connect parameters
///
/// Clients pick their own connection id and repeat it in the
/// `X-Connection-Id` header of mutation requests, so the coordinator
/// can publish to everyone except them.
#[derive(Debug, Deserialize)]
pub struct WsParams {
    /// Client-chosen connection id; generated server-side if absent
    pub connection_id: Option<Uuid>,
}

/// Websocket upgrade handler for `GET /ws`
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsParams>,
    State(state): State<AppState>,
) -> Response {
    let conn_id = params
        .connection_id
        .map(ConnectionId::from_uuid)
        .unwrap_or_default();
    ws.on_upgrade(move |socket| handle_connection(socket, state.hub().clone(), conn_id))
}

/// Drives one websocket connection until it closes
async fn handle_connection(socket: WebSocket, hub: RelayHub, conn_id: ConnectionId) {
    debug!(%conn_id, "websocket connected");

    let (mut sink, mut stream) = socket.split();

    // Populated once the client sends join-board. Re-joining replaces
    // both; the displaced guard is board-scoped, so dropping it after
    // the new join releases only its own stale membership.
    let mut room: Option<(RoomGuard, mpsc::UnboundedReceiver<BoardEvent>)> = None;

    loop {
        tokio::select! {
            incoming = stream.next() => {
                let Some(Ok(message)) = incoming else {
                    break;
                };
                match message {
                    Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(ClientMessage::JoinBoard { board_id }) => {
                            let (guard, rx) = hub.join(board_id, conn_id);
                            room = Some((guard, rx));
                        }
                        Err(err) => {
                            warn!(%conn_id, error = %err, "ignoring malformed client message");
                        }
                    },
                    Message::Close(_) => break,
                    // Ping/pong handled by the protocol layer; binary ignored
                    _ => {}
                }
            }

            event = next_event(&mut room) => {
                let Some(event) = event else {
                    // Hub side of the queue closed; drop the stale room
                    room = None;
                    continue;
                };
                match serde_json::to_string(&event) {
                    Ok(json) => {
                        if sink.send(Message::Text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        warn!(%conn_id, error = %err, "failed to serialize board event");
                    }
                }
            }
        }
    }

    debug!(%conn_id, "websocket disconnected");
    // `room` drops here; its guard leaves the hub.
}

/// Waits for the next relayed event, or forever if no room is joined
async fn next_event(
    room: &mut Option<(RoomGuard, mpsc::UnboundedReceiver<BoardEvent>)>,
) -> Option<BoardEvent> {
    match room {
        Some((_, rx)) => rx.recv().await,
        None => std::future::pending().await,
    }
}
