/// Reconnecting websocket subscriber
///
/// Maintains a long-lived connection to the server's `/ws` endpoint,
/// joins the board's room on every connect, and forwards decoded
/// [`BoardEvent`]s to the owner over a channel. The server never
/// replays events missed while disconnected, so each (re)connect is
/// reported as [`SocketUpdate::Connected`]; the owner must refetch a
/// full snapshot before trusting local state again.
///
/// Reconnects back off exponentially from one second up to thirty.

use std::time::Duration;

use boardcast_shared::events::{BoardEvent, ClientMessage};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// What the socket task reports to its owner
#[derive(Debug)]
pub enum SocketUpdate {
    /// A connection (or reconnection) just completed and the board room
    /// was joined; local state must be refreshed from a snapshot
    Connected,

    /// A board event arrived
    Event(BoardEvent),
}

/// Handle to a running socket task
pub struct BoardSocket {
    updates: mpsc::UnboundedReceiver<SocketUpdate>,
    cancel: CancellationToken,
}

impl BoardSocket {
    /// Spawns the socket task for one board
    ///
    /// `ws_url` is the server's websocket base, e.g. `ws://host:4000/ws`.
    pub fn spawn(ws_url: String, board_id: Uuid, connection_id: Uuid) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        tokio::spawn(run_socket(ws_url, board_id, connection_id, tx, cancel.clone()));
        Self { updates: rx, cancel }
    }

    /// Waits for the next update; `None` after shutdown
    pub async fn next(&mut self) -> Option<SocketUpdate> {
        self.updates.recv().await
    }

    /// Stops the socket task
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for BoardSocket {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_socket(
    ws_url: String,
    board_id: Uuid,
    connection_id: Uuid,
    tx: mpsc::UnboundedSender<SocketUpdate>,
    cancel: CancellationToken,
) {
    let url = format!("{}?connection_id={}", ws_url, connection_id);
    let mut backoff = INITIAL_BACKOFF;

    loop {
        if cancel.is_cancelled() {
            return;
        }

        match tokio_tungstenite::connect_async(url.as_str()).await {
            Ok((stream, _)) => {
                info!(%board_id, "websocket connected");
                backoff = INITIAL_BACKOFF;
                if run_session(stream, board_id, &tx, &cancel).await.is_none() {
                    return;
                }
            }
            Err(e) => {
                warn!(error = %e, "websocket connect failed");
            }
        }

        debug!(delay_secs = backoff.as_secs(), "reconnecting after backoff");
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(backoff) => {}
        }
        backoff = (backoff * 2).min(MAX_BACKOFF);
    }
}

/// Runs one connected session; `None` means shut down, `Some(())` means
/// the connection dropped and the caller should reconnect
async fn run_session(
    stream: tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
    board_id: Uuid,
    tx: &mpsc::UnboundedSender<SocketUpdate>,
    cancel: &CancellationToken,
) -> Option<()> {
    let (mut sink, mut source) = stream.split();

    // Join the room first; the server sends nothing until we do
    let join = ClientMessage::JoinBoard { board_id };
    let payload = match serde_json::to_string(&join) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "failed to encode join message");
            return Some(());
        }
    };
    if sink.send(Message::Text(payload)).await.is_err() {
        return Some(());
    }
    if tx.send(SocketUpdate::Connected).is_err() {
        return None;
    }

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                let _ = sink.send(Message::Close(None)).await;
                return None;
            }
            msg = source.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<BoardEvent>(&text) {
                            Ok(event) => {
                                if tx.send(SocketUpdate::Event(event)).is_err() {
                                    return None;
                                }
                            }
                            Err(e) => {
                                warn!(error = %e, "unrecognized server message");
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!(%board_id, "websocket closed by server");
                        return Some(());
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(error = %e, "websocket read error");
                        return Some(());
                    }
                }
            }
        }
    }
}
