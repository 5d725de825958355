/// Room-scoped event relay
///
/// The hub keeps one room per board: the set of connections currently
/// subscribed to that board's event stream. Publishing delivers to the
/// connections joined at that moment; there is no queuing, no replay,
/// and publishing to an empty room is a no-op. A client that was away
/// recovers by refetching the full board snapshot, not by event replay.
///
/// A single hub instance is constructed by the serving process and a
/// handle is passed into every mutation handler; nothing reads global
/// process state.
///
/// # Example
///
/// ```
/// use boardcast_server::hub::{ConnectionId, PublishScope, RelayHub};
/// use boardcast_shared::events::BoardEvent;
/// use uuid::Uuid;
///
/// let hub = RelayHub::new();
/// let board_id = Uuid::new_v4();
/// let conn = ConnectionId::new();
///
/// let (_guard, mut rx) = hub.join(board_id, conn);
/// hub.publish(board_id, BoardEvent::BoardUpdated { board_id }, PublishScope::All);
/// assert!(rx.try_recv().is_ok());
/// ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use boardcast_shared::events::BoardEvent;
use tokio::sync::mpsc;
use tracing::{debug, trace};
use uuid::Uuid;

/// Opaque identifier of one websocket connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Allocates a fresh connection id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an externally supplied id
    ///
    /// HTTP mutation requests carry the originating websocket connection
    /// id in a header so publishes can skip the originator.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Who receives a published event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishScope {
    /// Every connection currently in the room
    All,

    /// Every connection except the one that caused the mutation
    ///
    /// The originator already holds the state from its own optimistic
    /// update, so this is the canonical scope for mutation events.
    ExceptSender(ConnectionId),
}

#[derive(Default)]
struct Rooms {
    /// board id -> connection id -> event sender
    by_board: HashMap<Uuid, HashMap<ConnectionId, mpsc::UnboundedSender<BoardEvent>>>,

    /// connection id -> board id, for O(1) leave
    by_connection: HashMap<ConnectionId, Uuid>,
}

/// Board-scoped event relay
///
/// Cheap to clone; all clones share the same room table. Join and leave
/// for a given connection are serialized through the table lock, and the
/// lock is never held across I/O.
#[derive(Clone, Default)]
pub struct RelayHub {
    rooms: Arc<RwLock<Rooms>>,
}

impl RelayHub {
    /// Creates an empty hub
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a connection to a board's room
    ///
    /// Returns a guard that leaves the room when dropped (on every exit
    /// path, including errors) and the receiving end of the connection's
    /// event queue. If the connection was already in a room, it is moved:
    /// a connection subscribes to one board at a time.
    pub fn join(
        &self,
        board_id: Uuid,
        conn_id: ConnectionId,
    ) -> (RoomGuard, mpsc::UnboundedReceiver<BoardEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();

        {
            let mut rooms = self.rooms.write().expect("hub lock poisoned");

            if let Some(previous) = rooms.by_connection.insert(conn_id, board_id) {
                if let Some(members) = rooms.by_board.get_mut(&previous) {
                    members.remove(&conn_id);
                    if members.is_empty() {
                        rooms.by_board.remove(&previous);
                    }
                }
            }

            rooms.by_board.entry(board_id).or_default().insert(conn_id, tx);
        }

        debug!(%conn_id, %board_id, "connection joined board room");

        let guard = RoomGuard { hub: self.clone(), conn_id, board_id };
        (guard, rx)
    }

    /// Removes a connection from a board's room
    ///
    /// Scoped to the board the membership was taken out against: if the
    /// connection has since moved to a different room, that newer
    /// membership is left alone. A no-op for unknown connections.
    pub fn leave(&self, conn_id: ConnectionId, board_id: Uuid) {
        let mut rooms = self.rooms.write().expect("hub lock poisoned");

        if rooms.by_connection.get(&conn_id) != Some(&board_id) {
            return;
        }

        rooms.by_connection.remove(&conn_id);
        if let Some(members) = rooms.by_board.get_mut(&board_id) {
            members.remove(&conn_id);
            if members.is_empty() {
                rooms.by_board.remove(&board_id);
            }
        }
        debug!(%conn_id, %board_id, "connection left board room");
    }

    /// Broadcasts an event to a board's room
    ///
    /// Delivery is at-least-once to connections joined right now; an
    /// empty room is a no-op. Returns how many connections were sent to.
    /// Send failures (a receiver torn down between lookup and send) are
    /// ignored; the connection's guard will clean up its membership.
    pub fn publish(&self, board_id: Uuid, event: BoardEvent, scope: PublishScope) -> usize {
        let rooms = self.rooms.read().expect("hub lock poisoned");

        let Some(members) = rooms.by_board.get(&board_id) else {
            trace!(%board_id, event = event.name(), "publish to empty room");
            return 0;
        };

        let mut delivered = 0;
        for (member_id, tx) in members {
            if let PublishScope::ExceptSender(sender) = scope {
                if *member_id == sender {
                    continue;
                }
            }
            if tx.send(event.clone()).is_ok() {
                delivered += 1;
            }
        }

        trace!(%board_id, event = event.name(), delivered, "published board event");
        delivered
    }

    /// Number of connections currently in a board's room
    pub fn room_size(&self, board_id: Uuid) -> usize {
        self.rooms
            .read()
            .expect("hub lock poisoned")
            .by_board
            .get(&board_id)
            .map_or(0, HashMap::len)
    }

    /// Total connections across all rooms
    pub fn connection_count(&self) -> usize {
        self.rooms.read().expect("hub lock poisoned").by_connection.len()
    }
}

/// Subscription handle returned by [`RelayHub::join`]
///
/// Dropping the guard unsubscribes the connection, so room membership
/// cannot leak regardless of how a connection handler exits. The guard
/// remembers which board it joined: after a rejoin to another board,
/// dropping the stale guard does not touch the new membership.
pub struct RoomGuard {
    hub: RelayHub,
    conn_id: ConnectionId,
    board_id: Uuid,
}

impl RoomGuard {
    /// The connection this guard belongs to
    pub fn connection_id(&self) -> ConnectionId {
        self.conn_id
    }

    /// The board this guard subscribed to
    pub fn board_id(&self) -> Uuid {
        self.board_id
    }
}

impl Drop for RoomGuard {
    fn drop(&mut self) {
        self.hub.leave(self.conn_id, self.board_id);
    }
}
