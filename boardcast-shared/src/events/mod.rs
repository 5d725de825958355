/// Board events and the websocket wire protocol
///
/// Every mutation the server applies is announced to the board's room
/// as one of these events. Payloads always carry the `board_id` and
/// either the full changed entity or an update batch, never a field
/// delta, so client reducers can replace-by-id idempotently.
///
/// Events are internally tagged JSON with kebab-case names on the wire:
///
/// ```json
/// { "event": "task-deleted", "board_id": "...", "list_id": "...", "task_id": "..." }
/// ```
///
/// # Example
///
/// ```
/// use boardcast_shared::events::BoardEvent;
/// use uuid::Uuid;
///
/// let event = BoardEvent::BoardUpdated { board_id: Uuid::new_v4() };
/// let json = serde_json::to_string(&event).unwrap();
/// assert!(json.contains("board-updated"));
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::list::List;
use crate::models::task::{PositionUpdate, Task};

/// Server-to-client board event
///
/// Within one mutation flow, an event is only published after the
/// mutation has been durably persisted. Across independent flows there
/// is no ordering guarantee; reducers must tolerate any interleaving.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum BoardEvent {
    /// Coarse invalidation: refetch the full board snapshot
    BoardUpdated {
        /// Board whose state changed
        board_id: Uuid,
    },

    /// A task was created in `list_id`
    TaskCreated {
        /// Board the task belongs to
        board_id: Uuid,

        /// List the task was created in
        list_id: Uuid,

        /// The full new task
        task: Task,
    },

    /// A task's content or assignee changed
    TaskUpdated {
        /// Board the task belongs to
        board_id: Uuid,

        /// The full updated task (its `list_id` may have changed)
        task: Task,
    },

    /// A task was deleted
    TaskDeleted {
        /// Board the task belonged to
        board_id: Uuid,

        /// List the task was in
        list_id: Uuid,

        /// Deleted task's ID
        task_id: Uuid,
    },

    /// A drag reorder committed; batch of final placements
    TaskMoved {
        /// Board the move happened on
        board_id: Uuid,

        /// Final placement of every task whose position changed
        updates: Vec<PositionUpdate>,
    },

    /// A list was created
    ListCreated {
        /// Board the list belongs to
        board_id: Uuid,

        /// The full new list
        list: List,
    },

    /// A list was deleted (its tasks went with it)
    ListDeleted {
        /// Board the list belonged to
        board_id: Uuid,

        /// Deleted list's ID
        list_id: Uuid,
    },

    /// The board's activity history changed; caches must invalidate
    ActivityUpdated {
        /// Board whose history changed
        board_id: Uuid,
    },
}

impl BoardEvent {
    /// The board this event is scoped to
    pub fn board_id(&self) -> Uuid {
        match self {
            BoardEvent::BoardUpdated { board_id }
            | BoardEvent::TaskCreated { board_id, .. }
            | BoardEvent::TaskUpdated { board_id, .. }
            | BoardEvent::TaskDeleted { board_id, .. }
            | BoardEvent::TaskMoved { board_id, .. }
            | BoardEvent::ListCreated { board_id, .. }
            | BoardEvent::ListDeleted { board_id, .. }
            | BoardEvent::ActivityUpdated { board_id } => *board_id,
        }
    }

    /// Wire name of the event ("task-created", "board-updated", ...)
    pub fn name(&self) -> &'static str {
        match self {
            BoardEvent::BoardUpdated { .. } => "board-updated",
            BoardEvent::TaskCreated { .. } => "task-created",
            BoardEvent::TaskUpdated { .. } => "task-updated",
            BoardEvent::TaskDeleted { .. } => "task-deleted",
            BoardEvent::TaskMoved { .. } => "task-moved",
            BoardEvent::ListCreated { .. } => "list-created",
            BoardEvent::ListDeleted { .. } => "list-deleted",
            BoardEvent::ActivityUpdated { .. } => "activity-updated",
        }
    }
}

/// Client-to-server control message
///
/// `join-board` must be sent immediately on connect and again on every
/// reconnect; the server does not replay events missed while away.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Subscribe this connection to a board's room
    JoinBoard {
        /// Board to subscribe to
        board_id: Uuid,
    },
}
