/// Mutation coordinator
///
/// Single entry point for every board mutation. Each operation follows
/// the same sequence:
///
/// 1. Authorize the actor against board ownership/membership; fail fast.
/// 2. Apply the change to the store.
/// 3. Record a human-readable activity entry. Failure here is traced
///    and swallowed; it never undoes step 2 and never fails the
///    mutation.
/// 4. Publish the specific typed event plus the coarse `board-updated`
///    signal (and `activity-updated` when the history changed), scoped
///    to everyone except the originating connection.
///
/// Persistence always strictly precedes publish, so no client observes
/// an event for data that is not durably stored. No event is published
/// for a failed mutation.
///
/// The reorder path is the most involved: it snapshots each affected
/// task's prior placement, commits the whole position batch in one
/// transaction, then logs per-task activities by comparing prior and
/// new placements. Cross-list moves and in-list reorders get different
/// messages, and each log write is isolated from the others.

use boardcast_shared::events::BoardEvent;
use boardcast_shared::models::activity::{Activity, ActivityPage, ActivityView};
use boardcast_shared::models::board::{Board, BoardSnapshot, CreateBoard};
use boardcast_shared::models::list::{CreateList, List};
use boardcast_shared::models::task::{PositionUpdate, Task, TaskPlacement};
use boardcast_shared::models::user::User;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::hub::{ConnectionId, PublishScope, RelayHub};

/// Positions closer than this are considered unchanged when deciding
/// whether a reorder deserves an activity entry.
const POSITION_EPSILON: f64 = 0.01;

/// Default page size for activity history queries
pub const DEFAULT_ACTIVITY_PAGE_SIZE: u32 = 20;

/// Mutation error
#[derive(Debug, Error)]
pub enum MutationError {
    /// Actor is not the board's owner or a member
    #[error("user {user_id} is not an owner or member of board {board_id}")]
    Unauthorized { board_id: Uuid, user_id: Uuid },

    /// A referenced entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// Store failure; for batch operations nothing was written
    #[error("persistence error: {0}")]
    Persistence(#[from] sqlx::Error),
}

/// Result alias for coordinator operations
pub type MutationResult<T> = Result<T, MutationError>;

/// Validates and applies board mutations, then publishes events
///
/// One coordinator is constructed per serving process and shared by all
/// request handlers; it holds the pool and the relay hub handle.
#[derive(Clone)]
pub struct Coordinator {
    db: PgPool,
    hub: RelayHub,
}

impl Coordinator {
    /// Creates a coordinator over the given pool and hub
    pub fn new(db: PgPool, hub: RelayHub) -> Self {
        Self { db, hub }
    }

    /// The relay hub this coordinator publishes through
    pub fn hub(&self) -> &RelayHub {
        &self.hub
    }

    /// Creates a board owned by the actor
    ///
    /// No event is published: the board has no room until someone joins.
    pub async fn create_board(&self, actor: Uuid, title: String) -> MutationResult<Board> {
        let board = Board::create(&self.db, CreateBoard { title, owner_id: actor }).await?;
        debug!(board_id = %board.id, owner = %actor, "board created");
        Ok(board)
    }

    /// Deletes a board; owner only
    ///
    /// Cascades to lists, tasks, activities, and memberships. Remaining
    /// room members get a coarse signal and will fail their refresh,
    /// which is how they learn the board is gone.
    pub async fn delete_board(
        &self,
        actor: Uuid,
        board_id: Uuid,
        origin: Option<ConnectionId>,
    ) -> MutationResult<()> {
        let board = Board::find_by_id(&self.db, board_id)
            .await?
            .ok_or_else(|| MutationError::NotFound(format!("board {} not found", board_id)))?;

        if board.owner_id != actor {
            return Err(MutationError::Unauthorized { board_id, user_id: actor });
        }

        Board::delete(&self.db, board_id).await?;
        self.publish(BoardEvent::BoardUpdated { board_id }, origin);
        Ok(())
    }

    /// Adds the actor as a member of the board
    ///
    /// Idempotent: joining a board you own or already belong to is a
    /// no-op that still succeeds.
    pub async fn join_board(&self, actor: Uuid, board_id: Uuid) -> MutationResult<Board> {
        let board = Board::find_by_id(&self.db, board_id)
            .await?
            .ok_or_else(|| MutationError::NotFound(format!("board {} not found", board_id)))?;

        if board.owner_id != actor {
            Board::add_member(&self.db, board_id, actor).await?;
        }
        Ok(board)
    }

    /// Loads the full board tree for the actor
    ///
    /// This is the recovery path: clients call it on join and whenever
    /// a coarse `board-updated` signal invalidates their local state.
    pub async fn board_snapshot(&self, actor: Uuid, board_id: Uuid) -> MutationResult<BoardSnapshot> {
        self.authorize(board_id, actor).await?;

        Board::snapshot(&self.db, board_id)
            .await?
            .ok_or_else(|| MutationError::NotFound(format!("board {} not found", board_id)))
    }

    /// Creates a list at the end of the board
    pub async fn create_list(
        &self,
        actor: Uuid,
        board_id: Uuid,
        title: String,
        origin: Option<ConnectionId>,
    ) -> MutationResult<List> {
        self.authorize(board_id, actor).await?;

        let list = List::create(&self.db, CreateList { board_id, title }).await?;

        self.publish(BoardEvent::ListCreated { board_id, list: list.clone() }, origin);
        self.publish(BoardEvent::BoardUpdated { board_id }, origin);
        Ok(list)
    }

    /// Deletes a list, cascading to its tasks and their activities
    pub async fn delete_list(
        &self,
        actor: Uuid,
        list_id: Uuid,
        origin: Option<ConnectionId>,
    ) -> MutationResult<()> {
        let list = List::find_by_id(&self.db, list_id)
            .await?
            .ok_or_else(|| MutationError::NotFound(format!("list {} not found", list_id)))?;
        let board_id = list.board_id;
        self.authorize(board_id, actor).await?;

        List::delete(&self.db, list_id).await?;

        self.publish(BoardEvent::ListDeleted { board_id, list_id }, origin);
        self.publish(BoardEvent::BoardUpdated { board_id }, origin);
        // Cascade removed the tasks' histories
        self.publish(BoardEvent::ActivityUpdated { board_id }, origin);
        Ok(())
    }

    /// Creates a task appended at the end of a list
    pub async fn create_task(
        &self,
        actor: Uuid,
        list_id: Uuid,
        content: String,
        origin: Option<ConnectionId>,
    ) -> MutationResult<Task> {
        let list = List::find_by_id(&self.db, list_id)
            .await?
            .ok_or_else(|| MutationError::NotFound(format!("list {} not found", list_id)))?;
        let board_id = list.board_id;
        self.authorize(board_id, actor).await?;

        let task = Task::create(
            &self.db,
            boardcast_shared::models::task::CreateTask {
                list_id,
                content: content.clone(),
                assignee_id: Some(actor),
            },
        )
        .await?;

        self.log_activity(actor, task.id, &format!("created task \"{}\"", content)).await;

        self.publish(
            BoardEvent::TaskCreated { board_id, list_id, task: task.clone() },
            origin,
        );
        self.publish(BoardEvent::BoardUpdated { board_id }, origin);
        self.publish(BoardEvent::ActivityUpdated { board_id }, origin);
        Ok(task)
    }

    /// Replaces a task's content
    pub async fn update_task_content(
        &self,
        actor: Uuid,
        task_id: Uuid,
        content: String,
        origin: Option<ConnectionId>,
    ) -> MutationResult<Task> {
        let board_id = self.board_of_task(task_id).await?;
        self.authorize(board_id, actor).await?;

        let task = Task::update_content(&self.db, task_id, &content)
            .await?
            .ok_or_else(|| MutationError::NotFound(format!("task {} not found", task_id)))?;

        self.log_activity(actor, task_id, &format!("updated task to \"{}\"", content)).await;

        self.publish(BoardEvent::TaskUpdated { board_id, task: task.clone() }, origin);
        self.publish(BoardEvent::BoardUpdated { board_id }, origin);
        self.publish(BoardEvent::ActivityUpdated { board_id }, origin);
        Ok(task)
    }

    /// Sets or clears a task's assignee
    ///
    /// The assignee must be the board's owner or a member.
    pub async fn assign_task(
        &self,
        actor: Uuid,
        task_id: Uuid,
        assignee_id: Option<Uuid>,
        origin: Option<ConnectionId>,
    ) -> MutationResult<Task> {
        let board_id = self.board_of_task(task_id).await?;
        self.authorize(board_id, actor).await?;

        if let Some(assignee) = assignee_id {
            if !Board::is_owner_or_member(&self.db, board_id, assignee).await? {
                return Err(MutationError::NotFound(format!(
                    "user {} is not a member of board {}",
                    assignee, board_id
                )));
            }
        }

        let task = Task::assign(&self.db, task_id, assignee_id)
            .await?
            .ok_or_else(|| MutationError::NotFound(format!("task {} not found", task_id)))?;

        let action = match assignee_id {
            Some(assignee) => {
                let name = User::find_by_id(&self.db, assignee)
                    .await?
                    .map(|u| u.display_name().to_string())
                    .unwrap_or_else(|| "someone".to_string());
                format!("assigned task to {}", name)
            }
            None => "unassigned task".to_string(),
        };
        self.log_activity(actor, task_id, &action).await;

        self.publish(BoardEvent::TaskUpdated { board_id, task: task.clone() }, origin);
        self.publish(BoardEvent::BoardUpdated { board_id }, origin);
        self.publish(BoardEvent::ActivityUpdated { board_id }, origin);
        Ok(task)
    }

    /// Deletes a task, cascading to its activity entries
    pub async fn delete_task(
        &self,
        actor: Uuid,
        task_id: Uuid,
        origin: Option<ConnectionId>,
    ) -> MutationResult<()> {
        let task = Task::find_by_id(&self.db, task_id)
            .await?
            .ok_or_else(|| MutationError::NotFound(format!("task {} not found", task_id)))?;
        let board_id = self.board_of_list(task.list_id).await?;
        self.authorize(board_id, actor).await?;

        Task::delete(&self.db, task_id).await?;

        self.publish(
            BoardEvent::TaskDeleted { board_id, list_id: task.list_id, task_id },
            origin,
        );
        self.publish(BoardEvent::BoardUpdated { board_id }, origin);
        self.publish(BoardEvent::ActivityUpdated { board_id }, origin);
        Ok(())
    }

    /// Persists a drag-reorder batch and logs move activities
    ///
    /// The batch is all-or-nothing: either every task's placement is
    /// updated or none is. Activity logging happens after commit, one
    /// entry per task that crossed lists or measurably changed position;
    /// a failed log write is traced and does not affect the others or
    /// the committed move.
    pub async fn reorder_tasks(
        &self,
        actor: Uuid,
        board_id: Uuid,
        updates: Vec<PositionUpdate>,
        origin: Option<ConnectionId>,
    ) -> MutationResult<()> {
        self.authorize(board_id, actor).await?;

        if updates.is_empty() {
            return Ok(());
        }

        // Snapshot prior placements before the batch commits
        let ids: Vec<Uuid> = updates.iter().map(|u| u.task_id).collect();
        let prior = Task::placements(&self.db, &ids).await?;

        Task::apply_position_batch(&self.db, &updates).await?;

        for update in &updates {
            let Some(before) = prior.iter().find(|p| p.id == update.task_id) else {
                continue;
            };
            if let Some(action) = move_activity(before, update) {
                self.log_activity(actor, update.task_id, &action).await;
            }
        }

        self.publish(BoardEvent::TaskMoved { board_id, updates: updates.clone() }, origin);
        self.publish(BoardEvent::BoardUpdated { board_id }, origin);
        self.publish(BoardEvent::ActivityUpdated { board_id }, origin);
        Ok(())
    }

    /// Fetches one page of the board's activity history, newest first
    pub async fn activities(
        &self,
        actor: Uuid,
        board_id: Uuid,
        page: u32,
        page_size: u32,
    ) -> MutationResult<ActivityPage> {
        self.authorize(board_id, actor).await?;
        Ok(Activity::page_for_board(&self.db, board_id, page, page_size).await?)
    }

    /// Fetches the most recent activity entries of one task
    pub async fn task_activities(
        &self,
        actor: Uuid,
        task_id: Uuid,
        limit: i64,
    ) -> MutationResult<Vec<ActivityView>> {
        let board_id = self.board_of_task(task_id).await?;
        self.authorize(board_id, actor).await?;
        Ok(Activity::list_by_task(&self.db, task_id, limit).await?)
    }

    async fn authorize(&self, board_id: Uuid, user_id: Uuid) -> MutationResult<()> {
        if Board::is_owner_or_member(&self.db, board_id, user_id).await? {
            Ok(())
        } else {
            Err(MutationError::Unauthorized { board_id, user_id })
        }
    }

    async fn board_of_task(&self, task_id: Uuid) -> MutationResult<Uuid> {
        let task = Task::find_by_id(&self.db, task_id)
            .await?
            .ok_or_else(|| MutationError::NotFound(format!("task {} not found", task_id)))?;
        self.board_of_list(task.list_id).await
    }

    async fn board_of_list(&self, list_id: Uuid) -> MutationResult<Uuid> {
        let list = List::find_by_id(&self.db, list_id)
            .await?
            .ok_or_else(|| MutationError::NotFound(format!("list {} not found", list_id)))?;
        Ok(list.board_id)
    }

    /// Records an activity entry, best effort
    async fn log_activity(&self, user_id: Uuid, task_id: Uuid, action: &str) {
        match Activity::create(&self.db, user_id, task_id, action).await {
            Ok(activity) => {
                debug!(activity_id = %activity.id, %task_id, action, "activity logged");
            }
            Err(err) => {
                warn!(%task_id, action, error = %err, "failed to log activity");
            }
        }
    }

    fn publish(&self, event: BoardEvent, origin: Option<ConnectionId>) {
        let scope = match origin {
            Some(conn) => PublishScope::ExceptSender(conn),
            None => PublishScope::All,
        };
        self.hub.publish(event.board_id(), event, scope);
    }
}

/// Decides which activity message a committed position update deserves
///
/// Cross-list moves use the task's *prior* content; in-list position
/// changes below [`POSITION_EPSILON`] produce no entry at all.
fn move_activity(before: &TaskPlacement, update: &PositionUpdate) -> Option<String> {
    if before.list_id != update.list_id {
        Some(format!("moved task \"{}\" to another list", before.content))
    } else if (before.position - update.position).abs() > POSITION_EPSILON {
        Some(format!("reordered task \"{}\"", before.content))
    } else {
        None
    }
}
