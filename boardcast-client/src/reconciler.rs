/// Client-side state reconciler
///
/// Maintains a client's local copy of one board, lists holding ordered
/// tasks, and folds incoming [`BoardEvent`]s into it. Every reducer is
/// idempotent and replaces entities wholesale by id, never field by
/// field, so events may arrive repeated or interleaved across
/// independent mutation flows without corrupting state.
///
/// Two state phases exist: a drag applies the planner's own output
/// immediately via [`BoardState::apply_planned`] (tentative), and the
/// server's confirmed `task-moved` event later lands on top as a plain
/// reducer application (confirmed). Because both paths carry complete
/// placements, confirmation over an optimistic state is a no-op rather
/// than a conflict.
///
/// Events that cannot be applied incrementally, and any reconnect,
/// set `needs_refresh`; the owner then fetches a fresh full snapshot.
/// Missed events are never replayed.

use boardcast_shared::events::BoardEvent;
use boardcast_shared::models::board::{BoardSnapshot, ListWithTasks};
use boardcast_shared::models::task::{PositionUpdate, Task};
use tracing::trace;
use uuid::Uuid;

/// Local board state: the tree of lists and their ordered tasks
#[derive(Debug, Clone)]
pub struct BoardState {
    /// The board this state mirrors
    pub board_id: Uuid,

    /// Lists ascending by position, each with tasks ascending by position
    pub lists: Vec<ListWithTasks>,

    /// Set when incremental patching is insufficient; cleared by
    /// [`BoardState::replace_from_snapshot`]
    pub needs_refresh: bool,
}

impl BoardState {
    /// Builds local state from a server snapshot
    pub fn from_snapshot(snapshot: BoardSnapshot) -> Self {
        Self {
            board_id: snapshot.board.id,
            lists: snapshot.lists,
            needs_refresh: false,
        }
    }

    /// Replaces the whole tree from a fresh snapshot
    pub fn replace_from_snapshot(&mut self, snapshot: BoardSnapshot) {
        self.board_id = snapshot.board.id;
        self.lists = snapshot.lists;
        self.needs_refresh = false;
    }

    /// Folds one event into local state
    ///
    /// Events scoped to other boards are ignored. Applying the same
    /// event twice leaves the state identical to applying it once.
    pub fn apply(&mut self, event: &BoardEvent) {
        if event.board_id() != self.board_id {
            return;
        }
        trace!(event = event.name(), board_id = %self.board_id, "applying board event");

        match event {
            BoardEvent::TaskCreated { list_id, task, .. } => {
                self.upsert_task_in_list(*list_id, task.clone());
            }

            BoardEvent::TaskUpdated { task, .. } => {
                // The task may have changed lists; locate it by id anywhere
                for list in &mut self.lists {
                    if let Some(slot) = list.tasks.iter_mut().find(|t| t.id == task.id) {
                        *slot = task.clone();
                        break;
                    }
                }
            }

            BoardEvent::TaskDeleted { task_id, .. } => {
                // The task may sit in a different list locally than on
                // the server; remove it wherever it is
                for list in &mut self.lists {
                    list.tasks.retain(|t| t.id != *task_id);
                }
            }

            BoardEvent::TaskMoved { updates, .. } => {
                self.apply_planned(updates);
            }

            BoardEvent::ListCreated { list, .. } => {
                if !self.lists.iter().any(|l| l.list.id == list.id) {
                    self.lists.push(ListWithTasks { list: list.clone(), tasks: Vec::new() });
                }
            }

            BoardEvent::ListDeleted { list_id, .. } => {
                self.lists.retain(|l| l.list.id != *list_id);
            }

            BoardEvent::BoardUpdated { .. } => {
                // Coarse invalidation: the owner must refetch the snapshot
                self.needs_refresh = true;
            }

            BoardEvent::ActivityUpdated { .. } => {
                // Handled by the activity cache, not board state
            }
        }
    }

    /// Applies a placement batch, optimistic or confirmed
    ///
    /// For every list: keep the tasks the batch does not mention, add
    /// the moved tasks that now belong to it, and sort by position.
    /// The batch carries each moved task's complete final placement, so
    /// applying it over an already-optimistic state changes nothing.
    pub fn apply_planned(&mut self, updates: &[PositionUpdate]) {
        // Pull every mentioned task out of the tree, updated in place
        let mut moved: Vec<Task> = Vec::with_capacity(updates.len());
        for list in &mut self.lists {
            let mut remaining = Vec::with_capacity(list.tasks.len());
            for task in list.tasks.drain(..) {
                if let Some(update) = updates.iter().find(|u| u.task_id == task.id) {
                    let mut task = task;
                    task.list_id = update.list_id;
                    task.position = update.position;
                    moved.push(task);
                } else {
                    remaining.push(task);
                }
            }
            list.tasks = remaining;
        }

        // Reinsert into their (possibly new) lists and restore order
        for list in &mut self.lists {
            let list_id = list.list.id;
            list.tasks.extend(moved.iter().filter(|t| t.list_id == list_id).cloned());
            list.tasks
                .sort_by(|a, b| a.position.partial_cmp(&b.position).unwrap_or(std::cmp::Ordering::Equal));
        }
    }

    /// Finds a task anywhere on the board
    pub fn find_task(&self, task_id: Uuid) -> Option<&Task> {
        self.lists.iter().flat_map(|l| l.tasks.iter()).find(|t| t.id == task_id)
    }

    /// Total number of tasks across all lists
    pub fn task_count(&self) -> usize {
        self.lists.iter().map(|l| l.tasks.len()).sum()
    }

    fn upsert_task_in_list(&mut self, list_id: Uuid, task: Task) {
        for list in &mut self.lists {
            if list.list.id != list_id {
                continue;
            }
            match list.tasks.iter_mut().find(|t| t.id == task.id) {
                Some(slot) => *slot = task,
                None => list.tasks.push(task),
            }
            list.tasks
                .sort_by(|a, b| a.position.partial_cmp(&b.position).unwrap_or(std::cmp::Ordering::Equal));
            return;
        }
    }
}
