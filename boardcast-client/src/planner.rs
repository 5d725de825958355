/// Drag reorder planner
///
/// Pure translation of a drag gesture into the set of position updates
/// to persist. The task is spliced out of the source sequence and into
/// the destination sequence, then every touched list is renumbered to
/// the dense sequence `0..n-1` by position.
///
/// Renumbering whole lists on every drag trades update volume for two
/// things: position values never collide or drift into fractional
/// gaps, and the reconciler can treat the resulting batch as the full
/// truth for each touched list.
///
/// Dropping a task exactly where it already is produces no updates.

use boardcast_shared::models::board::ListWithTasks;
use boardcast_shared::models::task::PositionUpdate;
use thiserror::Error;
use uuid::Uuid;

/// A drag gesture: where the task was picked up and where it was dropped
#[derive(Debug, Clone, Copy)]
pub struct DragInput {
    /// The dragged task
    pub task_id: Uuid,

    /// List the drag started in
    pub source_list_id: Uuid,

    /// Index of the task within the source list at drag start
    pub source_index: usize,

    /// List the task was dropped into
    pub dest_list_id: Uuid,

    /// Index the task was dropped at within the destination list
    pub dest_index: usize,
}

/// Planner failure: the gesture does not match the current board state
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    /// Source or destination list is not on the board
    #[error("list {0} not found on board")]
    UnknownList(Uuid),

    /// Source index is outside the source list
    #[error("source index {index} out of bounds for list of {len} tasks")]
    SourceIndexOutOfBounds { index: usize, len: usize },

    /// Destination index is past the end of the destination sequence
    #[error("destination index {index} out of bounds for list of {len} tasks")]
    DestIndexOutOfBounds { index: usize, len: usize },

    /// The task at the source index is not the dragged task
    #[error("task at source index is {found}, expected {expected}")]
    TaskMismatch { expected: Uuid, found: Uuid },
}

/// Plans the position updates for a drag gesture
///
/// Returns one update per task in each touched list (the complete
/// renumbered sequence), or an empty set when the drop site equals the
/// pick-up site.
///
/// # Errors
///
/// Fails if the gesture refers to lists or indices that do not match
/// `lists`; the board state may have changed under the drag.
pub fn plan_reorder(lists: &[ListWithTasks], input: DragInput) -> Result<Vec<PositionUpdate>, PlanError> {
    if input.source_list_id == input.dest_list_id && input.source_index == input.dest_index {
        return Ok(Vec::new());
    }

    let source = lists
        .iter()
        .find(|l| l.list.id == input.source_list_id)
        .ok_or(PlanError::UnknownList(input.source_list_id))?;

    if input.source_index >= source.tasks.len() {
        return Err(PlanError::SourceIndexOutOfBounds {
            index: input.source_index,
            len: source.tasks.len(),
        });
    }

    let dragged = &source.tasks[input.source_index];
    if dragged.id != input.task_id {
        return Err(PlanError::TaskMismatch {
            expected: input.task_id,
            found: dragged.id,
        });
    }

    let mut updates = Vec::new();

    if input.source_list_id == input.dest_list_id {
        // Same list: splice within one sequence and renumber it
        let mut sequence: Vec<Uuid> = source.tasks.iter().map(|t| t.id).collect();

        // The dragged task is still in the sequence, so the last valid
        // drop index is len - 1
        if input.dest_index >= sequence.len() {
            return Err(PlanError::DestIndexOutOfBounds {
                index: input.dest_index,
                len: sequence.len(),
            });
        }

        let moved = sequence.remove(input.source_index);
        sequence.insert(input.dest_index, moved);

        push_renumbered(&mut updates, input.dest_list_id, &sequence);
    } else {
        let dest = lists
            .iter()
            .find(|l| l.list.id == input.dest_list_id)
            .ok_or(PlanError::UnknownList(input.dest_list_id))?;

        if input.dest_index > dest.tasks.len() {
            return Err(PlanError::DestIndexOutOfBounds {
                index: input.dest_index,
                len: dest.tasks.len(),
            });
        }

        let mut source_seq: Vec<Uuid> = source.tasks.iter().map(|t| t.id).collect();
        let moved = source_seq.remove(input.source_index);

        let mut dest_seq: Vec<Uuid> = dest.tasks.iter().map(|t| t.id).collect();
        dest_seq.insert(input.dest_index, moved);

        // Source closes its gap, destination makes room; both end dense
        push_renumbered(&mut updates, input.source_list_id, &source_seq);
        push_renumbered(&mut updates, input.dest_list_id, &dest_seq);
    }

    Ok(updates)
}

/// Emits one update per task, positions `0..n-1` by sequence index
fn push_renumbered(updates: &mut Vec<PositionUpdate>, list_id: Uuid, sequence: &[Uuid]) {
    for (index, task_id) in sequence.iter().enumerate() {
        updates.push(PositionUpdate {
            task_id: *task_id,
            list_id,
            position: index as f64,
        });
    }
}
