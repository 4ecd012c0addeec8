/// Kanban board reordering
///
/// In-memory model of the board view: one column per task status holding an
/// ordered list of task ids. A drop within the same column just reorders
/// that column — no network traffic, since intra-column order is not
/// persisted server-side. A drop into another column splices the task
/// across and reports the single `status` PATCH the caller must issue;
/// column membership is the only durable part of the board.
///
/// # Example
///
/// ```
/// use taskflow_client::board::Board;
/// use taskflow_shared::models::task::TaskStatus;
/// use uuid::Uuid;
///
/// let task = Uuid::new_v4();
/// let mut board = Board::new();
/// board.push(TaskStatus::Todo, task);
///
/// let patch = board
///     .move_task(TaskStatus::Todo, TaskStatus::Doing, 0, 0)
///     .unwrap();
///
/// assert_eq!(patch.unwrap().status, TaskStatus::Doing);
/// ```

use serde::{Deserialize, Serialize};
use taskflow_shared::models::task::{Task, TaskStatus};
use uuid::Uuid;

/// Error type for board operations
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// Source index is outside the source column
    #[error("Source index {index} out of bounds (column has {len} tasks)")]
    SourceOutOfBounds { index: usize, len: usize },

    /// Destination index is outside the destination column
    #[error("Destination index {index} out of bounds (column has {len} tasks)")]
    DestinationOutOfBounds { index: usize, len: usize },
}

/// The status PATCH to issue after a cross-column move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPatch {
    /// Task that moved
    pub task_id: Uuid,

    /// Its new status (the destination column)
    pub status: TaskStatus,
}

/// In-memory Kanban board
#[derive(Debug, Clone, Default)]
pub struct Board {
    columns: [Vec<Uuid>; 4],
}

fn column_index(status: TaskStatus) -> usize {
    TaskStatus::all()
        .iter()
        .position(|s| *s == status)
        .expect("status is a board column")
}

impl Board {
    /// Creates an empty board with one column per status
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a board from a task list, preserving list order per column
    ///
    /// Trashed tasks are skipped.
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut board = Self::new();
        for task in tasks {
            if !task.is_deleted() {
                board.push(task.status, task.id);
            }
        }
        board
    }

    /// Appends a task to the bottom of a column
    pub fn push(&mut self, status: TaskStatus, task_id: Uuid) {
        self.columns[column_index(status)].push(task_id);
    }

    /// The ordered task ids of a column
    pub fn column(&self, status: TaskStatus) -> &[Uuid] {
        &self.columns[column_index(status)]
    }

    /// Total tasks on the board
    pub fn len(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    /// Whether the board holds no tasks
    pub fn is_empty(&self) -> bool {
        self.columns.iter().all(Vec::is_empty)
    }

    /// Applies a drag-and-drop result
    ///
    /// Same-column drops reorder in place and return `None` (nothing to
    /// persist). Cross-column drops splice the task out of the source and
    /// into the destination at `to_index`, returning the status PATCH to
    /// issue. The board state is updated synchronously either way, so the
    /// view reflects the move before the network call resolves.
    pub fn move_task(
        &mut self,
        from: TaskStatus,
        to: TaskStatus,
        from_index: usize,
        to_index: usize,
    ) -> Result<Option<StatusPatch>, BoardError> {
        let from_col = column_index(from);
        let from_len = self.columns[from_col].len();

        if from_index >= from_len {
            return Err(BoardError::SourceOutOfBounds {
                index: from_index,
                len: from_len,
            });
        }

        if from == to {
            // Dropping at the end position equal to len-1 is the last slot
            if to_index >= from_len {
                return Err(BoardError::DestinationOutOfBounds {
                    index: to_index,
                    len: from_len,
                });
            }

            let task_id = self.columns[from_col].remove(from_index);
            self.columns[from_col].insert(to_index, task_id);
            return Ok(None);
        }

        let to_col = column_index(to);
        let to_len = self.columns[to_col].len();

        // Insertion may target one past the end (drop at the bottom)
        if to_index > to_len {
            return Err(BoardError::DestinationOutOfBounds {
                index: to_index,
                len: to_len,
            });
        }

        let task_id = self.columns[from_col].remove(from_index);
        self.columns[to_col].insert(to_index, task_id);

        Ok(Some(StatusPatch {
            task_id,
            status: to,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(todo: usize, doing: usize) -> (Board, Vec<Uuid>, Vec<Uuid>) {
        let mut board = Board::new();
        let todo_ids: Vec<Uuid> = (0..todo).map(|_| Uuid::new_v4()).collect();
        let doing_ids: Vec<Uuid> = (0..doing).map(|_| Uuid::new_v4()).collect();

        for id in &todo_ids {
            board.push(TaskStatus::Todo, *id);
        }
        for id in &doing_ids {
            board.push(TaskStatus::Doing, *id);
        }

        (board, todo_ids, doing_ids)
    }

    #[test]
    fn test_same_column_reorder_needs_no_patch() {
        let (mut board, todo, _) = board_with(3, 0);

        let patch = board
            .move_task(TaskStatus::Todo, TaskStatus::Todo, 0, 2)
            .unwrap();

        assert!(patch.is_none());
        assert_eq!(board.column(TaskStatus::Todo), &[todo[1], todo[2], todo[0]]);
    }

    #[test]
    fn test_cross_column_move_reports_patch() {
        let (mut board, todo, doing) = board_with(2, 2);

        let patch = board
            .move_task(TaskStatus::Todo, TaskStatus::Doing, 1, 1)
            .unwrap()
            .expect("cross-column move needs a patch");

        assert_eq!(patch.task_id, todo[1]);
        assert_eq!(patch.status, TaskStatus::Doing);
        assert_eq!(board.column(TaskStatus::Todo), &[todo[0]]);
        assert_eq!(
            board.column(TaskStatus::Doing),
            &[doing[0], todo[1], doing[1]]
        );
    }

    #[test]
    fn test_cross_column_move_to_bottom() {
        let (mut board, todo, doing) = board_with(1, 2);

        // to_index == destination len drops at the bottom
        let patch = board
            .move_task(TaskStatus::Todo, TaskStatus::Doing, 0, 2)
            .unwrap();

        assert!(patch.is_some());
        assert_eq!(
            board.column(TaskStatus::Doing),
            &[doing[0], doing[1], todo[0]]
        );
        assert!(board.column(TaskStatus::Todo).is_empty());
    }

    #[test]
    fn test_out_of_bounds_source() {
        let (mut board, _, _) = board_with(1, 0);

        let err = board
            .move_task(TaskStatus::Todo, TaskStatus::Doing, 5, 0)
            .unwrap_err();

        assert_eq!(err, BoardError::SourceOutOfBounds { index: 5, len: 1 });
    }

    #[test]
    fn test_out_of_bounds_destination() {
        let (mut board, _, _) = board_with(1, 1);

        let err = board
            .move_task(TaskStatus::Todo, TaskStatus::Doing, 0, 3)
            .unwrap_err();

        assert_eq!(
            err,
            BoardError::DestinationOutOfBounds { index: 3, len: 1 }
        );
    }

    #[test]
    fn test_board_len() {
        let (board, _, _) = board_with(2, 3);
        assert_eq!(board.len(), 5);
        assert!(!board.is_empty());
        assert!(Board::new().is_empty());
    }
}
