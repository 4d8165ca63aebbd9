//! Task storage backend trait.
//!
//! The service only talks to storage through `TaskBackend`, so ownership and
//! validation rules live in one place regardless of where rows are kept.

use taskdesk_core::DatabaseError;

use crate::task::{NewTask, Task, TaskFilter, TaskId, UserId};

/// Result type for backend operations.
pub type TaskBackendResult<T> = Result<T, DatabaseError>;

/// Storage for tasks and the user rows they hang off.
///
/// Implementations don't need to be Sync - the service wraps them in a Mutex.
pub trait TaskBackend: Send {
    /// Tasks owned by `owner` that match `filter`, ordered by deadline
    /// ascending (ties by id).
    fn list(&self, owner: UserId, filter: &TaskFilter) -> TaskBackendResult<Vec<Task>>;

    /// Get a task by ID, whoever owns it.
    ///
    /// Returns `None` if the task doesn't exist.
    fn get(&self, id: TaskId) -> TaskBackendResult<Option<Task>>;

    /// Persist a new task for `owner` and return it with its assigned id.
    fn insert(&self, owner: UserId, task: &NewTask) -> TaskBackendResult<Task>;

    /// Write every mutable field of `task` back to its row.
    fn save(&self, task: &Task) -> TaskBackendResult<()>;

    /// Delete a task. Returns false if no row was removed.
    fn delete(&self, id: TaskId) -> TaskBackendResult<bool>;

    /// Make sure a user row exists for `user`.
    fn ensure_user(&self, user: UserId) -> TaskBackendResult<()>;

    /// Delete a user; their tasks go with them. Returns how many tasks were removed.
    fn delete_user(&self, user: UserId) -> TaskBackendResult<usize>;
}
