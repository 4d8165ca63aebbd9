//! Ownership rule applied before every mutation.

use crate::task::{Task, UserId};

/// A task is visible and mutable only by the user who created it.
pub fn owns(user: UserId, task: &Task) -> bool {
    task.user_id == user
}
