//! Task service: validation and ownership on top of a `TaskBackend`.
//!
//! Every method takes the caller's identity explicitly. Storage work runs on
//! the blocking pool; each call holds the backend lock for its whole
//! read-check-write, so a single operation never interleaves with another.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use taskdesk_core::DatabaseError;
use thiserror::Error;
use tracing::instrument;

use crate::policy::owns;
use crate::task::{
    CreateTaskInput, Task, TaskChanges, TaskFilter, TaskId, TaskStatus, UpdateTaskInput, UserId,
};
use crate::task_backend::TaskBackend;
use crate::validation::{validate_create, validate_update, CreateStatusPolicy, ValidationErrors};

/// Errors surfaced by task operations.
#[derive(Debug, Error)]
pub enum TaskServiceError {
    /// One or more fields failed validation. Nothing was written.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Missing task or task owned by someone else. Deliberately the same error.
    #[error("This action is unauthorized.")]
    Forbidden,

    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),

    #[error("Storage worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

pub type TaskServiceResult<T> = Result<T, TaskServiceError>;

/// Cloneable handle to the task service.
#[derive(Clone)]
pub struct TaskService {
    backend: Arc<Mutex<Box<dyn TaskBackend>>>,
    create_policy: CreateStatusPolicy,
}

impl TaskService {
    pub fn new<B>(backend: B, create_policy: CreateStatusPolicy) -> Self
    where
        B: TaskBackend + 'static,
    {
        Self {
            backend: Arc::new(Mutex::new(Box::new(backend))),
            create_policy,
        }
    }

    async fn run<T, F>(&self, op: F) -> TaskServiceResult<T>
    where
        F: FnOnce(&dyn TaskBackend) -> TaskServiceResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let backend = self.backend.clone();
        tokio::task::spawn_blocking(move || {
            let guard = backend.lock();
            op(&**guard)
        })
        .await?
    }

    /// Tasks owned by `owner` matching `filter`, earliest deadline first.
    #[instrument(skip(self), level = "debug")]
    pub async fn list(&self, owner: UserId, filter: TaskFilter) -> TaskServiceResult<Vec<Task>> {
        self.run(move |backend| Ok(backend.list(owner, &filter)?))
            .await
    }

    /// Validate and persist a new task owned by `owner`.
    #[instrument(skip(self, input), level = "info")]
    pub async fn create(&self, owner: UserId, input: CreateTaskInput) -> TaskServiceResult<Task> {
        let new_task = validate_create(&input, self.create_policy)?;

        let task = self
            .run(move |backend| {
                backend.ensure_user(owner)?;
                Ok(backend.insert(owner, &new_task)?)
            })
            .await?;

        tracing::info!("Task {} created", task.id);
        Ok(task)
    }

    /// Apply a partial update. Ownership is checked before the input is
    /// looked at, so a non-owner learns nothing about the task.
    #[instrument(skip(self, input), level = "info")]
    pub async fn update(
        &self,
        owner: UserId,
        id: TaskId,
        input: UpdateTaskInput,
    ) -> TaskServiceResult<Task> {
        self.run(move |backend| {
            let task = authorize(backend, owner, id)?;
            let changes = validate_update(&input)?;
            apply_changes(backend, task, changes)
        })
        .await
    }

    /// Shortcut: mark a task completed without touching any other field.
    #[instrument(skip(self), level = "info")]
    pub async fn complete(&self, owner: UserId, id: TaskId) -> TaskServiceResult<Task> {
        self.run(move |backend| {
            let task = authorize(backend, owner, id)?;
            let changes = TaskChanges {
                status: Some(TaskStatus::Completed),
                ..TaskChanges::default()
            };
            apply_changes(backend, task, changes)
        })
        .await
    }

    /// Permanently delete a task.
    #[instrument(skip(self), level = "info")]
    pub async fn delete(&self, owner: UserId, id: TaskId) -> TaskServiceResult<()> {
        self.run(move |backend| {
            let task = authorize(backend, owner, id)?;
            backend.delete(task.id)?;
            Ok(())
        })
        .await?;

        tracing::info!("Task {} deleted", id);
        Ok(())
    }

    /// Delete `user` and, through the cascade, every task they own.
    #[instrument(skip(self), level = "info")]
    pub async fn delete_user(&self, user: UserId) -> TaskServiceResult<usize> {
        let removed = self
            .run(move |backend| Ok(backend.delete_user(user)?))
            .await?;

        tracing::info!("User {} deleted with {} tasks", user, removed);
        Ok(removed)
    }
}

fn authorize(backend: &dyn TaskBackend, owner: UserId, id: TaskId) -> TaskServiceResult<Task> {
    match backend.get(id)? {
        Some(task) if owns(owner, &task) => Ok(task),
        _ => {
            tracing::warn!("User {} denied access to task {}", owner, id);
            Err(TaskServiceError::Forbidden)
        }
    }
}

fn apply_changes(
    backend: &dyn TaskBackend,
    mut task: Task,
    changes: TaskChanges,
) -> TaskServiceResult<Task> {
    if changes.apply_to(&mut task) {
        task.updated_at = Utc::now();
        backend.save(&task)?;
        tracing::debug!("Task {} updated", task.id);
    }
    Ok(task)
}
