pub mod policy;
pub mod task;
pub mod task_backend;
pub mod task_service;
pub mod task_store;
pub mod validation;

pub use policy::owns;
pub use task::{
    CreateTaskInput, ListQuery, NewTask, StatusFilter, Task, TaskChanges, TaskFilter, TaskId,
    TaskStatus, UpdateTaskInput, UserId,
};
pub use task_backend::{TaskBackend, TaskBackendResult};
pub use task_service::{TaskService, TaskServiceError, TaskServiceResult};
pub use task_store::SqliteTaskStore;
pub use validation::{parse_filter, CreateStatusPolicy, ValidationErrors, MAX_TITLE_LENGTH};
