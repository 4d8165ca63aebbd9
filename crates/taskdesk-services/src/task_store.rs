//! SQLite-based task storage implementation.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::path::Path;
use taskdesk_core::RusqliteErrorExt;

use crate::task::{NewTask, StatusFilter, Task, TaskFilter, TaskId, TaskStatus, UserId};
use crate::task_backend::{TaskBackend, TaskBackendResult};

const SCHEMA_VERSION: i32 = 1;

const DATE_FORMAT: &str = "%Y-%m-%d";

const TASK_COLUMNS: &str =
    "id, user_id, title, description, deadline, status, created_at, updated_at";

/// Local SQLite storage for tasks
pub struct SqliteTaskStore {
    conn: Connection,
}

impl SqliteTaskStore {
    /// Open or create the database
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).context("Failed to create database directory")?;
        }

        let conn = Connection::open(path).context("Failed to open tasks database")?;
        let store = Self { conn };
        store.init_schema()?;

        tracing::info!("Opened task database at {}", path.display());
        Ok(store)
    }

    /// Create an in-memory store (tests and throwaway runs).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        // Cascades only fire with foreign keys enabled on this connection.
        self.conn
            .execute_batch("PRAGMA foreign_keys = ON;")
            .context("Failed to enable foreign keys")?;

        self.conn
            .execute("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)", [])?;

        let version: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| row.get(0))
            .optional()?
            .unwrap_or(0);

        if version > SCHEMA_VERSION {
            anyhow::bail!(
                "Database schema version {} is newer than supported version {}",
                version,
                SCHEMA_VERSION
            );
        }

        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                title TEXT NOT NULL CHECK (length(title) <= 255),
                description TEXT,
                deadline TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending'
                    CHECK (status IN ('pending', 'in_progress', 'completed')),
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_tasks_user_deadline ON tasks(user_id, deadline);
            CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status);",
            )
            .context("Failed to initialize schema")?;

        if version < SCHEMA_VERSION {
            self.conn.execute("DELETE FROM schema_version", [])?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![SCHEMA_VERSION],
            )?;
        }

        Ok(())
    }

    /// Convert a database row to a Task.
    fn row_to_task(row: &rusqlite::Row) -> rusqlite::Result<Task> {
        let deadline_str: String = row.get(4)?;
        let status_str: String = row.get(5)?;
        let created_at_str: String = row.get(6)?;
        let updated_at_str: String = row.get(7)?;

        let deadline = NaiveDate::parse_from_str(&deadline_str, DATE_FORMAT)
            .map_err(|e| conversion_error(4, e))?;
        let status = status_str
            .parse::<TaskStatus>()
            .map_err(|e| conversion_error(5, e))?;

        Ok(Task {
            id: row.get(0)?,
            user_id: UserId(row.get(1)?),
            title: row.get(2)?,
            description: row.get(3)?,
            deadline,
            status,
            created_at: parse_timestamp(6, &created_at_str)?,
            updated_at: parse_timestamp(7, &updated_at_str)?,
        })
    }

    fn list_rows(&self, owner: UserId, filter: &TaskFilter) -> rusqlite::Result<Vec<Task>> {
        let mut sql = format!("SELECT {} FROM tasks WHERE user_id = ?1", TASK_COLUMNS);
        let mut values: Vec<Value> = vec![Value::Integer(owner.0)];

        if let StatusFilter::Only(status) = filter.status {
            values.push(Value::Text(status.as_str().to_string()));
            sql.push_str(&format!(" AND status = ?{}", values.len()));
        }

        if let Some(deadline) = filter.deadline {
            values.push(Value::Text(deadline.format(DATE_FORMAT).to_string()));
            sql.push_str(&format!(" AND deadline = ?{}", values.len()));
        }

        if let Some(from) = filter.upcoming_from {
            values.push(Value::Text(TaskStatus::Completed.as_str().to_string()));
            sql.push_str(&format!(" AND status != ?{}", values.len()));
            values.push(Value::Text(from.format(DATE_FORMAT).to_string()));
            sql.push_str(&format!(" AND deadline >= ?{}", values.len()));
        }

        sql.push_str(" ORDER BY deadline ASC, id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let tasks = stmt
            .query_map(params_from_iter(values), Self::row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tasks)
    }

    fn get_row(&self, id: TaskId) -> rusqlite::Result<Option<Task>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS),
                params![id],
                Self::row_to_task,
            )
            .optional()
    }

    fn insert_row(&self, owner: UserId, task: &NewTask) -> rusqlite::Result<Task> {
        let now = Utc::now();
        let now_str = now.to_rfc3339();

        self.conn.execute(
            "INSERT INTO tasks (user_id, title, description, deadline, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                owner.0,
                task.title,
                task.description,
                task.deadline.format(DATE_FORMAT).to_string(),
                task.status.as_str(),
                now_str,
                now_str,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        tracing::debug!("Created task {} for user {}", id, owner);

        Ok(Task {
            id,
            user_id: owner,
            title: task.title.clone(),
            description: task.description.clone(),
            deadline: task.deadline,
            status: task.status,
            created_at: now,
            updated_at: now,
        })
    }

    fn save_row(&self, task: &Task) -> rusqlite::Result<()> {
        self.conn.execute(
            "UPDATE tasks SET
                title = ?1,
                description = ?2,
                deadline = ?3,
                status = ?4,
                updated_at = ?5
             WHERE id = ?6",
            params![
                task.title,
                task.description,
                task.deadline.format(DATE_FORMAT).to_string(),
                task.status.as_str(),
                task.updated_at.to_rfc3339(),
                task.id,
            ],
        )?;
        Ok(())
    }

    fn delete_user_rows(&self, user: UserId) -> rusqlite::Result<usize> {
        let tx = self.conn.unchecked_transaction()?;

        let count: i64 = tx.query_row(
            "SELECT COUNT(*) FROM tasks WHERE user_id = ?1",
            params![user.0],
            |row| row.get(0),
        )?;
        tx.execute("DELETE FROM users WHERE id = ?1", params![user.0])?;
        tx.commit()?;

        Ok(count as usize)
    }

    /// Get the task count across all users.
    pub fn count(&self) -> TaskBackendResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0))
            .map_err(|e| e.into_database_error())?;
        Ok(count as usize)
    }
}

impl TaskBackend for SqliteTaskStore {
    fn list(&self, owner: UserId, filter: &TaskFilter) -> TaskBackendResult<Vec<Task>> {
        self.list_rows(owner, filter)
            .map_err(|e| e.into_database_error())
    }

    fn get(&self, id: TaskId) -> TaskBackendResult<Option<Task>> {
        self.get_row(id).map_err(|e| e.into_database_error())
    }

    fn insert(&self, owner: UserId, task: &NewTask) -> TaskBackendResult<Task> {
        self.insert_row(owner, task)
            .map_err(|e| e.into_database_error())
    }

    fn save(&self, task: &Task) -> TaskBackendResult<()> {
        self.save_row(task).map_err(|e| e.into_database_error())
    }

    fn delete(&self, id: TaskId) -> TaskBackendResult<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])
            .map_err(|e| e.into_database_error())?;
        Ok(removed > 0)
    }

    fn ensure_user(&self, user: UserId) -> TaskBackendResult<()> {
        self.conn
            .execute(
                "INSERT OR IGNORE INTO users (id, created_at) VALUES (?1, ?2)",
                params![user.0, Utc::now().to_rfc3339()],
            )
            .map_err(|e| e.into_database_error())?;
        Ok(())
    }

    fn delete_user(&self, user: UserId) -> TaskBackendResult<usize> {
        self.delete_user_rows(user)
            .map_err(|e| e.into_database_error())
    }
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}
