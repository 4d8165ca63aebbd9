//! Task types shared by the SQLite store, the service and the web layer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identity of the authenticated caller. Always passed explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub type TaskId = i64;

/// Task status. Exactly three values; anything else is rejected at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the three status values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown task status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for TaskStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A persisted task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub user_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub deadline: NaiveDate,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw creation form. Every field is optional here so that validation can
/// report all missing fields at once instead of failing on the first one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTaskInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Raw partial update. An absent key leaves the field untouched; for
/// `description`, an explicit `null` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTaskInput {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub deadline: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub status: Option<Option<String>>,
}

impl UpdateTaskInput {
    /// Update that only moves the status.
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(Some(status.as_str().to_string())),
            ..Self::default()
        }
    }
}

// Distinguishes `"key": null` (Some(None)) from a missing key (None via default).
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// A creation form that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub deadline: NaiveDate,
    pub status: TaskStatus,
}

/// A validated partial update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub deadline: Option<NaiveDate>,
    pub status: Option<TaskStatus>,
}

impl TaskChanges {
    /// Apply the changes to `task`. Returns true if any field actually changed.
    pub fn apply_to(self, task: &mut Task) -> bool {
        let mut changed = false;

        if let Some(title) = self.title {
            changed |= task.title != title;
            task.title = title;
        }
        if let Some(description) = self.description {
            changed |= task.description != description;
            task.description = description;
        }
        if let Some(deadline) = self.deadline {
            changed |= task.deadline != deadline;
            task.deadline = deadline;
        }
        if let Some(status) = self.status {
            changed |= task.status != status;
            task.status = status;
        }

        changed
    }
}

/// Status filter of a list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(TaskStatus),
}

/// Validated list filter. All present predicates must match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    pub status: StatusFilter,
    /// Exact deadline match
    pub deadline: Option<NaiveDate>,
    /// Only undone tasks whose deadline is on or after this date
    pub upcoming_from: Option<NaiveDate>,
}

impl TaskFilter {
    /// Whether `task` passes the filter. Mirrors the SQL built by the store.
    pub fn matches(&self, task: &Task) -> bool {
        if let StatusFilter::Only(status) = self.status {
            if task.status != status {
                return false;
            }
        }
        if let Some(deadline) = self.deadline {
            if task.deadline != deadline {
                return false;
            }
        }
        if let Some(from) = self.upcoming_from {
            if task.status.is_done() || task.deadline < from {
                return false;
            }
        }
        true
    }
}

/// Raw dashboard query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_date: Option<String>,
}

impl ListQuery {
    /// The filled parameters only, as echoed back to the dashboard.
    pub fn filled(&self) -> ListQuery {
        fn keep(value: &Option<String>) -> Option<String> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        }

        ListQuery {
            status: keep(&self.status),
            deadline: keep(&self.deadline),
            filter_date: keep(&self.filter_date),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn sample(status: TaskStatus, deadline: &str) -> Task {
        Task {
            id: 1,
            user_id: UserId(7),
            title: "Write report".to_string(),
            description: None,
            deadline: deadline.parse().unwrap(),
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [TaskStatus::Pending, TaskStatus::InProgress, TaskStatus::Completed] {
            assert_eq!(status.as_str().parse::<TaskStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_status_rejects_unknown_values() {
        assert!("done".parse::<TaskStatus>().is_err());
        assert!("Completed".parse::<TaskStatus>().is_err());
        assert!("".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, r#""in_progress""#);
    }

    #[test]
    fn test_task_serializes_deadline_as_date() {
        let task = sample(TaskStatus::Pending, "2026-11-05");
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["deadline"], "2026-11-05");
        assert_eq!(json["user_id"], 7);
        assert_eq!(json["status"], "pending");
    }

    #[test]
    fn test_update_input_distinguishes_null_from_missing() {
        let input: UpdateTaskInput =
            serde_json::from_str(r#"{"description": null, "status": "completed"}"#).unwrap();
        assert_eq!(input.description, Some(None));
        assert_eq!(input.status, Some(Some("completed".to_string())));
        assert_eq!(input.title, None);
        assert_eq!(input.deadline, None);
    }

    #[test]
    fn test_changes_report_whether_anything_changed() {
        let mut task = sample(TaskStatus::Pending, "2026-11-05");

        let same = TaskChanges {
            status: Some(TaskStatus::Pending),
            ..TaskChanges::default()
        };
        assert!(!same.apply_to(&mut task));

        let done = TaskChanges {
            status: Some(TaskStatus::Completed),
            ..TaskChanges::default()
        };
        assert!(done.apply_to(&mut task));
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.title, "Write report");
    }

    #[test]
    fn test_filter_matches_upcoming_undone_only() {
        let today: NaiveDate = "2026-10-18".parse().unwrap();
        let filter = TaskFilter {
            upcoming_from: Some(today),
            ..TaskFilter::default()
        };

        assert!(filter.matches(&sample(TaskStatus::Pending, "2026-10-18")));
        assert!(filter.matches(&sample(TaskStatus::InProgress, "2026-12-01")));
        assert!(!filter.matches(&sample(TaskStatus::Pending, "2026-10-17")));
        assert!(!filter.matches(&sample(TaskStatus::Completed, "2026-12-01")));
    }

    #[test]
    fn test_list_query_filled_drops_blank_values() {
        let query = ListQuery {
            status: Some("completed".to_string()),
            deadline: Some("  ".to_string()),
            filter_date: None,
        };
        let filled = query.filled();
        assert_eq!(filled.status.as_deref(), Some("completed"));
        assert!(filled.deadline.is_none());
    }
}
