//! Field-scoped validation of task forms and list filters.
//!
//! Strings are trimmed before any rule runs, and a value that is empty after
//! trimming counts as absent.

use chrono::{DateTime, Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::task::{
    CreateTaskInput, ListQuery, NewTask, StatusFilter, TaskChanges, TaskFilter, TaskStatus,
    UpdateTaskInput,
};

/// Maximum title length in characters.
pub const MAX_TITLE_LENGTH: usize = 255;

/// Field name → messages. Ordered so responses are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First message overall, used as the summary line of a 422 response.
    pub fn first_message(&self) -> Option<&str> {
        self.0.values().flatten().next().map(String::as_str)
    }

    fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Which statuses a brand new task may start in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreateStatusPolicy {
    /// `pending` or `in_progress`; a task cannot be born completed.
    #[default]
    OpenOnly,
    /// Any of the three statuses.
    Any,
}

impl CreateStatusPolicy {
    pub fn from_allow_completed(allow_completed: bool) -> Self {
        if allow_completed {
            CreateStatusPolicy::Any
        } else {
            CreateStatusPolicy::OpenOnly
        }
    }

    pub fn allows(&self, status: TaskStatus) -> bool {
        match self {
            CreateStatusPolicy::OpenOnly => !status.is_done(),
            CreateStatusPolicy::Any => true,
        }
    }
}

fn filled(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn required_message(field: &str) -> String {
    format!("The {} field is required.", field)
}

fn check_title(title: &str, errors: &mut ValidationErrors) {
    if title.chars().count() > MAX_TITLE_LENGTH {
        errors.add(
            "title",
            format!(
                "The title field must not be greater than {} characters.",
                MAX_TITLE_LENGTH
            ),
        );
    }
}

/// Deadlines are stored as `YYYY-MM-DD` text and compared as strings, which
/// only orders correctly for four-digit years.
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1..=9999;

/// Parse a calendar date. Accepts `YYYY-MM-DD` or an RFC 3339 timestamp,
/// whose date part is kept. Years outside 1..=9999 are rejected.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
        .filter(|date| YEAR_RANGE.contains(&date.year()))
}

fn check_date(field: &str, value: &str, errors: &mut ValidationErrors) -> Option<NaiveDate> {
    let parsed = parse_date(value);
    if parsed.is_none() {
        errors.add(field, format!("The {} field must be a valid date.", field));
    }
    parsed
}

fn check_status(
    value: &str,
    allowed: impl Fn(TaskStatus) -> bool,
    errors: &mut ValidationErrors,
) -> Option<TaskStatus> {
    match value.parse::<TaskStatus>() {
        Ok(status) if allowed(status) => Some(status),
        _ => {
            errors.add("status", "The selected status is invalid.");
            None
        }
    }
}

/// Validate a creation form. Reports every failing field.
pub fn validate_create(
    input: &CreateTaskInput,
    policy: CreateStatusPolicy,
) -> Result<NewTask, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let title = match filled(input.title.as_deref()) {
        Some(title) => {
            check_title(title, &mut errors);
            Some(title.to_string())
        }
        None => {
            errors.add("title", required_message("title"));
            None
        }
    };

    let description = filled(input.description.as_deref()).map(str::to_string);

    let deadline = match filled(input.deadline.as_deref()) {
        Some(value) => check_date("deadline", value, &mut errors),
        None => {
            errors.add("deadline", required_message("deadline"));
            None
        }
    };

    let status = match filled(input.status.as_deref()) {
        Some(value) => check_status(value, |s| policy.allows(s), &mut errors),
        None => {
            errors.add("status", required_message("status"));
            None
        }
    };

    match (title, deadline, status) {
        (Some(title), Some(deadline), Some(status)) if errors.is_empty() => Ok(NewTask {
            title,
            description,
            deadline,
            status,
        }),
        _ => Err(errors),
    }
}

/// Validate a partial update. Only supplied fields are checked; a supplied
/// required field may not be null or blank.
pub fn validate_update(input: &UpdateTaskInput) -> Result<TaskChanges, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let mut changes = TaskChanges::default();

    if let Some(title) = &input.title {
        match filled(title.as_deref()) {
            Some(title) => {
                check_title(title, &mut errors);
                changes.title = Some(title.to_string());
            }
            None => errors.add("title", required_message("title")),
        }
    }

    if let Some(description) = &input.description {
        changes.description = Some(filled(description.as_deref()).map(str::to_string));
    }

    if let Some(deadline) = &input.deadline {
        match filled(deadline.as_deref()) {
            Some(value) => changes.deadline = check_date("deadline", value, &mut errors),
            None => errors.add("deadline", required_message("deadline")),
        }
    }

    if let Some(status) = &input.status {
        match filled(status.as_deref()) {
            Some(value) => changes.status = check_status(value, |_| true, &mut errors),
            None => errors.add("status", required_message("status")),
        }
    }

    errors.into_result(changes)
}

/// Turn the dashboard query string into a filter. `today` anchors the
/// `filter_date=1` toggle.
pub fn parse_filter(query: &ListQuery, today: NaiveDate) -> Result<TaskFilter, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let mut filter = TaskFilter::default();

    if let Some(value) = filled(query.status.as_deref()) {
        if value != "all" {
            if let Some(status) = check_status(value, |_| true, &mut errors) {
                filter.status = StatusFilter::Only(status);
            }
        }
    }

    if let Some(value) = filled(query.deadline.as_deref()) {
        filter.deadline = check_date("deadline", value, &mut errors);
    }

    if filled(query.filter_date.as_deref()) == Some("1") {
        filter.upcoming_from = Some(today);
    }

    errors.into_result(filter)
}
