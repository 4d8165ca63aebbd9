//! End-to-end tests for TaskService over a file-backed SQLite store.
//!
//! These exercise ownership, filtering and the account cascade through the
//! public API only.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use chrono::NaiveDate;
use taskdesk_services::{
    parse_filter, CreateStatusPolicy, CreateTaskInput, ListQuery, SqliteTaskStore, StatusFilter,
    TaskFilter, TaskService, TaskServiceError, TaskStatus, UpdateTaskInput, UserId,
};
use tempfile::TempDir;

const ALICE: UserId = UserId(1);
const BOB: UserId = UserId(2);

/// Helper to open a service over a fresh database file
fn service(dir: &TempDir) -> TaskService {
    let store = SqliteTaskStore::open(&dir.path().join("tasks.db")).unwrap();
    TaskService::new(store, CreateStatusPolicy::default())
}

fn form(title: &str, deadline: &str, status: &str) -> CreateTaskInput {
    CreateTaskInput {
        title: Some(title.to_string()),
        description: None,
        deadline: Some(deadline.to_string()),
        status: Some(status.to_string()),
    }
}

fn date(value: &str) -> NaiveDate {
    value.parse().unwrap()
}

#[tokio::test]
async fn test_list_is_ordered_by_deadline() {
    let dir = TempDir::new().unwrap();
    let svc = service(&dir);

    svc.create(ALICE, form("Later", "2026-12-24", "pending")).await.unwrap();
    svc.create(ALICE, form("Soon", "2026-10-20", "in_progress")).await.unwrap();
    svc.create(ALICE, form("Middle", "2026-11-11", "pending")).await.unwrap();

    let titles: Vec<String> = svc
        .list(ALICE, TaskFilter::default())
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, vec!["Soon", "Middle", "Later"]);
}

#[tokio::test]
async fn test_users_never_see_each_others_tasks() {
    let dir = TempDir::new().unwrap();
    let svc = service(&dir);

    svc.create(ALICE, form("Alice's", "2026-11-01", "pending")).await.unwrap();
    svc.create(BOB, form("Bob's", "2026-11-01", "pending")).await.unwrap();

    let alice_tasks = svc.list(ALICE, TaskFilter::default()).await.unwrap();
    assert_eq!(alice_tasks.len(), 1);
    assert!(alice_tasks.iter().all(|t| t.user_id == ALICE));
}

#[tokio::test]
async fn test_cross_user_mutations_are_denied_and_change_nothing() {
    let dir = TempDir::new().unwrap();
    let svc = service(&dir);

    let task = svc.create(ALICE, form("Private", "2026-11-01", "pending")).await.unwrap();

    let update = svc
        .update(BOB, task.id, UpdateTaskInput::status(TaskStatus::Completed))
        .await;
    assert!(matches!(update, Err(TaskServiceError::Forbidden)));

    let complete = svc.complete(BOB, task.id).await;
    assert!(matches!(complete, Err(TaskServiceError::Forbidden)));

    let delete = svc.delete(BOB, task.id).await;
    assert!(matches!(delete, Err(TaskServiceError::Forbidden)));

    let tasks = svc.list(ALICE, TaskFilter::default()).await.unwrap();
    assert_eq!(tasks, vec![task]);
}

#[tokio::test]
async fn test_status_filter_returns_only_that_status() {
    let dir = TempDir::new().unwrap();
    let svc = service(&dir);

    let a = svc.create(ALICE, form("A", "2026-11-01", "pending")).await.unwrap();
    svc.create(ALICE, form("B", "2026-11-02", "pending")).await.unwrap();
    svc.complete(ALICE, a.id).await.unwrap();

    let query = ListQuery {
        status: Some("completed".to_string()),
        ..ListQuery::default()
    };
    let filter = parse_filter(&query, date("2026-10-18")).unwrap();
    assert_eq!(filter.status, StatusFilter::Only(TaskStatus::Completed));

    let done = svc.list(ALICE, filter).await.unwrap();
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].id, a.id);
}

#[tokio::test]
async fn test_deadline_and_upcoming_filters() {
    let dir = TempDir::new().unwrap();
    let svc = service(&dir);

    svc.create(ALICE, form("Past", "2026-10-01", "pending")).await.unwrap();
    let today = svc.create(ALICE, form("Today", "2026-10-18", "pending")).await.unwrap();
    let next = svc.create(ALICE, form("Next", "2026-10-30", "in_progress")).await.unwrap();
    let finished = svc.create(ALICE, form("Finished", "2026-10-30", "pending")).await.unwrap();
    svc.complete(ALICE, finished.id).await.unwrap();

    let exact = ListQuery {
        deadline: Some("2026-10-18".to_string()),
        ..ListQuery::default()
    };
    let tasks = svc
        .list(ALICE, parse_filter(&exact, date("2026-10-18")).unwrap())
        .await
        .unwrap();
    assert_eq!(tasks.iter().map(|t| t.id).collect::<Vec<_>>(), vec![today.id]);

    let upcoming = ListQuery {
        filter_date: Some("1".to_string()),
        ..ListQuery::default()
    };
    let tasks = svc
        .list(ALICE, parse_filter(&upcoming, date("2026-10-18")).unwrap())
        .await
        .unwrap();
    assert_eq!(
        tasks.iter().map(|t| t.id).collect::<Vec<_>>(),
        vec![today.id, next.id]
    );
}

#[tokio::test]
async fn test_title_length_boundary() {
    let dir = TempDir::new().unwrap();
    let svc = service(&dir);

    let ok = svc
        .create(ALICE, form(&"a".repeat(255), "2026-11-01", "pending"))
        .await;
    assert!(ok.is_ok());

    let too_long = svc
        .create(ALICE, form(&"a".repeat(256), "2026-11-01", "pending"))
        .await;
    match too_long {
        Err(TaskServiceError::Validation(errors)) => assert!(errors.has("title")),
        other => panic!("expected a title validation error, got {:?}", other),
    }

    assert_eq!(svc.list(ALICE, TaskFilter::default()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_five_digit_year_is_rejected_and_order_holds() {
    let dir = TempDir::new().unwrap();
    let svc = service(&dir);

    svc.create(ALICE, form("Near", "2026-11-01", "pending")).await.unwrap();
    let far = svc.create(ALICE, form("Far", "+10000-01-01", "pending")).await;
    match far {
        Err(TaskServiceError::Validation(errors)) => assert!(errors.has("deadline")),
        other => panic!("expected a deadline validation error, got {:?}", other),
    }

    svc.create(ALICE, form("Last", "9999-12-31", "pending")).await.unwrap();

    let upcoming = ListQuery {
        filter_date: Some("1".to_string()),
        ..ListQuery::default()
    };
    let titles: Vec<String> = svc
        .list(ALICE, parse_filter(&upcoming, date("2026-10-18")).unwrap())
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, vec!["Near", "Last"]);
}

#[tokio::test]
async fn test_completed_is_rejected_on_create_by_default() {
    let dir = TempDir::new().unwrap();
    let svc = service(&dir);

    let result = svc.create(ALICE, form("Done already", "2026-11-01", "completed")).await;
    match result {
        Err(TaskServiceError::Validation(errors)) => assert!(errors.has("status")),
        other => panic!("expected a status validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_completed_on_create_when_allowed() {
    let dir = TempDir::new().unwrap();
    let store = SqliteTaskStore::open(&dir.path().join("tasks.db")).unwrap();
    let svc = TaskService::new(store, CreateStatusPolicy::from_allow_completed(true));

    let task = svc
        .create(ALICE, form("Done already", "2026-11-01", "completed"))
        .await
        .unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
}

#[tokio::test]
async fn test_status_only_update_preserves_other_fields() {
    let dir = TempDir::new().unwrap();
    let svc = service(&dir);

    let mut input = form("Report", "2026-11-15", "pending");
    input.description = Some("quarterly numbers".to_string());
    let task = svc.create(ALICE, input).await.unwrap();

    let updated = svc
        .update(ALICE, task.id, UpdateTaskInput::status(TaskStatus::InProgress))
        .await
        .unwrap();
    assert_eq!(updated.status, TaskStatus::InProgress);
    assert_eq!(updated.title, "Report");
    assert_eq!(updated.description.as_deref(), Some("quarterly numbers"));
    assert_eq!(updated.deadline, date("2026-11-15"));
}

#[tokio::test]
async fn test_explicit_null_clears_description() {
    let dir = TempDir::new().unwrap();
    let svc = service(&dir);

    let mut input = form("Report", "2026-11-15", "pending");
    input.description = Some("to be removed".to_string());
    let task = svc.create(ALICE, input).await.unwrap();

    let patch: UpdateTaskInput = serde_json::from_str(r#"{"description": null}"#).unwrap();
    let updated = svc.update(ALICE, task.id, patch).await.unwrap();
    assert_eq!(updated.description, None);
    assert_eq!(updated.title, "Report");
}

#[tokio::test]
async fn test_deleted_task_disappears() {
    let dir = TempDir::new().unwrap();
    let svc = service(&dir);

    let task = svc.create(ALICE, form("Gone", "2026-11-01", "pending")).await.unwrap();
    svc.delete(ALICE, task.id).await.unwrap();

    assert!(svc.list(ALICE, TaskFilter::default()).await.unwrap().is_empty());

    // A second delete finds nothing to own.
    let again = svc.delete(ALICE, task.id).await;
    assert!(matches!(again, Err(TaskServiceError::Forbidden)));
}

#[tokio::test]
async fn test_deleting_user_removes_their_tasks_only() {
    let dir = TempDir::new().unwrap();
    let svc = service(&dir);

    svc.create(ALICE, form("One", "2026-11-01", "pending")).await.unwrap();
    svc.create(ALICE, form("Two", "2026-11-02", "pending")).await.unwrap();
    svc.create(BOB, form("Bob's", "2026-11-03", "pending")).await.unwrap();

    let removed = svc.delete_user(ALICE).await.unwrap();
    assert_eq!(removed, 2);

    assert!(svc.list(ALICE, TaskFilter::default()).await.unwrap().is_empty());
    assert_eq!(svc.list(BOB, TaskFilter::default()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_tasks_survive_reopen() {
    let dir = TempDir::new().unwrap();

    let task = service(&dir)
        .create(ALICE, form("Persistent", "2026-11-01", "pending"))
        .await
        .unwrap();

    let tasks = service(&dir).list(ALICE, TaskFilter::default()).await.unwrap();
    assert_eq!(tasks, vec![task]);
}
