use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Redirect,
    Json,
};
use serde_json::Value;
use taskdesk_services::{CreateTaskInput, TaskId, UpdateTaskInput};

use super::decode_form;
use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;

const DASHBOARD: &str = "/dashboard";

const TASK_FIELDS: &[&str] = &["title", "description", "deadline", "status"];

pub async fn store(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Redirect, ApiError> {
    let Json(body) = payload?;
    let input: CreateTaskInput = decode_form(body, TASK_FIELDS)?;
    state.tasks.create(user, input).await?;
    Ok(Redirect::to(DASHBOARD))
}

/// Partial update. Serves both PUT and PATCH.
pub async fn update(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<TaskId>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Redirect, ApiError> {
    let Json(body) = payload?;
    let input: UpdateTaskInput = decode_form(body, TASK_FIELDS)?;
    state.tasks.update(user, id, input).await?;
    Ok(Redirect::to(DASHBOARD))
}

pub async fn complete(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<TaskId>,
) -> Result<Redirect, ApiError> {
    state.tasks.complete(user, id).await?;
    Ok(Redirect::to(DASHBOARD))
}

pub async fn destroy(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<TaskId>,
) -> Result<Redirect, ApiError> {
    state.tasks.delete(user, id).await?;
    Ok(Redirect::to(DASHBOARD))
}
