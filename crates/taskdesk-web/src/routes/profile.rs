use axum::{extract::State, response::Redirect};

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Delete the caller's account and every task they own.
pub async fn destroy(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Redirect, ApiError> {
    let removed = state.tasks.delete_user(user).await?;
    tracing::info!("Account {} closed, {} tasks removed", user, removed);
    Ok(Redirect::to("/"))
}
