use axum::{
    extract::{Query, State},
    http::{HeaderMap, Uri},
    response::Response,
};
use chrono::Utc;
use serde::Serialize;
use taskdesk_services::{parse_filter, ListQuery, Task, UserId};

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::page::{self, Page};
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct DashboardProps {
    tasks: Vec<Task>,
    filters: ListQuery,
    auth: AuthProps,
}

#[derive(Debug, Serialize)]
struct AuthProps {
    user: UserId,
}

/// The caller's task list, filtered by the query string.
pub async fn show(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Response, ApiError> {
    let filter = parse_filter(&query, Utc::now().date_naive())?;
    let tasks = state.tasks.list(user, filter).await?;

    let page = Page {
        component: "Dashboard",
        props: DashboardProps {
            tasks,
            filters: query.filled(),
            auth: AuthProps { user },
        },
        url: uri.to_string(),
    };

    page::respond(&headers, &page)
}
