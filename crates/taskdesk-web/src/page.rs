//! Page objects for the dashboard.
//!
//! A page is `{component, props, url}`. Requests made by the dashboard script
//! (`X-Inertia: true`) or asking for JSON get the page object itself; a plain
//! browser navigation gets the HTML shell with the page embedded.

use axum::{
    http::{header, HeaderMap, HeaderValue},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use taskdesk_core::AppError;

use crate::error::ApiError;

pub const INERTIA_HEADER: &str = "x-inertia";

const SHELL: &str = include_str!("../assets/dashboard.html");
const PAGE_PLACEHOLDER: &str = "{{page}}";

#[derive(Debug, Serialize)]
pub struct Page<P> {
    pub component: &'static str,
    pub props: P,
    pub url: String,
}

/// Whether the client asked for the page object rather than the HTML shell.
pub fn wants_json(headers: &HeaderMap) -> bool {
    let inertia = headers
        .get(INERTIA_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("true"));

    let accepts_json = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"));

    inertia || accepts_json
}

/// The HTML shell with `page` embedded in the root element's `data-page`.
pub fn render_shell<P: Serialize>(page: &Page<P>) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(page)?;
    Ok(SHELL.replace(PAGE_PLACEHOLDER, &escape_html(&json)))
}

pub fn respond<P: Serialize>(headers: &HeaderMap, page: &Page<P>) -> Result<Response, ApiError> {
    let vary = [(header::VARY, HeaderValue::from_static("X-Inertia"))];

    if wants_json(headers) {
        let inertia = (
            header::HeaderName::from_static(INERTIA_HEADER),
            HeaderValue::from_static("true"),
        );
        return Ok((vary, [inertia], Json(page)).into_response());
    }

    let html = render_shell(page).map_err(|e| ApiError::Internal(AppError::Other(e.into())))?;
    Ok((vary, Html(html)).into_response())
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
