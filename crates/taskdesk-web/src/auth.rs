//! Caller identity.
//!
//! Authentication happens in front of this service: a trusted proxy puts the
//! authenticated user's id in a request header (`auth.user_header`).

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use taskdesk_core::AuthError;
use taskdesk_services::UserId;

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated caller, extracted from the identity header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub UserId);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = state.config.auth.header_name();

        let value = parts
            .headers
            .get(header)
            .ok_or_else(|| AuthError::MissingIdentity(header.to_string()))?;

        let id = value
            .to_str()
            .ok()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|id| *id > 0)
            .ok_or_else(|| AuthError::InvalidIdentity(format!("{:?}", value)))?;

        Ok(CurrentUser(UserId(id)))
    }
}
