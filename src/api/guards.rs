use async_trait::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::{header, request::Parts, HeaderMap};

use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::db::models::{Presentation, User};
use crate::db::types::UserRole;
use crate::repositories;
use crate::services::session_store::{self, SESSION_COOKIE};

pub(crate) struct CurrentUser(pub(crate) User);
pub(crate) struct CurrentAdmin(pub(crate) User);

/// Session token from the HTTP-only cookie, with a Bearer fallback for
/// non-browser clients.
pub(crate) fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(cookie_header) = headers.get(header::COOKIE).and_then(|value| value.to_str().ok())
    {
        for pair in cookie_header.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            if parts.next() == Some(SESSION_COOKIE) {
                if let Some(value) = parts.next().filter(|value| !value.is_empty()) {
                    return Some(value.to_string());
                }
            }
        }
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|value| value.to_string())
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let State(app_state) = State::<AppState>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to access application state"))?;

        let token = session_token(&parts.headers)
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let session = session_store::resolve(app_state.redis(), app_state.settings(), &token)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to resolve session"))?
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let user = repositories::users::find_by_id(app_state.db(), &session.user_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load user"))?;

        let Some(user) = user else {
            return Err(ApiError::Unauthorized("User not found"));
        };

        if !user.is_active {
            return Err(ApiError::Unauthorized("Invalid authentication credentials"));
        }

        Ok(CurrentUser(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if user.role == UserRole::Admin {
            Ok(CurrentAdmin(user))
        } else {
            Err(ApiError::Forbidden("Admin access required"))
        }
    }
}

pub(crate) fn can_manage_audit(user: &User, presentation: &Presentation) -> bool {
    user.role == UserRole::Admin || presentation.user_id == user.id
}

/// Owner, platform admin, or a user the presentation was shared with.
pub(crate) async fn require_audit_view(
    state: &AppState,
    user: &User,
    presentation: &Presentation,
) -> Result<(), ApiError> {
    if can_manage_audit(user, presentation) {
        return Ok(());
    }

    let shared = repositories::shares::exists(state.db(), &presentation.id, &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check share access"))?;

    if shared {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Access denied"))
    }
}
