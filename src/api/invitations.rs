use axum::{extract::State, routing::post, Json, Router};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::invitation::InvitationAccept;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/accept", post(accept))
}

/// Redeem an invitation token: the pending invitation becomes a share for
/// the calling user and is marked accepted.
async fn accept(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<InvitationAccept>,
) -> Result<Json<serde_json::Value>, ApiError> {
    payload.validate().map_err(ApiError::Validation)?;

    let token_hash =
        security::hash_token(&state.settings().security().secret_key, &payload.token);
    let invitation = repositories::invitations::find_pending_by_hash(state.db(), &token_hash)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to look up invitation"))?
        .ok_or_else(|| ApiError::NotFound("Invitation not found or already used".to_string()))?;

    let now = primitive_now_utc();
    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    repositories::shares::create_if_absent(
        &mut *tx,
        &Uuid::new_v4().to_string(),
        &invitation.presentation_id,
        &user.id,
        &invitation.invited_by,
        now,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create share"))?;

    repositories::invitations::mark_accepted(&mut *tx, &invitation.id, now)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to accept invitation"))?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;

    tracing::info!(
        invitation_id = %invitation.id,
        presentation_id = %invitation.presentation_id,
        user_id = %user.id,
        "Invitation accepted"
    );

    Ok(Json(serde_json::json!({
        "message": "Invitation accepted",
        "presentation_id": invitation.presentation_id,
    })))
}
