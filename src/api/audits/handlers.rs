use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{can_manage_audit, require_audit_view, CurrentUser};
use crate::core::state::AppState;
use crate::core::time::{format_primitive, primitive_now_utc};
use crate::repositories;
use crate::schemas::audit::{
    AuditCreate, AuditSummaryItem, AuditUpdate, ProgressResponse, ProgressSave, SummaryResponse,
};
use crate::schemas::invitation::{InvitationCreate, InvitationOutcome};
use crate::schemas::scoring::{CategoryResultView, ResultsView};
use crate::core::security;
use crate::services::{read_cache, scoring};

use super::helpers;

pub(super) async fn create_audit(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<AuditCreate>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    payload.validate().map_err(ApiError::Validation)?;

    let now = primitive_now_utc();
    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let presentation_id = Uuid::new_v4().to_string();
    let presentation = repositories::presentations::create(
        &mut *tx,
        repositories::presentations::CreatePresentation {
            id: &presentation_id,
            user_id: &user.id,
            title: &payload.title,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create audit"))?;

    helpers::insert_categories(&mut tx, &presentation.id, payload.categories).await?;
    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;

    let response = helpers::load_audit_response(state.db(), &presentation).await?;
    let value = serde_json::to_value(&response)
        .map_err(|e| ApiError::internal(e, "Failed to serialize audit"))?;

    Ok((StatusCode::CREATED, Json(value)))
}

pub(super) async fn update_audit(
    Path(audit_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<AuditUpdate>,
) -> Result<Json<serde_json::Value>, ApiError> {
    payload.validate().map_err(ApiError::Validation)?;

    let presentation = helpers::fetch_audit(state.db(), &audit_id).await?;
    if !can_manage_audit(&user, &presentation) {
        return Err(ApiError::Forbidden("Only the audit owner can edit it"));
    }

    let now = primitive_now_utc();
    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    if let Some(title) = &payload.title {
        repositories::presentations::update_title(&mut *tx, &presentation.id, title, now)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to update title"))?;
    }

    helpers::reconcile_categories(&mut tx, &presentation.id, payload.categories).await?;

    if let Some(summary) = payload.summary {
        repositories::summaries::upsert(
            &mut *tx,
            &presentation.id,
            summary.category_recommendations,
            summary.next_steps,
            summary.overall_details.as_deref(),
            now,
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to upsert summary"))?;
    }

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;

    read_cache::invalidate_audit(state.redis(), &presentation.id).await;

    let reloaded = helpers::fetch_audit(state.db(), &audit_id).await?;
    let response = helpers::load_audit_response(state.db(), &reloaded).await?;
    let value = serde_json::to_value(&response)
        .map_err(|e| ApiError::internal(e, "Failed to serialize audit"))?;

    Ok(Json(value))
}

pub(super) async fn list_audits(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<AuditSummaryItem>>, ApiError> {
    let presentations = repositories::presentations::list_for_user(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list audits"))?;

    let mut items = Vec::with_capacity(presentations.len());
    for presentation in presentations {
        let latest =
            repositories::test_attempts::find_latest(state.db(), &user.id, &presentation.id)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to fetch latest test"))?;

        items.push(AuditSummaryItem {
            id: presentation.id,
            user_id: presentation.user_id,
            title: presentation.title,
            created_at: format_primitive(presentation.created_at),
            latest_test_id: latest.as_ref().map(|test| test.id.clone()),
            latest_total_score: latest.map(|test| test.total_score),
        });
    }

    Ok(Json(items))
}

pub(super) async fn get_audit(
    Path(audit_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let presentation = helpers::fetch_audit(state.db(), &audit_id).await?;
    require_audit_view(&state, &user, &presentation).await?;

    let cache_key = read_cache::audit_key(&presentation.id);
    if let Some(cached) = read_cache::get_json(state.redis(), &cache_key).await {
        return Ok(Json(cached));
    }

    let response = helpers::load_audit_response(state.db(), &presentation).await?;
    let value = serde_json::to_value(&response)
        .map_err(|e| ApiError::internal(e, "Failed to serialize audit"))?;

    read_cache::put_json(
        state.redis(),
        &cache_key,
        &value,
        state.settings().cache().read_ttl_seconds,
    )
    .await;

    Ok(Json(value))
}

pub(super) async fn delete_audit(
    Path(audit_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let presentation = helpers::fetch_audit(state.db(), &audit_id).await?;
    if !can_manage_audit(&user, &presentation) {
        return Err(ApiError::Forbidden("Only the audit owner can delete it"));
    }

    repositories::presentations::delete(state.db(), &presentation.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete audit"))?;

    read_cache::invalidate_audit(state.redis(), &presentation.id).await;

    Ok(Json(serde_json::json!({"message": "Audit deleted"})))
}

pub(super) async fn get_results(
    Path(audit_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let presentation = helpers::fetch_audit(state.db(), &audit_id).await?;
    require_audit_view(&state, &user, &presentation).await?;

    let cache_key = read_cache::results_key(&presentation.id, &user.id);
    if let Some(cached) = read_cache::get_json(state.redis(), &cache_key).await {
        return Ok(Json(cached));
    }

    let test = repositories::test_attempts::find_latest(state.db(), &user.id, &presentation.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch latest test"))?
        .ok_or_else(|| ApiError::NotFound("No test found for this audit".to_string()))?;

    let scores = repositories::category_scores::list_by_test(state.db(), &test.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch category scores"))?;

    let mut categories = Vec::with_capacity(scores.len());
    for score in scores {
        let category = repositories::categories::find_by_id(state.db(), &score.category_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch category"))?;

        let (name, max_score) = match category {
            Some(category) => {
                let question_count =
                    repositories::questions::count_by_category(state.db(), &category.id)
                        .await
                        .map_err(|e| ApiError::internal(e, "Failed to count questions"))?;
                (category.name, scoring::category_max_score(question_count))
            }
            // Category deleted after the test was taken; keep the score row.
            None => (score.category_id.clone(), 0),
        };

        categories.push(CategoryResultView {
            category_id: score.category_id,
            name,
            score: score.score,
            max_score,
            percentage: scoring::percentage(score.score, max_score),
        });
    }

    let attempt_count = repositories::test_attempts::count_by_user_and_presentation(
        state.db(),
        &user.id,
        &presentation.id,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to count attempts"))?;

    let summary = repositories::summaries::find_by_presentation(state.db(), &presentation.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch summary"))?
        .map(|summary| SummaryResponse {
            presentation_id: summary.presentation_id,
            category_recommendations: summary.category_recommendations.0,
            next_steps: summary.next_steps.0,
            overall_details: summary.overall_details,
        });

    let view = ResultsView {
        test_id: test.id.clone(),
        presentation_id: presentation.id.clone(),
        total_score: test.total_score,
        attempt_count,
        submitted_at: format_primitive(test.created_at),
        categories,
        summary,
    };

    let value = serde_json::to_value(&view)
        .map_err(|e| ApiError::internal(e, "Failed to serialize results"))?;

    read_cache::put_json(
        state.redis(),
        &cache_key,
        &value,
        state.settings().cache().read_ttl_seconds,
    )
    .await;

    Ok(Json(value))
}

pub(super) async fn put_progress(
    Path(audit_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<ProgressSave>,
) -> Result<Json<ProgressResponse>, ApiError> {
    let presentation = helpers::fetch_audit(state.db(), &audit_id).await?;
    require_audit_view(&state, &user, &presentation).await?;

    let progress = repositories::progress::upsert(
        state.db(),
        &presentation.id,
        payload.answers,
        primitive_now_utc(),
        &user.id,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to save progress"))?;

    Ok(Json(ProgressResponse {
        presentation_id: progress.presentation_id,
        answers: progress.answers.0,
        updated_at: format_primitive(progress.updated_at),
        updated_by: progress.updated_by,
    }))
}

pub(super) async fn get_progress(
    Path(audit_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ProgressResponse>, ApiError> {
    let presentation = helpers::fetch_audit(state.db(), &audit_id).await?;
    require_audit_view(&state, &user, &presentation).await?;

    let progress = repositories::progress::find_by_presentation(state.db(), &presentation.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch progress"))?
        .ok_or_else(|| ApiError::NotFound("No progress saved for this audit".to_string()))?;

    Ok(Json(ProgressResponse {
        presentation_id: progress.presentation_id,
        answers: progress.answers.0,
        updated_at: format_primitive(progress.updated_at),
        updated_by: progress.updated_by,
    }))
}

pub(super) async fn create_invitation(
    Path(audit_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<InvitationCreate>,
) -> Result<(StatusCode, Json<InvitationOutcome>), ApiError> {
    payload.validate().map_err(ApiError::Validation)?;

    let presentation = helpers::fetch_audit(state.db(), &audit_id).await?;
    if !can_manage_audit(&user, &presentation) {
        return Err(ApiError::Forbidden("Only the audit owner can invite users"));
    }

    let now = primitive_now_utc();

    // Existing account: direct share. Unknown address: token invitation.
    let existing = repositories::users::exists_by_email(state.db(), &payload.email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to look up invitee"))?;

    if let Some(invitee_id) = existing {
        repositories::shares::create_if_absent(
            state.db(),
            &Uuid::new_v4().to_string(),
            &presentation.id,
            &invitee_id,
            &user.id,
            now,
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to create share"))?;

        dispatch_share_notice(&state, &payload.email, &presentation.title).await;

        return Ok((
            StatusCode::CREATED,
            Json(InvitationOutcome {
                presentation_id: presentation.id,
                email: payload.email,
                shared: true,
                invitation_id: None,
            }),
        ));
    }

    let token = security::generate_token();
    let token_hash = security::hash_token(&state.settings().security().secret_key, &token);
    let invitation = repositories::invitations::create(
        state.db(),
        repositories::invitations::CreateInvitation {
            id: &Uuid::new_v4().to_string(),
            presentation_id: &presentation.id,
            email: &payload.email,
            token_hash: &token_hash,
            invited_by: &user.id,
            created_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create invitation"))?;

    dispatch_invitation(&state, &payload.email, &presentation.title, &token).await;

    Ok((
        StatusCode::CREATED,
        Json(InvitationOutcome {
            presentation_id: presentation.id,
            email: payload.email,
            shared: false,
            invitation_id: Some(invitation.id),
        }),
    ))
}

async fn dispatch_invitation(state: &AppState, email: &str, title: &str, token: &str) {
    let Some(mailer) = state.mailer() else {
        tracing::warn!(email, "Mail transport not configured; invitation email skipped");
        return;
    };

    if let Err(err) = mailer.send_invitation(email, title, token).await {
        tracing::error!(error = %err, email, "Failed to send invitation email");
    }
}

async fn dispatch_share_notice(state: &AppState, email: &str, title: &str) {
    let Some(mailer) = state.mailer() else {
        tracing::warn!(email, "Mail transport not configured; share email skipped");
        return;
    };

    if let Err(err) = mailer.send_share_notice(email, title).await {
        tracing::error!(error = %err, email, "Failed to send share email");
    }
}
