use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::scoring::{ScoreUpdate, TestEnvelope, TestSubmit};
use crate::services::{read_cache, scoring};

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", post(submit_test)).route("/score", post(update_score))
}

/// Score a submitted answer set and persist it as a new Test with Answer and
/// CategoryScore rows. Never idempotent: every call creates a fresh attempt.
async fn submit_test(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<TestSubmit>,
) -> Result<(StatusCode, Json<TestEnvelope>), ApiError> {
    payload.validate().map_err(ApiError::Validation)?;

    let exists = repositories::presentations::exists(state.db(), &payload.presentation_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check presentation"))?;
    if !exists {
        return Err(ApiError::NotFound("Presentation not found".to_string()));
    }

    let now = primitive_now_utc();
    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let test = repositories::test_attempts::create(
        &mut *tx,
        &Uuid::new_v4().to_string(),
        &payload.user_id,
        &payload.presentation_id,
        0,
        now,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create test"))?;

    let mut resolved = Vec::with_capacity(payload.answers.len());
    for pair in &payload.answers {
        let option = repositories::questions::resolve_option(&mut *tx, &pair.option_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to resolve option"))?;

        match option {
            Some(option) => resolved.push(scoring::ResolvedAnswer {
                question_id: pair.question_id.clone(),
                option_id: pair.option_id.clone(),
                points: option.points,
                category_id: option.category_id,
            }),
            // A pair referencing a nonexistent option is dropped, not an
            // error: the submission still succeeds with the valid pairs.
            None => {
                tracing::debug!(
                    option_id = %pair.option_id,
                    question_id = %pair.question_id,
                    "Skipping answer with unknown option"
                );
            }
        }
    }

    let totals = scoring::accumulate(&resolved);

    for answer in &resolved {
        repositories::answers::create(
            &mut *tx,
            repositories::answers::CreateAnswer {
                id: &Uuid::new_v4().to_string(),
                test_id: &test.id,
                question_id: &answer.question_id,
                option_id: &answer.option_id,
                points: answer.points,
                created_at: now,
            },
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to create answer"))?;
    }

    let mut score_rows = Vec::with_capacity(totals.by_category.len());
    for (category_id, score) in &totals.by_category {
        let row = repositories::category_scores::create(
            &mut *tx,
            &Uuid::new_v4().to_string(),
            &test.id,
            category_id,
            *score,
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to create category score"))?;
        score_rows.push(row);
    }

    repositories::test_attempts::update_total_score(&mut *tx, &test.id, totals.total)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to update total score"))?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;

    read_cache::invalidate_results(state.redis(), &payload.presentation_id, &payload.user_id)
        .await;

    tracing::info!(
        test_id = %test.id,
        presentation_id = %payload.presentation_id,
        user_id = %payload.user_id,
        submitted_by = %user.id,
        total_score = totals.total,
        answers = resolved.len(),
        skipped = payload.answers.len() - resolved.len(),
        "Test submission scored"
    );

    let mut test = test;
    test.total_score = totals.total;

    Ok((StatusCode::CREATED, Json(TestEnvelope::from_rows(&test, score_rows))))
}

/// Overwrite the caller's most recent Test for a presentation with
/// caller-supplied totals, creating one when none exists. Trusts the given
/// numbers: nothing is rederived from Answer rows.
async fn update_score(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<ScoreUpdate>,
) -> Result<Json<TestEnvelope>, ApiError> {
    payload.validate().map_err(ApiError::Validation)?;

    let now = primitive_now_utc();
    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let existing = repositories::test_attempts::find_latest(
        &mut *tx,
        &user.id,
        &payload.presentation_id,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to fetch latest test"))?;

    let test = match existing {
        Some(mut test) => {
            repositories::test_attempts::update_total_score(
                &mut *tx,
                &test.id,
                payload.total_score,
            )
            .await
            .map_err(|e| ApiError::internal(e, "Failed to update total score"))?;

            repositories::category_scores::delete_by_test(&mut *tx, &test.id)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to clear category scores"))?;

            test.total_score = payload.total_score;
            test
        }
        None => repositories::test_attempts::create(
            &mut *tx,
            &Uuid::new_v4().to_string(),
            &user.id,
            &payload.presentation_id,
            payload.total_score,
            now,
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to create test"))?,
    };

    let mut score_rows = Vec::with_capacity(payload.category_scores.len());
    for entry in &payload.category_scores {
        let row = repositories::category_scores::create(
            &mut *tx,
            &Uuid::new_v4().to_string(),
            &test.id,
            &entry.category_id,
            entry.score,
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to create category score"))?;
        score_rows.push(row);
    }

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;

    read_cache::invalidate_results(state.redis(), &payload.presentation_id, &user.id).await;

    tracing::info!(
        test_id = %test.id,
        presentation_id = %payload.presentation_id,
        user_id = %user.id,
        total_score = payload.total_score,
        "Test score overridden"
    );

    Ok(Json(TestEnvelope::from_rows(&test, score_rows)))
}
