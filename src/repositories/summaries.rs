use sqlx::types::Json;

use crate::db::models::Summary;

const COLUMNS: &str =
    "presentation_id, category_recommendations, next_steps, overall_details, updated_at";

pub(crate) async fn find_by_presentation(
    executor: impl sqlx::PgExecutor<'_>,
    presentation_id: &str,
) -> Result<Option<Summary>, sqlx::Error> {
    sqlx::query_as::<_, Summary>(&format!(
        "SELECT {COLUMNS} FROM summaries WHERE presentation_id = $1",
    ))
    .bind(presentation_id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn upsert(
    executor: impl sqlx::PgExecutor<'_>,
    presentation_id: &str,
    category_recommendations: serde_json::Value,
    next_steps: serde_json::Value,
    overall_details: Option<&str>,
    updated_at: time::PrimitiveDateTime,
) -> Result<Summary, sqlx::Error> {
    sqlx::query_as::<_, Summary>(&format!(
        "INSERT INTO summaries (
            presentation_id, category_recommendations, next_steps, overall_details, updated_at
         ) VALUES ($1,$2,$3,$4,$5)
         ON CONFLICT (presentation_id) DO UPDATE
         SET category_recommendations = EXCLUDED.category_recommendations,
             next_steps = EXCLUDED.next_steps,
             overall_details = EXCLUDED.overall_details,
             updated_at = EXCLUDED.updated_at
         RETURNING {COLUMNS}",
    ))
    .bind(presentation_id)
    .bind(Json(category_recommendations))
    .bind(Json(next_steps))
    .bind(overall_details)
    .bind(updated_at)
    .fetch_one(executor)
    .await
}
