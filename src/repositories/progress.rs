use std::collections::HashMap;

use sqlx::types::Json;
use sqlx::PgPool;

use crate::db::models::AuditProgress;

const COLUMNS: &str = "presentation_id, answers, updated_at, updated_by";

pub(crate) async fn find_by_presentation(
    pool: &PgPool,
    presentation_id: &str,
) -> Result<Option<AuditProgress>, sqlx::Error> {
    sqlx::query_as::<_, AuditProgress>(&format!(
        "SELECT {COLUMNS} FROM audit_progress WHERE presentation_id = $1",
    ))
    .bind(presentation_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn upsert(
    pool: &PgPool,
    presentation_id: &str,
    answers: HashMap<String, String>,
    updated_at: time::PrimitiveDateTime,
    updated_by: &str,
) -> Result<AuditProgress, sqlx::Error> {
    sqlx::query_as::<_, AuditProgress>(&format!(
        "INSERT INTO audit_progress (presentation_id, answers, updated_at, updated_by)
         VALUES ($1,$2,$3,$4)
         ON CONFLICT (presentation_id) DO UPDATE
         SET answers = EXCLUDED.answers,
             updated_at = EXCLUDED.updated_at,
             updated_by = EXCLUDED.updated_by
         RETURNING {COLUMNS}",
    ))
    .bind(presentation_id)
    .bind(Json(answers))
    .bind(updated_at)
    .bind(updated_by)
    .fetch_one(pool)
    .await
}
