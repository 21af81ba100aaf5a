use sqlx::PgPool;

/// Idempotent: sharing an already-shared presentation is a no-op.
pub(crate) async fn create_if_absent(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    presentation_id: &str,
    user_id: &str,
    created_by: &str,
    created_at: time::PrimitiveDateTime,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO shares (id, presentation_id, user_id, created_by, created_at)
         VALUES ($1,$2,$3,$4,$5)
         ON CONFLICT (presentation_id, user_id) DO NOTHING",
    )
    .bind(id)
    .bind(presentation_id)
    .bind(user_id)
    .bind(created_by)
    .bind(created_at)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub(crate) async fn exists(
    pool: &PgPool,
    presentation_id: &str,
    user_id: &str,
) -> Result<bool, sqlx::Error> {
    let found: Option<String> = sqlx::query_scalar(
        "SELECT id FROM shares WHERE presentation_id = $1 AND user_id = $2",
    )
    .bind(presentation_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(found.is_some())
}
