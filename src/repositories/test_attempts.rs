use sqlx::PgPool;

use crate::db::models::Test;

const COLUMNS: &str = "id, user_id, presentation_id, total_score, created_at";

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    user_id: &str,
    presentation_id: &str,
    total_score: i32,
    created_at: time::PrimitiveDateTime,
) -> Result<Test, sqlx::Error> {
    sqlx::query_as::<_, Test>(&format!(
        "INSERT INTO tests (id, user_id, presentation_id, total_score, created_at)
         VALUES ($1,$2,$3,$4,$5)
         RETURNING {COLUMNS}",
    ))
    .bind(id)
    .bind(user_id)
    .bind(presentation_id)
    .bind(total_score)
    .bind(created_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn update_total_score(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    total_score: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE tests SET total_score = $1 WHERE id = $2")
        .bind(total_score)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Most recent attempt decides which Test is "current" for a presentation;
/// there is no dedup key, multiple attempts are multiple rows.
pub(crate) async fn find_latest(
    executor: impl sqlx::PgExecutor<'_>,
    user_id: &str,
    presentation_id: &str,
) -> Result<Option<Test>, sqlx::Error> {
    sqlx::query_as::<_, Test>(&format!(
        "SELECT {COLUMNS} FROM tests
         WHERE user_id = $1 AND presentation_id = $2
         ORDER BY created_at DESC, id DESC
         LIMIT 1",
    ))
    .bind(user_id)
    .bind(presentation_id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn count_by_user_and_presentation(
    pool: &PgPool,
    user_id: &str,
    presentation_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM tests WHERE user_id = $1 AND presentation_id = $2")
        .bind(user_id)
        .bind(presentation_id)
        .fetch_one(pool)
        .await
}
