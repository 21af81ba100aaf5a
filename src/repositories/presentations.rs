use sqlx::PgPool;

use crate::db::models::Presentation;

const COLUMNS: &str = "id, user_id, title, created_at, updated_at";

pub(crate) async fn find_by_id(
    pool: &PgPool,
    id: &str,
) -> Result<Option<Presentation>, sqlx::Error> {
    sqlx::query_as::<_, Presentation>(&format!(
        "SELECT {COLUMNS} FROM presentations WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn exists(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let found: Option<String> =
        sqlx::query_scalar("SELECT id FROM presentations WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(found.is_some())
}

/// Presentations the user authored plus those shared with them, newest first.
pub(crate) async fn list_for_user(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<Presentation>, sqlx::Error> {
    sqlx::query_as::<_, Presentation>(&format!(
        "SELECT {COLUMNS} FROM presentations WHERE user_id = $1
         UNION
         SELECT p.id, p.user_id, p.title, p.created_at, p.updated_at
         FROM presentations p
         JOIN shares s ON s.presentation_id = p.id
         WHERE s.user_id = $1
         ORDER BY created_at DESC",
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub(crate) struct CreatePresentation<'a> {
    pub(crate) id: &'a str,
    pub(crate) user_id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreatePresentation<'_>,
) -> Result<Presentation, sqlx::Error> {
    sqlx::query_as::<_, Presentation>(&format!(
        "INSERT INTO presentations (id, user_id, title, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.user_id)
    .bind(params.title)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn update_title(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    title: &str,
    updated_at: time::PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE presentations SET title = $1, updated_at = $2 WHERE id = $3")
        .bind(title)
        .bind(updated_at)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM presentations WHERE id = $1").bind(id).execute(pool).await?;
    Ok(())
}
