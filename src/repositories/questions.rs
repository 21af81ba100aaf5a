use crate::db::models::{Question, QuestionOption};

const QUESTION_COLUMNS: &str = "id, category_id, text, position, created_at, updated_at";
const OPTION_COLUMNS: &str = "id, question_id, text, points, position, created_at";

pub(crate) async fn list_by_category(
    executor: impl sqlx::PgExecutor<'_>,
    category_id: &str,
) -> Result<Vec<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {QUESTION_COLUMNS} FROM questions WHERE category_id = $1 ORDER BY position",
    ))
    .bind(category_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn count_by_category(
    executor: impl sqlx::PgExecutor<'_>,
    category_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE category_id = $1")
        .bind(category_id)
        .fetch_one(executor)
        .await
}

pub(crate) struct CreateQuestion<'a> {
    pub(crate) id: &'a str,
    pub(crate) category_id: &'a str,
    pub(crate) text: &'a str,
    pub(crate) position: i32,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateQuestion<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO questions (id, category_id, text, position, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5,$6)",
    )
    .bind(params.id)
    .bind(params.category_id)
    .bind(params.text)
    .bind(params.position)
    .bind(params.created_at)
    .bind(params.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn update(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    text: &str,
    position: i32,
    updated_at: time::PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE questions SET text = $1, position = $2, updated_at = $3 WHERE id = $4")
        .bind(text)
        .bind(position)
        .bind(updated_at)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

pub(crate) async fn delete_absent(
    executor: impl sqlx::PgExecutor<'_>,
    category_id: &str,
    keep_ids: &[String],
) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM questions WHERE category_id = $1 AND NOT (id = ANY($2))")
            .bind(category_id)
            .bind(keep_ids)
            .execute(executor)
            .await?;
    Ok(result.rows_affected())
}

pub(crate) async fn list_options(
    executor: impl sqlx::PgExecutor<'_>,
    question_id: &str,
) -> Result<Vec<QuestionOption>, sqlx::Error> {
    sqlx::query_as::<_, QuestionOption>(&format!(
        "SELECT {OPTION_COLUMNS} FROM options WHERE question_id = $1 ORDER BY position",
    ))
    .bind(question_id)
    .fetch_all(executor)
    .await
}

pub(crate) struct CreateOption<'a> {
    pub(crate) id: &'a str,
    pub(crate) question_id: &'a str,
    pub(crate) text: &'a str,
    pub(crate) points: i32,
    pub(crate) position: i32,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create_option(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateOption<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO options (id, question_id, text, points, position, created_at)
         VALUES ($1,$2,$3,$4,$5,$6)",
    )
    .bind(params.id)
    .bind(params.question_id)
    .bind(params.text)
    .bind(params.points)
    .bind(params.position)
    .bind(params.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn update_option(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    text: &str,
    points: i32,
    position: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE options SET text = $1, points = $2, position = $3 WHERE id = $4")
        .bind(text)
        .bind(points)
        .bind(position)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

pub(crate) async fn delete_absent_options(
    executor: impl sqlx::PgExecutor<'_>,
    question_id: &str,
    keep_ids: &[String],
) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM options WHERE question_id = $1 AND NOT (id = ANY($2))")
            .bind(question_id)
            .bind(keep_ids)
            .execute(executor)
            .await?;
    Ok(result.rows_affected())
}

/// Points and owning category for a chosen option, or None when the option
/// does not exist.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct ResolvedOption {
    pub(crate) points: i32,
    pub(crate) category_id: String,
}

pub(crate) async fn resolve_option(
    executor: impl sqlx::PgExecutor<'_>,
    option_id: &str,
) -> Result<Option<ResolvedOption>, sqlx::Error> {
    sqlx::query_as::<_, ResolvedOption>(
        "SELECT o.points, q.category_id
         FROM options o
         JOIN questions q ON q.id = o.question_id
         WHERE o.id = $1",
    )
    .bind(option_id)
    .fetch_optional(executor)
    .await
}
