use crate::db::models::Category;

const COLUMNS: &str = "id, presentation_id, name, icon, position, created_at, updated_at";

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(&format!("SELECT {COLUMNS} FROM categories WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn list_by_presentation(
    executor: impl sqlx::PgExecutor<'_>,
    presentation_id: &str,
) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(&format!(
        "SELECT {COLUMNS} FROM categories WHERE presentation_id = $1 ORDER BY position",
    ))
    .bind(presentation_id)
    .fetch_all(executor)
    .await
}

pub(crate) struct CreateCategory<'a> {
    pub(crate) id: &'a str,
    pub(crate) presentation_id: &'a str,
    pub(crate) name: &'a str,
    pub(crate) icon: Option<&'a str>,
    pub(crate) position: i32,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateCategory<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO categories (id, presentation_id, name, icon, position, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5,$6,$7)",
    )
    .bind(params.id)
    .bind(params.presentation_id)
    .bind(params.name)
    .bind(params.icon)
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
    name: &str,
    icon: Option<&str>,
    position: i32,
    updated_at: time::PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE categories SET name = $1, icon = $2, position = $3, updated_at = $4 WHERE id = $5",
    )
    .bind(name)
    .bind(icon)
    .bind(position)
    .bind(updated_at)
    .bind(id)
    .execute(executor)
    .await?;
    Ok(())
}

/// Delete categories of the presentation whose id is not in `keep_ids`.
/// Cascades to questions and options.
pub(crate) async fn delete_absent(
    executor: impl sqlx::PgExecutor<'_>,
    presentation_id: &str,
    keep_ids: &[String],
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM categories WHERE presentation_id = $1 AND NOT (id = ANY($2))",
    )
    .bind(presentation_id)
    .bind(keep_ids)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}
