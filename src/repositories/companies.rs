use sqlx::PgPool;

use crate::db::models::Company;

const COLUMNS: &str = "id, name, created_at";

pub(crate) async fn find_by_name(
    pool: &PgPool,
    name: &str,
) -> Result<Option<Company>, sqlx::Error> {
    sqlx::query_as::<_, Company>(&format!("SELECT {COLUMNS} FROM companies WHERE name = $1"))
        .bind(name)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn create(
    pool: &PgPool,
    id: &str,
    name: &str,
    created_at: time::PrimitiveDateTime,
) -> Result<Company, sqlx::Error> {
    sqlx::query_as::<_, Company>(&format!(
        "INSERT INTO companies (id, name, created_at)
         VALUES ($1,$2,$3)
         ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
         RETURNING {COLUMNS}",
    ))
    .bind(id)
    .bind(name)
    .bind(created_at)
    .fetch_one(pool)
    .await
}
