use crate::db::models::CategoryScore;

const COLUMNS: &str = "id, test_id, category_id, score";

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    test_id: &str,
    category_id: &str,
    score: i32,
) -> Result<CategoryScore, sqlx::Error> {
    sqlx::query_as::<_, CategoryScore>(&format!(
        "INSERT INTO category_scores (id, test_id, category_id, score)
         VALUES ($1,$2,$3,$4)
         RETURNING {COLUMNS}",
    ))
    .bind(id)
    .bind(test_id)
    .bind(category_id)
    .bind(score)
    .fetch_one(executor)
    .await
}

pub(crate) async fn list_by_test(
    executor: impl sqlx::PgExecutor<'_>,
    test_id: &str,
) -> Result<Vec<CategoryScore>, sqlx::Error> {
    sqlx::query_as::<_, CategoryScore>(&format!(
        "SELECT {COLUMNS} FROM category_scores WHERE test_id = $1",
    ))
    .bind(test_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn delete_by_test(
    executor: impl sqlx::PgExecutor<'_>,
    test_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM category_scores WHERE test_id = $1")
        .bind(test_id)
        .execute(executor)
        .await?;
    Ok(())
}
