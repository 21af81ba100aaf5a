use crate::db::models::Answer;

const COLUMNS: &str = "id, test_id, question_id, option_id, points, created_at";

pub(crate) struct CreateAnswer<'a> {
    pub(crate) id: &'a str,
    pub(crate) test_id: &'a str,
    pub(crate) question_id: &'a str,
    pub(crate) option_id: &'a str,
    pub(crate) points: i32,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateAnswer<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO answers (id, test_id, question_id, option_id, points, created_at)
         VALUES ($1,$2,$3,$4,$5,$6)",
    )
    .bind(params.id)
    .bind(params.test_id)
    .bind(params.question_id)
    .bind(params.option_id)
    .bind(params.points)
    .bind(params.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn list_by_test(
    executor: impl sqlx::PgExecutor<'_>,
    test_id: &str,
) -> Result<Vec<Answer>, sqlx::Error> {
    sqlx::query_as::<_, Answer>(&format!(
        "SELECT {COLUMNS} FROM answers WHERE test_id = $1 ORDER BY created_at, id",
    ))
    .bind(test_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn count_by_test(
    executor: impl sqlx::PgExecutor<'_>,
    test_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM answers WHERE test_id = $1")
        .bind(test_id)
        .fetch_one(executor)
        .await
}
