use sqlx::PgPool;

use crate::db::models::Invitation;
use crate::db::types::InvitationStatus;

const COLUMNS: &str = "\
    id, presentation_id, email, token_hash, invited_by, status, created_at, accepted_at";

pub(crate) struct CreateInvitation<'a> {
    pub(crate) id: &'a str,
    pub(crate) presentation_id: &'a str,
    pub(crate) email: &'a str,
    pub(crate) token_hash: &'a str,
    pub(crate) invited_by: &'a str,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateInvitation<'_>,
) -> Result<Invitation, sqlx::Error> {
    sqlx::query_as::<_, Invitation>(&format!(
        "INSERT INTO invitations (
            id, presentation_id, email, token_hash, invited_by, status, created_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.presentation_id)
    .bind(params.email)
    .bind(params.token_hash)
    .bind(params.invited_by)
    .bind(InvitationStatus::Pending)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_pending_by_hash(
    pool: &PgPool,
    token_hash: &str,
) -> Result<Option<Invitation>, sqlx::Error> {
    sqlx::query_as::<_, Invitation>(&format!(
        "SELECT {COLUMNS} FROM invitations WHERE token_hash = $1 AND status = $2",
    ))
    .bind(token_hash)
    .bind(InvitationStatus::Pending)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn mark_accepted(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    accepted_at: time::PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE invitations SET status = $1, accepted_at = $2 WHERE id = $3")
        .bind(InvitationStatus::Accepted)
        .bind(accepted_at)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}
