use redis::RedisError;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::core::config::Settings;
use crate::core::redis::RedisHandle;
use crate::core::security;

pub(crate) const SESSION_COOKIE: &str = "auditdeck_session";

const SECONDS_PER_DAY: u64 = 86_400;

/// Server-side session record referenced by the cookie. The raw token never
/// touches storage; the key is its sha256 digest.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct SessionRecord {
    pub(crate) user_id: String,
    pub(crate) created_at: i64,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum SessionError {
    #[error("session store unavailable: {0}")]
    Store(#[from] RedisError),
    #[error("session record corrupted")]
    Corrupted,
}

pub(crate) async fn issue(
    redis: &RedisHandle,
    settings: &Settings,
    user_id: &str,
) -> Result<String, SessionError> {
    let token = security::generate_token();
    let record = SessionRecord {
        user_id: user_id.to_string(),
        created_at: OffsetDateTime::now_utc().unix_timestamp(),
    };
    let payload = serde_json::to_string(&record).map_err(|_| SessionError::Corrupted)?;

    redis.set_with_ttl(&session_key(settings, &token), &payload, ttl_seconds(settings)).await?;

    Ok(token)
}

pub(crate) async fn resolve(
    redis: &RedisHandle,
    settings: &Settings,
    token: &str,
) -> Result<Option<SessionRecord>, SessionError> {
    let Some(payload) = redis.get(&session_key(settings, token)).await? else {
        return Ok(None);
    };

    let record = serde_json::from_str(&payload).map_err(|_| SessionError::Corrupted)?;
    Ok(Some(record))
}

pub(crate) async fn revoke(
    redis: &RedisHandle,
    settings: &Settings,
    token: &str,
) -> Result<(), SessionError> {
    redis.delete(&[session_key(settings, token)]).await?;
    Ok(())
}

pub(crate) fn ttl_seconds(settings: &Settings) -> u64 {
    settings.security().session_ttl_days * SECONDS_PER_DAY
}

fn session_key(settings: &Settings, token: &str) -> String {
    format!("session:{}", security::hash_token(&settings.security().secret_key, token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[tokio::test]
    async fn issue_resolve_revoke_roundtrip() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();

        let settings = Settings::load().expect("settings");
        test_support::reset_redis(settings.redis().redis_url()).await.expect("redis reset");

        let redis = RedisHandle::new(settings.redis().redis_url());
        redis.connect().await.expect("redis connect");

        let token = issue(&redis, &settings, "user-42").await.expect("issue");
        let record = resolve(&redis, &settings, &token).await.expect("resolve").expect("record");
        assert_eq!(record.user_id, "user-42");

        revoke(&redis, &settings, &token).await.expect("revoke");
        assert!(resolve(&redis, &settings, &token).await.expect("resolve").is_none());
    }

    #[tokio::test]
    async fn unknown_token_resolves_to_none() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();

        let settings = Settings::load().expect("settings");
        let redis = RedisHandle::new(settings.redis().redis_url());
        redis.connect().await.expect("redis connect");

        let resolved =
            resolve(&redis, &settings, "definitely-not-a-token").await.expect("resolve");
        assert!(resolved.is_none());
    }
}
