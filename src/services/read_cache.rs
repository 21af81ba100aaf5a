use crate::core::redis::RedisHandle;

/// Redis-backed cache for the presentation read views. All failures degrade
/// to uncached reads; the database stays the source of truth.

pub(crate) fn audit_key(presentation_id: &str) -> String {
    format!("cache:audit:{presentation_id}")
}

pub(crate) fn results_key(presentation_id: &str, user_id: &str) -> String {
    format!("cache:audit:{presentation_id}:results:{user_id}")
}

/// Keys that must drop when a presentation's authored content mutates.
/// Per-user results keys are invalidated separately at submission time.
fn invalidation_keys(presentation_id: &str) -> Vec<String> {
    vec![audit_key(presentation_id)]
}

pub(crate) async fn get_json(redis: &RedisHandle, key: &str) -> Option<serde_json::Value> {
    match redis.get(key).await {
        Ok(Some(payload)) => serde_json::from_str(&payload).ok(),
        Ok(None) => None,
        Err(err) => {
            tracing::debug!(error = %err, key, "Read cache unavailable; falling through");
            None
        }
    }
}

pub(crate) async fn put_json(
    redis: &RedisHandle,
    key: &str,
    value: &serde_json::Value,
    ttl_seconds: u64,
) {
    let Ok(payload) = serde_json::to_string(value) else {
        return;
    };
    if let Err(err) = redis.set_with_ttl(key, &payload, ttl_seconds).await {
        tracing::debug!(error = %err, key, "Failed to populate read cache");
    }
}

pub(crate) async fn invalidate_audit(redis: &RedisHandle, presentation_id: &str) {
    if let Err(err) = redis.delete(&invalidation_keys(presentation_id)).await {
        tracing::debug!(
            error = %err,
            presentation_id,
            "Failed to invalidate read cache"
        );
    }
}

pub(crate) async fn invalidate_results(
    redis: &RedisHandle,
    presentation_id: &str,
    user_id: &str,
) {
    if let Err(err) = redis.delete(&[results_key(presentation_id, user_id)]).await {
        tracing::debug!(
            error = %err,
            presentation_id,
            "Failed to invalidate results cache"
        );
    }
}
