use axum::{
    extract::State,
    http::{header, StatusCode},
    response::AppendHeaders,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{session_token, CurrentUser};
use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::User;
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::user::{UserCreate, UserLogin, UserResponse};
use crate::services::session_store::{self, SESSION_COOKIE};

/// Max attempts per window for auth endpoints (login/signup).
const AUTH_RATE_LIMIT: u64 = 10;
/// Rate limit window in seconds.
const AUTH_RATE_WINDOW_SECONDS: u64 = 60;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

type SetCookie = AppendHeaders<[(header::HeaderName, String); 1]>;

async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<UserCreate>,
) -> Result<(StatusCode, SetCookie, Json<UserResponse>), ApiError> {
    payload.validate().map_err(ApiError::Validation)?;

    let rate_key = format!("rl:signup:{}", payload.email);
    let allowed = state
        .redis()
        .rate_limit(&rate_key, AUTH_RATE_LIMIT, AUTH_RATE_WINDOW_SECONDS)
        .await
        .unwrap_or(true);
    if !allowed {
        return Err(ApiError::TooManyRequests("Too many signup attempts, try again later"));
    }

    let existing = repositories::users::exists_by_email(state.db(), &payload.email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check existing user"))?;

    if existing.is_some() {
        return Err(ApiError::Conflict("User with this email already exists".to_string()));
    }

    let hashed_password = security::hash_password(&payload.password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;

    let now = primitive_now_utc();

    let company_id = match payload.company.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        Some(name) => Some(find_or_create_company(&state, name).await?),
        None => None,
    };

    let user = repositories::users::create(
        state.db(),
        repositories::users::CreateUser {
            id: &Uuid::new_v4().to_string(),
            email: &payload.email,
            hashed_password,
            full_name: &payload.full_name,
            company_id: company_id.as_deref(),
            role: UserRole::Member,
            is_active: true,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create user"))?;

    let (cookie, response) = issue_session(&state, user).await?;
    Ok((StatusCode::CREATED, cookie, Json(response)))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<UserLogin>,
) -> Result<(SetCookie, Json<UserResponse>), ApiError> {
    let rate_key = format!("rl:login:{}", payload.email);
    let allowed = state
        .redis()
        .rate_limit(&rate_key, AUTH_RATE_LIMIT, AUTH_RATE_WINDOW_SECONDS)
        .await
        .unwrap_or(true);
    if !allowed {
        return Err(ApiError::TooManyRequests("Too many login attempts, try again later"));
    }

    let user = fetch_user_by_email(&state, &payload.email).await?;

    let verified = security::verify_password(&payload.password, &user.hashed_password)
        .map_err(|_| ApiError::Unauthorized("Incorrect email or password"))?;

    if !verified {
        return Err(ApiError::Unauthorized("Incorrect email or password"));
    }

    if !user.is_active {
        return Err(ApiError::BadRequest("Inactive user".to_string()));
    }

    let (cookie, response) = issue_session(&state, user).await?;
    Ok((cookie, Json(response)))
}

async fn logout(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
) -> Result<(SetCookie, Json<serde_json::Value>), ApiError> {
    if let Some(token) = session_token(&headers) {
        session_store::revoke(state.redis(), state.settings(), &token)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to revoke session"))?;
    }

    let expired = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    Ok((
        AppendHeaders([(header::SET_COOKIE, expired)]),
        Json(serde_json::json!({"message": "Logged out"})),
    ))
}

async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from_db(user))
}

async fn issue_session(
    state: &AppState,
    user: User,
) -> Result<(SetCookie, UserResponse), ApiError> {
    let token = session_store::issue(state.redis(), state.settings(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to create session"))?;

    let max_age = session_store::ttl_seconds(state.settings());
    let cookie =
        format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");

    Ok((AppendHeaders([(header::SET_COOKIE, cookie)]), UserResponse::from_db(user)))
}

async fn fetch_user_by_email(state: &AppState, email: &str) -> Result<User, ApiError> {
    repositories::users::find_by_email(state.db(), email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?
        .ok_or(ApiError::Unauthorized("Incorrect email or password"))
}

async fn find_or_create_company(state: &AppState, name: &str) -> Result<String, ApiError> {
    if let Some(company) = repositories::companies::find_by_name(state.db(), name)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to look up company"))?
    {
        return Ok(company.id);
    }

    let company = repositories::companies::create(
        state.db(),
        &Uuid::new_v4().to_string(),
        name,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create company"))?;

    Ok(company.id)
}

#[cfg(test)]
mod tests;
