mod handlers;
mod helpers;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_audit).get(handlers::list_audits))
        .route(
            "/:audit_id",
            get(handlers::get_audit).patch(handlers::update_audit).delete(handlers::delete_audit),
        )
        .route("/:audit_id/results", get(handlers::get_results))
        .route("/:audit_id/progress", put(handlers::put_progress).get(handlers::get_progress))
        .route("/:audit_id/invitations", post(handlers::create_invitation))
}

#[cfg(test)]
mod tests;
