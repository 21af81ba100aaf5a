use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::{InvitationStatus, UserRole};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) email: String,
    pub(crate) hashed_password: String,
    pub(crate) full_name: String,
    pub(crate) company_id: Option<String>,
    pub(crate) role: UserRole,
    pub(crate) is_active: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Company {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Presentation {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) title: String,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Category {
    pub(crate) id: String,
    pub(crate) presentation_id: String,
    pub(crate) name: String,
    pub(crate) icon: Option<String>,
    pub(crate) position: i32,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Question {
    pub(crate) id: String,
    pub(crate) category_id: String,
    pub(crate) text: String,
    pub(crate) position: i32,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct QuestionOption {
    pub(crate) id: String,
    pub(crate) question_id: String,
    pub(crate) text: String,
    pub(crate) points: i32,
    pub(crate) position: i32,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Test {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) presentation_id: String,
    pub(crate) total_score: i32,
    pub(crate) created_at: PrimitiveDateTime,
}

/// `points` snapshots the chosen option's value at submission time; later
/// edits to the option never rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Answer {
    pub(crate) id: String,
    pub(crate) test_id: String,
    pub(crate) question_id: String,
    pub(crate) option_id: String,
    pub(crate) points: i32,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct CategoryScore {
    pub(crate) id: String,
    pub(crate) test_id: String,
    pub(crate) category_id: String,
    pub(crate) score: i32,
}

/// One mutable draft row per presentation. Keyed by presentation alone, so
/// concurrent drafters overwrite each other; `updated_by` records the last
/// writer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct AuditProgress {
    pub(crate) presentation_id: String,
    pub(crate) answers: Json<HashMap<String, String>>,
    pub(crate) updated_at: PrimitiveDateTime,
    pub(crate) updated_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Summary {
    pub(crate) presentation_id: String,
    pub(crate) category_recommendations: Json<serde_json::Value>,
    pub(crate) next_steps: Json<serde_json::Value>,
    pub(crate) overall_details: Option<String>,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Invitation {
    pub(crate) id: String,
    pub(crate) presentation_id: String,
    pub(crate) email: String,
    pub(crate) token_hash: String,
    pub(crate) invited_by: String,
    pub(crate) status: InvitationStatus,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) accepted_at: Option<PrimitiveDateTime>,
}

