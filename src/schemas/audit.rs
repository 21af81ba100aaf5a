use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Authoring payloads carry the full desired state for a presentation.
/// A row with an `id` is an update, without one a create; persisted rows
/// missing from the payload are deleted during reconciliation.
#[derive(Debug, Deserialize, Validate)]
pub(crate) struct OptionPayload {
    #[serde(default)]
    pub(crate) id: Option<String>,
    #[validate(length(min = 1, message = "option text must not be empty"))]
    pub(crate) text: String,
    #[validate(range(min = 1, max = 5, message = "points must be between 1 and 5"))]
    pub(crate) points: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuestionPayload {
    #[serde(default)]
    pub(crate) id: Option<String>,
    #[validate(length(min = 1, message = "question text must not be empty"))]
    pub(crate) text: String,
    #[serde(default)]
    #[validate(nested)]
    pub(crate) options: Vec<OptionPayload>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CategoryPayload {
    #[serde(default)]
    pub(crate) id: Option<String>,
    #[validate(length(min = 1, message = "category name must not be empty"))]
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) icon: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub(crate) questions: Vec<QuestionPayload>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AuditCreate {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub(crate) title: String,
    #[serde(default)]
    #[validate(nested)]
    pub(crate) categories: Vec<CategoryPayload>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AuditUpdate {
    #[serde(default)]
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub(crate) title: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub(crate) categories: Vec<CategoryPayload>,
    #[serde(default)]
    pub(crate) summary: Option<SummaryPayload>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SummaryPayload {
    #[serde(default)]
    #[serde(alias = "categoryRecommendations")]
    pub(crate) category_recommendations: serde_json::Value,
    #[serde(default)]
    #[serde(alias = "nextSteps")]
    pub(crate) next_steps: serde_json::Value,
    #[serde(default)]
    #[serde(alias = "overallDetails")]
    pub(crate) overall_details: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProgressSave {
    pub(crate) answers: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct OptionResponse {
    pub(crate) id: String,
    pub(crate) question_id: String,
    pub(crate) text: String,
    pub(crate) points: i32,
    pub(crate) position: i32,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionResponse {
    pub(crate) id: String,
    pub(crate) category_id: String,
    pub(crate) text: String,
    pub(crate) position: i32,
    pub(crate) options: Vec<OptionResponse>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CategoryResponse {
    pub(crate) id: String,
    pub(crate) presentation_id: String,
    pub(crate) name: String,
    pub(crate) icon: Option<String>,
    pub(crate) position: i32,
    pub(crate) questions: Vec<QuestionResponse>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AuditResponse {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) title: String,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
    pub(crate) categories: Vec<CategoryResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) summary: Option<SummaryResponse>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SummaryResponse {
    pub(crate) presentation_id: String,
    pub(crate) category_recommendations: serde_json::Value,
    pub(crate) next_steps: serde_json::Value,
    pub(crate) overall_details: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AuditSummaryItem {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) title: String,
    pub(crate) created_at: String,
    pub(crate) latest_test_id: Option<String>,
    pub(crate) latest_total_score: Option<i32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProgressResponse {
    pub(crate) presentation_id: String,
    pub(crate) answers: HashMap<String, String>,
    pub(crate) updated_at: String,
    pub(crate) updated_by: String,
}
