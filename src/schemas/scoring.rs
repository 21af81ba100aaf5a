use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::models::{CategoryScore, Test};

#[derive(Debug, Deserialize, Serialize, Validate)]
pub(crate) struct AnswerPair {
    #[serde(alias = "questionId")]
    #[validate(length(min = 1, message = "question_id must not be empty"))]
    pub(crate) question_id: String,
    #[serde(alias = "optionId")]
    #[validate(length(min = 1, message = "option_id must not be empty"))]
    pub(crate) option_id: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct TestSubmit {
    #[serde(alias = "presentationId")]
    #[validate(length(min = 1, message = "presentation_id must not be empty"))]
    pub(crate) presentation_id: String,
    #[serde(alias = "userId")]
    #[validate(length(min = 1, message = "user_id must not be empty"))]
    pub(crate) user_id: String,
    #[validate(length(min = 1, message = "answers must not be empty"), nested)]
    pub(crate) answers: Vec<AnswerPair>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CategoryScoreInput {
    #[serde(alias = "categoryId")]
    #[validate(length(min = 1, message = "category_id must not be empty"))]
    pub(crate) category_id: String,
    pub(crate) score: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ScoreUpdate {
    #[serde(alias = "presentationId")]
    #[validate(length(min = 1, message = "presentation_id must not be empty"))]
    pub(crate) presentation_id: String,
    #[serde(alias = "totalScore")]
    pub(crate) total_score: i32,
    #[serde(default)]
    #[serde(alias = "categoryScores")]
    #[validate(nested)]
    pub(crate) category_scores: Vec<CategoryScoreInput>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CategoryScoreResponse {
    pub(crate) id: String,
    #[serde(rename = "testId")]
    pub(crate) test_id: String,
    #[serde(rename = "categoryId")]
    pub(crate) category_id: String,
    pub(crate) score: i32,
}

impl CategoryScoreResponse {
    pub(crate) fn from_db(row: CategoryScore) -> Self {
        Self {
            id: row.id,
            test_id: row.test_id,
            category_id: row.category_id,
            score: row.score,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TestResultData {
    #[serde(rename = "testId")]
    pub(crate) test_id: String,
    #[serde(rename = "totalScore")]
    pub(crate) total_score: i32,
    #[serde(rename = "categoryScores")]
    pub(crate) category_scores: Vec<CategoryScoreResponse>,
}

/// Envelope shape persisted clients depend on: `{ success, data }`.
#[derive(Debug, Serialize)]
pub(crate) struct TestEnvelope {
    pub(crate) success: bool,
    pub(crate) data: TestResultData,
}

impl TestEnvelope {
    pub(crate) fn from_rows(test: &Test, scores: Vec<CategoryScore>) -> Self {
        Self {
            success: true,
            data: TestResultData {
                test_id: test.id.clone(),
                total_score: test.total_score,
                category_scores: scores
                    .into_iter()
                    .map(CategoryScoreResponse::from_db)
                    .collect(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CategoryResultView {
    pub(crate) category_id: String,
    pub(crate) name: String,
    pub(crate) score: i32,
    pub(crate) max_score: i32,
    pub(crate) percentage: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResultsView {
    pub(crate) test_id: String,
    pub(crate) presentation_id: String,
    pub(crate) total_score: i32,
    pub(crate) attempt_count: i64,
    pub(crate) submitted_at: String,
    pub(crate) categories: Vec<CategoryResultView>,
    pub(crate) summary: Option<crate::schemas::audit::SummaryResponse>,
}
