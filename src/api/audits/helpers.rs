use sqlx::PgPool;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::core::time::{format_primitive, primitive_now_utc};
use crate::db::models::Presentation;
use crate::repositories;
use crate::schemas::audit::{
    AuditResponse, CategoryPayload, CategoryResponse, OptionResponse, QuestionPayload,
    QuestionResponse, SummaryResponse,
};
use crate::services::reconcile;

pub(super) async fn fetch_audit(pool: &PgPool, id: &str) -> Result<Presentation, ApiError> {
    repositories::presentations::find_by_id(pool, id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch audit"))?
        .ok_or_else(|| ApiError::NotFound("Audit not found".to_string()))
}

pub(super) async fn insert_categories(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    presentation_id: &str,
    categories: Vec<CategoryPayload>,
) -> Result<(), ApiError> {
    let now = primitive_now_utc();

    for (position, category) in categories.into_iter().enumerate() {
        let category_id = Uuid::new_v4().to_string();

        repositories::categories::create(
            &mut **tx,
            repositories::categories::CreateCategory {
                id: &category_id,
                presentation_id,
                name: &category.name,
                icon: category.icon.as_deref(),
                position: position as i32,
                created_at: now,
                updated_at: now,
            },
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to create category"))?;

        insert_questions(tx, &category_id, category.questions).await?;
    }

    Ok(())
}

pub(super) async fn insert_questions(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    category_id: &str,
    questions: Vec<QuestionPayload>,
) -> Result<(), ApiError> {
    let now = primitive_now_utc();

    for (position, question) in questions.into_iter().enumerate() {
        let question_id = Uuid::new_v4().to_string();

        repositories::questions::create(
            &mut **tx,
            repositories::questions::CreateQuestion {
                id: &question_id,
                category_id,
                text: &question.text,
                position: position as i32,
                created_at: now,
                updated_at: now,
            },
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to create question"))?;

        insert_options(tx, &question_id, question.options).await?;
    }

    Ok(())
}

pub(super) async fn insert_options(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    question_id: &str,
    options: Vec<crate::schemas::audit::OptionPayload>,
) -> Result<(), ApiError> {
    let now = primitive_now_utc();
    let padded = reconcile::pad_options(options);

    for (position, option) in padded.into_iter().enumerate() {
        repositories::questions::create_option(
            &mut **tx,
            repositories::questions::CreateOption {
                id: &Uuid::new_v4().to_string(),
                question_id,
                text: &option.text,
                points: option.points,
                position: position as i32,
                created_at: now,
            },
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to create option"))?;
    }

    Ok(())
}

/// Three-level desired-state reconcile: update rows carrying an id, create
/// rows without one, delete persisted rows absent from the payload. Deletes
/// run first so freshly created ids are never swept.
pub(super) async fn reconcile_categories(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    presentation_id: &str,
    categories: Vec<CategoryPayload>,
) -> Result<(), ApiError> {
    let now = primitive_now_utc();
    let keep = reconcile::keep_ids(categories.iter().map(|category| category.id.as_ref()));

    repositories::categories::delete_absent(&mut **tx, presentation_id, &keep)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to prune categories"))?;

    for (position, category) in categories.into_iter().enumerate() {
        let category_id = match &category.id {
            Some(id) => {
                repositories::categories::update(
                    &mut **tx,
                    id,
                    &category.name,
                    category.icon.as_deref(),
                    position as i32,
                    now,
                )
                .await
                .map_err(|e| ApiError::internal(e, "Failed to update category"))?;
                id.clone()
            }
            None => {
                let id = Uuid::new_v4().to_string();
                repositories::categories::create(
                    &mut **tx,
                    repositories::categories::CreateCategory {
                        id: &id,
                        presentation_id,
                        name: &category.name,
                        icon: category.icon.as_deref(),
                        position: position as i32,
                        created_at: now,
                        updated_at: now,
                    },
                )
                .await
                .map_err(|e| ApiError::internal(e, "Failed to create category"))?;
                id
            }
        };

        reconcile_questions(tx, &category_id, category.questions).await?;
    }

    Ok(())
}

async fn reconcile_questions(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    category_id: &str,
    questions: Vec<QuestionPayload>,
) -> Result<(), ApiError> {
    let now = primitive_now_utc();
    let keep = reconcile::keep_ids(questions.iter().map(|question| question.id.as_ref()));

    repositories::questions::delete_absent(&mut **tx, category_id, &keep)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to prune questions"))?;

    for (position, question) in questions.into_iter().enumerate() {
        let question_id = match &question.id {
            Some(id) => {
                repositories::questions::update(&mut **tx, id, &question.text, position as i32, now)
                    .await
                    .map_err(|e| ApiError::internal(e, "Failed to update question"))?;
                id.clone()
            }
            None => {
                let id = Uuid::new_v4().to_string();
                repositories::questions::create(
                    &mut **tx,
                    repositories::questions::CreateQuestion {
                        id: &id,
                        category_id,
                        text: &question.text,
                        position: position as i32,
                        created_at: now,
                        updated_at: now,
                    },
                )
                .await
                .map_err(|e| ApiError::internal(e, "Failed to create question"))?;
                id
            }
        };

        reconcile_options(tx, &question_id, question.options).await?;
    }

    Ok(())
}

async fn reconcile_options(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    question_id: &str,
    options: Vec<crate::schemas::audit::OptionPayload>,
) -> Result<(), ApiError> {
    let now = primitive_now_utc();
    let padded = reconcile::pad_options(options);
    let keep = reconcile::keep_ids(padded.iter().map(|option| option.id.as_ref()));

    repositories::questions::delete_absent_options(&mut **tx, question_id, &keep)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to prune options"))?;

    for (position, option) in padded.into_iter().enumerate() {
        match &option.id {
            Some(id) => {
                repositories::questions::update_option(
                    &mut **tx,
                    id,
                    &option.text,
                    option.points,
                    position as i32,
                )
                .await
                .map_err(|e| ApiError::internal(e, "Failed to update option"))?;
            }
            None => {
                repositories::questions::create_option(
                    &mut **tx,
                    repositories::questions::CreateOption {
                        id: &Uuid::new_v4().to_string(),
                        question_id,
                        text: &option.text,
                        points: option.points,
                        position: position as i32,
                        created_at: now,
                    },
                )
                .await
                .map_err(|e| ApiError::internal(e, "Failed to create option"))?;
            }
        }
    }

    Ok(())
}

/// Fully reloaded nested view: categories, questions and options in position
/// order, plus the summary when one exists.
pub(super) async fn load_audit_response(
    pool: &PgPool,
    presentation: &Presentation,
) -> Result<AuditResponse, ApiError> {
    let categories = repositories::categories::list_by_presentation(pool, &presentation.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch categories"))?;

    let mut category_responses = Vec::with_capacity(categories.len());
    for category in categories {
        let questions = repositories::questions::list_by_category(pool, &category.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch questions"))?;

        let mut question_responses = Vec::with_capacity(questions.len());
        for question in questions {
            let options = repositories::questions::list_options(pool, &question.id)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to fetch options"))?;

            question_responses.push(QuestionResponse {
                id: question.id,
                category_id: question.category_id,
                text: question.text,
                position: question.position,
                options: options
                    .into_iter()
                    .map(|option| OptionResponse {
                        id: option.id,
                        question_id: option.question_id,
                        text: option.text,
                        points: option.points,
                        position: option.position,
                    })
                    .collect(),
            });
        }

        category_responses.push(CategoryResponse {
            id: category.id,
            presentation_id: category.presentation_id,
            name: category.name,
            icon: category.icon,
            position: category.position,
            questions: question_responses,
        });
    }

    let summary = repositories::summaries::find_by_presentation(pool, &presentation.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch summary"))?
        .map(|summary| SummaryResponse {
            presentation_id: summary.presentation_id,
            category_recommendations: summary.category_recommendations.0,
            next_steps: summary.next_steps.0,
            overall_details: summary.overall_details,
        });

    Ok(AuditResponse {
        id: presentation.id.clone(),
        user_id: presentation.user_id.clone(),
        title: presentation.title.clone(),
        created_at: format_primitive(presentation.created_at),
        updated_at: format_primitive(presentation.updated_at),
        categories: category_responses,
        summary,
    })
}
