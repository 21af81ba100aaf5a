use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::test_support;

fn five_options() -> serde_json::Value {
    json!([
        {"text": "Poor", "points": 1},
        {"text": "Fair", "points": 2},
        {"text": "Good", "points": 3},
        {"text": "Great", "points": 4},
        {"text": "Excellent", "points": 5}
    ])
}

async fn create_audit(
    ctx: &test_support::TestContext,
    token: &str,
    payload: serde_json::Value,
) -> serde_json::Value {
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/audits",
            Some(token),
            Some(payload),
        ))
        .await
        .expect("create audit");

    let status = response.status();
    let created = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {created}");
    created
}

#[tokio::test]
async fn owner_can_create_and_fetch_nested_audit() {
    let ctx = test_support::setup_test_context().await;

    let owner =
        test_support::insert_user(ctx.state.db(), "author@example.com", "Author", "author-pass")
            .await;
    let token = test_support::session_token(&ctx.state, &owner.id).await;

    let created = create_audit(
        &ctx,
        &token,
        json!({
            "title": "Operations audit",
            "categories": [
                {
                    "name": "Logistics",
                    "icon": "truck",
                    "questions": [
                        {"text": "How do you rate delivery times?", "options": five_options()}
                    ]
                }
            ]
        }),
    )
    .await;

    assert_eq!(created["title"], "Operations audit");
    assert_eq!(created["user_id"], owner.id.as_str());
    let categories = created["categories"].as_array().expect("categories");
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0]["name"], "Logistics");
    assert_eq!(categories[0]["position"], 0);
    assert_eq!(categories[0]["questions"][0]["options"].as_array().unwrap().len(), 5);

    let audit_id = created["id"].as_str().expect("audit id");
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/audits/{audit_id}"),
            Some(&token),
            None,
        ))
        .await
        .expect("get audit");

    let status = response.status();
    let fetched = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {fetched}");
    assert_eq!(fetched["id"], audit_id);
    assert_eq!(fetched["categories"][0]["questions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn short_option_sets_are_padded_to_five_defaults() {
    let ctx = test_support::setup_test_context().await;

    let owner =
        test_support::insert_user(ctx.state.db(), "padding@example.com", "Author", "author-pass")
            .await;
    let token = test_support::session_token(&ctx.state, &owner.id).await;

    let created = create_audit(
        &ctx,
        &token,
        json!({
            "title": "Padded audit",
            "categories": [
                {
                    "name": "Quality",
                    "questions": [
                        {
                            "text": "How do you rate defect handling?",
                            "options": [
                                {"text": "Bad", "points": 1},
                                {"text": "Okay", "points": 2}
                            ]
                        }
                    ]
                }
            ]
        }),
    )
    .await;

    let options = created["categories"][0]["questions"][0]["options"]
        .as_array()
        .expect("options");
    assert_eq!(options.len(), 5);
    assert_eq!(options[0]["text"], "Bad");
    assert_eq!(options[1]["text"], "Okay");
    assert_eq!(options[2]["text"], "Option 3");
    assert_eq!(options[2]["points"], 3);
    assert_eq!(options[3]["text"], "Option 4");
    assert_eq!(options[4]["text"], "Option 5");
    assert_eq!(options[4]["points"], 5);
}

#[tokio::test]
async fn reconcile_updates_kept_rows_and_deletes_absent_ones() {
    let ctx = test_support::setup_test_context().await;

    let owner =
        test_support::insert_user(ctx.state.db(), "diff@example.com", "Author", "author-pass")
            .await;
    let token = test_support::session_token(&ctx.state, &owner.id).await;

    let created = create_audit(
        &ctx,
        &token,
        json!({
            "title": "Two category audit",
            "categories": [
                {
                    "name": "First",
                    "questions": [{"text": "Q1", "options": five_options()}]
                },
                {
                    "name": "Second",
                    "questions": [{"text": "Q2", "options": five_options()}]
                }
            ]
        }),
    )
    .await;

    let audit_id = created["id"].as_str().expect("audit id");
    let kept_category_id = created["categories"][0]["id"].as_str().expect("category id");
    let kept_question_id =
        created["categories"][0]["questions"][0]["id"].as_str().expect("question id");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PATCH,
            &format!("/api/v1/audits/{audit_id}"),
            Some(&token),
            Some(json!({
                "title": "Two category audit",
                "categories": [
                    {
                        "id": kept_category_id,
                        "name": "First renamed",
                        "questions": [
                            {"id": kept_question_id, "text": "Q1 reworded", "options": five_options()}
                        ]
                    }
                ]
            })),
        ))
        .await
        .expect("patch audit");

    let status = response.status();
    let updated = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {updated}");

    let categories = updated["categories"].as_array().expect("categories");
    assert_eq!(categories.len(), 1, "absent category must be deleted");
    assert_eq!(categories[0]["id"], kept_category_id);
    assert_eq!(categories[0]["name"], "First renamed");
    assert_eq!(categories[0]["questions"][0]["text"], "Q1 reworded");

    let category_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE presentation_id = $1")
            .bind(audit_id)
            .fetch_one(ctx.state.db())
            .await
            .expect("category count");
    assert_eq!(category_count, 1);

    // Cascade removed the second category's questions too.
    let question_count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM questions q
         JOIN categories c ON c.id = q.category_id
         WHERE c.presentation_id = $1",
    )
    .bind(audit_id)
    .fetch_one(ctx.state.db())
    .await
    .expect("question count");
    assert_eq!(question_count, 1);
}

#[tokio::test]
async fn patch_with_summary_upserts_summary_content() {
    let ctx = test_support::setup_test_context().await;

    let owner =
        test_support::insert_user(ctx.state.db(), "summary@example.com", "Author", "author-pass")
            .await;
    let token = test_support::session_token(&ctx.state, &owner.id).await;

    let created = create_audit(
        &ctx,
        &token,
        json!({
            "title": "Summarized audit",
            "categories": [
                {"name": "Only", "questions": [{"text": "Q", "options": five_options()}]}
            ]
        }),
    )
    .await;
    let audit_id = created["id"].as_str().expect("audit id");
    let category_id = created["categories"][0]["id"].as_str().expect("category id");

    let updated = test_support::read_json(
        ctx.app
            .clone()
            .oneshot(test_support::json_request(
                Method::PATCH,
                &format!("/api/v1/audits/{audit_id}"),
                Some(&token),
                Some(json!({
                    "categories": [{"id": category_id, "name": "Only",
                        "questions": []}],
                    "summary": {
                        "categoryRecommendations": [{"category": "Only", "advice": "Keep going"}],
                        "nextSteps": ["Book a review call"],
                        "overallDetails": "Solid baseline"
                    }
                })),
            ))
            .await
            .expect("patch audit"),
    )
    .await;

    assert_eq!(updated["summary"]["overall_details"], "Solid baseline");
    assert_eq!(updated["summary"]["next_steps"][0], "Book a review call");
}

#[tokio::test]
async fn non_owner_cannot_edit_or_delete() {
    let ctx = test_support::setup_test_context().await;

    let owner =
        test_support::insert_user(ctx.state.db(), "boss@example.com", "Owner", "owner-pass")
            .await;
    let outsider =
        test_support::insert_user(ctx.state.db(), "else@example.com", "Outsider", "other-pass")
            .await;
    let owner_token = test_support::session_token(&ctx.state, &owner.id).await;
    let outsider_token = test_support::session_token(&ctx.state, &outsider.id).await;

    let created = create_audit(
        &ctx,
        &owner_token,
        json!({
            "title": "Private audit",
            "categories": [
                {"name": "Cat", "questions": [{"text": "Q", "options": five_options()}]}
            ]
        }),
    )
    .await;
    let audit_id = created["id"].as_str().expect("audit id");

    let patch = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PATCH,
            &format!("/api/v1/audits/{audit_id}"),
            Some(&outsider_token),
            Some(json!({"title": "Hijacked", "categories": []})),
        ))
        .await
        .expect("patch");
    assert_eq!(patch.status(), StatusCode::FORBIDDEN);

    let delete = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/api/v1/audits/{audit_id}"),
            Some(&outsider_token),
            None,
        ))
        .await
        .expect("delete");
    assert_eq!(delete.status(), StatusCode::FORBIDDEN);

    // Not even readable until shared.
    let get = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/audits/{audit_id}"),
            Some(&outsider_token),
            None,
        ))
        .await
        .expect("get");
    assert_eq!(get.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn platform_admin_can_edit_any_audit() {
    let ctx = test_support::setup_test_context().await;

    let owner =
        test_support::insert_user(ctx.state.db(), "mine@example.com", "Owner", "owner-pass")
            .await;
    let admin =
        test_support::insert_admin(ctx.state.db(), "root@example.com", "Admin", "admin-pass")
            .await;
    let owner_token = test_support::session_token(&ctx.state, &owner.id).await;
    let admin_token = test_support::session_token(&ctx.state, &admin.id).await;

    let created = create_audit(
        &ctx,
        &owner_token,
        json!({
            "title": "Owned audit",
            "categories": [
                {"name": "Cat", "questions": [{"text": "Q", "options": five_options()}]}
            ]
        }),
    )
    .await;
    let audit_id = created["id"].as_str().expect("audit id");
    let category_id = created["categories"][0]["id"].as_str().expect("category id");
    let question_id = created["categories"][0]["questions"][0]["id"].as_str().expect("question");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PATCH,
            &format!("/api/v1/audits/{audit_id}"),
            Some(&admin_token),
            Some(json!({
                "title": "Renamed by admin",
                "categories": [
                    {"id": category_id, "name": "Cat",
                     "questions": [{"id": question_id, "text": "Q", "options": five_options()}]}
                ]
            })),
        ))
        .await
        .expect("admin patch");

    let status = response.status();
    let updated = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {updated}");
    assert_eq!(updated["title"], "Renamed by admin");
}

#[tokio::test]
async fn progress_draft_roundtrip_records_last_writer() {
    let ctx = test_support::setup_test_context().await;

    let owner =
        test_support::insert_user(ctx.state.db(), "draft@example.com", "Owner", "owner-pass")
            .await;
    let token = test_support::session_token(&ctx.state, &owner.id).await;

    let created = create_audit(
        &ctx,
        &token,
        json!({
            "title": "Draft audit",
            "categories": [
                {"name": "Cat", "questions": [{"text": "Q", "options": five_options()}]}
            ]
        }),
    )
    .await;
    let audit_id = created["id"].as_str().expect("audit id");
    let question_id = created["categories"][0]["questions"][0]["id"].as_str().expect("question");
    let option_id = created["categories"][0]["questions"][0]["options"][2]["id"]
        .as_str()
        .expect("option");

    let saved = test_support::read_json(
        ctx.app
            .clone()
            .oneshot(test_support::json_request(
                Method::PUT,
                &format!("/api/v1/audits/{audit_id}/progress"),
                Some(&token),
                Some(json!({"answers": {question_id: option_id}})),
            ))
            .await
            .expect("save progress"),
    )
    .await;
    assert_eq!(saved["updated_by"], owner.id.as_str());
    assert_eq!(saved["answers"][question_id], option_id);

    let fetched = test_support::read_json(
        ctx.app
            .clone()
            .oneshot(test_support::json_request(
                Method::GET,
                &format!("/api/v1/audits/{audit_id}/progress"),
                Some(&token),
                None,
            ))
            .await
            .expect("get progress"),
    )
    .await;
    assert_eq!(fetched["answers"][question_id], option_id);
}

#[tokio::test]
async fn inviting_registered_email_creates_direct_share() {
    let ctx = test_support::setup_test_context().await;

    let owner =
        test_support::insert_user(ctx.state.db(), "host@example.com", "Owner", "owner-pass")
            .await;
    let guest =
        test_support::insert_user(ctx.state.db(), "guest@example.com", "Guest", "guest-pass")
            .await;
    let owner_token = test_support::session_token(&ctx.state, &owner.id).await;
    let guest_token = test_support::session_token(&ctx.state, &guest.id).await;

    let created = create_audit(
        &ctx,
        &owner_token,
        json!({
            "title": "Shared audit",
            "categories": [
                {"name": "Cat", "questions": [{"text": "Q", "options": five_options()}]}
            ]
        }),
    )
    .await;
    let audit_id = created["id"].as_str().expect("audit id");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/audits/{audit_id}/invitations"),
            Some(&owner_token),
            Some(json!({"email": "guest@example.com"})),
        ))
        .await
        .expect("invite");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {body}");
    assert_eq!(body["shared"], true);
    assert!(body["invitation_id"].is_null());

    // The share grants the guest read access immediately.
    let get = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/audits/{audit_id}"),
            Some(&guest_token),
            None,
        ))
        .await
        .expect("guest get");
    assert_eq!(get.status(), StatusCode::OK);
}

#[tokio::test]
async fn inviting_unknown_email_creates_pending_invitation() {
    let ctx = test_support::setup_test_context().await;

    let owner =
        test_support::insert_user(ctx.state.db(), "inviter@example.com", "Owner", "owner-pass")
            .await;
    let owner_token = test_support::session_token(&ctx.state, &owner.id).await;

    let created = create_audit(
        &ctx,
        &owner_token,
        json!({
            "title": "Invite audit",
            "categories": [
                {"name": "Cat", "questions": [{"text": "Q", "options": five_options()}]}
            ]
        }),
    )
    .await;
    let audit_id = created["id"].as_str().expect("audit id");

    let body = test_support::read_json(
        ctx.app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                &format!("/api/v1/audits/{audit_id}/invitations"),
                Some(&owner_token),
                Some(json!({"email": "newcomer@example.com"})),
            ))
            .await
            .expect("invite"),
    )
    .await;

    assert_eq!(body["shared"], false);
    let invitation_id = body["invitation_id"].as_str().expect("invitation id");

    let status: String =
        sqlx::query_scalar("SELECT status::text FROM invitations WHERE id = $1")
            .bind(invitation_id)
            .fetch_one(ctx.state.db())
            .await
            .expect("invitation status");
    assert_eq!(status, "pending");
}
