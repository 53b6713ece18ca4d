use super::*;
use crate::api::extract::IDENTITY_HEADER;
use crate::config::{Config, DatabaseConfig, Environment};
use crate::storage::connection::connect_in_memory;
use crate::storage::entity::application::YearOfStudy;
use crate::storage::entity::user::Role;
use crate::storage::repository::{UserPatch, UserRepository};
use crate::test_support::{choice_field, seed_admin, seed_form, seed_leader, seed_opening, seed_user, submit};
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_config() -> Config {
    Config {
        port: 0,
        environment: Environment::Development,
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
        },
        bootstrap_admin: None,
    }
}

async fn call(app: &Router, method: &str, uri: &str, user: Option<i32>, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(id) = user {
        req = req.header(IDENTITY_HEADER, id.to_string());
    }
    let req = match body {
        Some(b) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn health_and_unknown_routes() {
    let app = router(AppState::new(connect_in_memory().await, test_config()));

    let res = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"API is running!");

    let (status, body) = call(&app, "GET", "/api/nowhere", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "success": false, "message": "Route not found" }));
}

#[tokio::test]
async fn reports_require_an_active_known_user() {
    let db = connect_in_memory().await;
    let admin = seed_admin(&db).await;
    let opening = seed_opening(&db, admin.id, true).await;
    let retired = seed_user(&db, "old@example.com", Role::Leader).await;
    UserRepository::update(
        &db,
        retired.clone(),
        UserPatch {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let app = router(AppState::new(db, test_config()));
    let uri = format!("/api/applications/analysis/{}/summary", opening.id);

    let (status, body) = call(&app, "GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], json!(false));

    let (status, _) = call(&app, "GET", &uri, Some(retired.id), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(&app, "GET", &uri, Some(999), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn submission_flows_into_summary_and_questions() {
    let db = connect_in_memory().await;
    let admin = seed_admin(&db).await;
    let opening = seed_opening(&db, admin.id, true).await;
    let schema = seed_form(&db, &opening, admin.id, false, vec![choice_field("Team", &["Red", "Blue"], true)]).await;
    let team = schema.fields[0].id;
    let app = router(AppState::new(db, test_config()));

    let submission = json!({
        "openingId": opening.id,
        "formId": schema.form.id,
        "name": "Ada",
        "yearOfStudy": "SECOND",
        "phoneNumber": "5550100",
        "email": "ada@example.com",
        "branch": "CS",
        "fieldResponses": [{ "fieldId": team, "responseValue": "Red" }]
    });
    let (status, body) = call(&app, "POST", "/api/applications", None, Some(submission.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["application"]["fieldResponses"][0]["responseValue"], json!("Red"));

    let (status, body) = call(&app, "POST", "/api/applications", None, Some(submission)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("You have already applied to this opening"));

    let uri = format!("/api/applications/analysis/{}/summary", opening.id);
    let (status, body) = call(&app, "GET", &uri, Some(admin.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalApplications"], json!(1));
    assert_eq!(body["data"]["branchDistribution"], json!({ "CS": 1 }));
    assert_eq!(body["data"]["yearDistribution"], json!({ "SECOND": 1 }));

    let uri = format!("/api/applications/analysis/{}/questions", opening.id);
    let (status, body) = call(&app, "GET", &uri, Some(admin.id), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("fieldId query parameter is required"));

    let (status, body) = call(&app, "GET", &format!("{uri}?fieldId={team}"), Some(admin.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["responses"][0]["applicantName"], json!("Ada"));
}

#[tokio::test]
async fn inactive_opening_rejects_submissions() {
    let db = connect_in_memory().await;
    let admin = seed_admin(&db).await;
    let opening = seed_opening(&db, admin.id, false).await;
    let schema = seed_form(&db, &opening, admin.id, false, vec![]).await;
    let app = router(AppState::new(db, test_config()));

    let (status, body) = call(
        &app,
        "POST",
        "/api/applications",
        None,
        Some(json!({
            "openingId": opening.id,
            "formId": schema.form.id,
            "name": "Late",
            "yearOfStudy": "FIRST",
            "phoneNumber": "5550100",
            "email": "late@example.com",
            "branch": "CS"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("This opening is no longer accepting applications"));
}

#[tokio::test]
async fn malformed_bodies_are_bad_requests() {
    let db = connect_in_memory().await;
    let admin = seed_admin(&db).await;
    let app = router(AppState::new(db, test_config()));

    let (status, body) = call(
        &app,
        "POST",
        "/api/openings",
        Some(admin.id),
        Some(json!({ "title": "x", "workType": "SPACE" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));

    let (status, _) = call(&app, "GET", "/api/openings/abc", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn export_is_a_csv_attachment() {
    let db = connect_in_memory().await;
    let admin = seed_admin(&db).await;
    let opening = seed_opening(&db, admin.id, true).await;
    let schema = seed_form(&db, &opening, admin.id, false, vec![]).await;
    submit(&db, &schema, "a@example.com", "CS", YearOfStudy::First, vec![]).await;
    let app = router(AppState::new(db, test_config()));

    let req = Request::builder()
        .uri(format!("/api/applications/analysis/{}/export", opening.id))
        .header(IDENTITY_HEADER, admin.id.to_string())
        .body(Body::empty())
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    assert_eq!(
        res.headers()[header::CONTENT_DISPOSITION].to_str().unwrap(),
        "attachment; filename=\"Backend_Developer_applications.csv\""
    );
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.starts_with("Name,Year of Study,"));
    assert_eq!(text.lines().count(), 2);
}

#[tokio::test]
async fn role_and_ownership_gates() {
    let db = connect_in_memory().await;
    let admin = seed_admin(&db).await;
    let owner = seed_leader(&db, "owner@example.com").await;
    let other = seed_leader(&db, "other@example.com").await;
    let opening = seed_opening(&db, owner.id, true).await;
    let schema = seed_form(&db, &opening, owner.id, false, vec![]).await;
    let app_row = submit(&db, &schema, "a@example.com", "CS", YearOfStudy::First, vec![]).await;
    let app = router(AppState::new(db, test_config()));

    let toggle = format!("/api/openings/{}/toggle-status", opening.id);
    let (status, body) = call(&app, "PATCH", &toggle, Some(other.id), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], json!("Access denied (not owner)"));

    let (status, body) = call(&app, "PATCH", &toggle, Some(owner.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["opening"]["isActive"], json!(false));

    let delete = format!("/api/applications/{}", app_row.application.id);
    let (status, _) = call(&app, "DELETE", &delete, Some(owner.id), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = call(&app, "DELETE", &delete, Some(admin.id), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&app, "GET", &delete, Some(admin.id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn public_opening_read_counts_views() {
    let db = connect_in_memory().await;
    let admin = seed_admin(&db).await;
    let opening = seed_opening(&db, admin.id, true).await;
    let app = router(AppState::new(db, test_config()));

    let uri = format!("/api/openings/{}", opening.id);
    call(&app, "GET", &uri, None, None).await;
    let (status, body) = call(&app, "GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["opening"]["views"], json!(2));

    let (status, _) = call(&app, "GET", "/api/openings/999", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn form_creation_and_field_reorder() {
    let db = connect_in_memory().await;
    let admin = seed_admin(&db).await;
    let opening = seed_opening(&db, admin.id, true).await;
    let app = router(AppState::new(db, test_config()));

    let (status, body) = call(
        &app,
        "POST",
        "/api/forms",
        Some(admin.id),
        Some(json!({
            "openingId": opening.id,
            "hasPriorExp": true,
            "customFields": [
                { "fieldTitle": "Team", "inputType": "MULTIPLE_CHOICE", "isRequired": true, "options": ["Red", "Blue"] },
                { "fieldTitle": "Why", "inputType": "LONG_ANSWER" }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let form_id = body["data"]["form"]["id"].as_i64().unwrap();
    let team = body["data"]["form"]["customFields"][0]["id"].as_i64().unwrap();
    let why = body["data"]["form"]["customFields"][1]["id"].as_i64().unwrap();

    let (status, body) = call(
        &app,
        "POST",
        "/api/forms",
        Some(admin.id),
        Some(json!({ "openingId": opening.id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Form already exists for this opening"));

    let (status, body) = call(
        &app,
        "PATCH",
        "/api/form-fields/reorder",
        Some(admin.id),
        Some(json!({
            "formId": form_id,
            "fieldOrders": [{ "fieldId": team, "order": 2 }, { "fieldId": why, "order": 1 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["fields"][0]["fieldTitle"], json!("Why"));

    let (status, body) = call(&app, "GET", &format!("/api/forms/opening/{}", opening.id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["form"]["customFields"][1]["fieldTitle"], json!("Team"));

    let (status, _) = call(
        &app,
        "PATCH",
        "/api/form-fields/reorder",
        Some(admin.id),
        Some(json!({ "formId": form_id, "fieldOrders": [{ "fieldId": 999, "order": 1 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
