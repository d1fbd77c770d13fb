mod common;

use anyhow::Result;
use axum::http::{header, StatusCode};
use serde_json::{json, Value};

use common::{TestApp, ADMIN_EMAIL, ADMIN_PASSWORD};

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let app = TestApp::new().await?;

    let res = app.get("/health", None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn unknown_route_is_a_json_404() -> Result<()> {
    let app = TestApp::new().await?;

    let res = app.get("/nowhere", None).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body, json!({ "message": "Route not found" }));
    Ok(())
}

#[tokio::test]
async fn openapi_document_covers_the_routes() -> Result<()> {
    let app = TestApp::new().await?;

    let res = app.get("/openapi.json", None).await?;
    assert_eq!(res.status, StatusCode::OK);
    let paths = &res.body["paths"];
    assert!(paths["/exercises/{id}/attempts"]["post"].is_object());
    assert!(paths["/subjects/hard/{id}"]["delete"]["security"].is_array());
    assert!(paths["/topics"]["get"].get("security").is_none());
    assert!(res.body["components"]["securitySchemes"]["cookieAuth"].is_object());

    let res = app.get("/docs/", None).await?;
    assert_eq!(res.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn self_is_null_without_a_session() -> Result<()> {
    let app = TestApp::new().await?;

    let res = app.get("/auth/self", None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, Value::Null);

    let res = app.get("/auth/self", Some("not-a-token")).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, Value::Null);
    Ok(())
}

#[tokio::test]
async fn signup_signs_the_new_user_in() -> Result<()> {
    let app = TestApp::new().await?;

    let token = app.signup("lea@example.com").await?;
    let res = app.get("/auth/self", Some(&token)).await?;
    assert_eq!(res.body["email"], "lea@example.com");
    assert_eq!(res.body["isAdmin"], false);
    assert_eq!(res.body["yearOfBirth"], 2005);
    Ok(())
}

#[tokio::test]
async fn signup_with_a_used_email_is_rejected() -> Result<()> {
    let app = TestApp::new().await?;
    app.signup("lea@example.com").await?;

    let res = app
        .post(
            "/auth/signup",
            json!({
                "email": "LEA@example.com",
                "password": "another-pass",
                "name": "Second Lea",
                "yearOfBirth": 2001,
                "isMale": true,
            }),
            None,
        )
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["errors"][0]["message"], "Email is already in use");
    assert!(res.session_token().is_none());
    Ok(())
}

#[tokio::test]
async fn signup_reports_every_invalid_field() -> Result<()> {
    let app = TestApp::new().await?;

    let res = app
        .post("/auth/signup", json!({ "email": "nope", "password": "123" }), None)
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "Validation failed");

    let fields: Vec<&str> = res.body["errors"]
        .as_array()
        .map(|errors| errors.iter().filter_map(|e| e["field"].as_str()).collect())
        .unwrap_or_default();
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"password"));
    assert!(fields.contains(&"name"));
    Ok(())
}

#[tokio::test]
async fn signin_distinguishes_unknown_email_and_bad_password() -> Result<()> {
    let app = TestApp::new().await?;

    let res = app
        .post("/auth/signin", json!({ "email": "ghost@example.com", "password": "whatever" }), None)
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "Email not found");

    let res = app
        .post("/auth/signin", json!({ "email": ADMIN_EMAIL, "password": "wrong-password" }), None)
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "Invalid credentials");
    assert!(res.session_token().is_none());
    Ok(())
}

#[tokio::test]
async fn signin_returns_the_profile_and_an_http_only_cookie() -> Result<()> {
    let app = TestApp::new().await?;

    let res = app
        .post("/auth/signin", json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }), None)
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["email"], ADMIN_EMAIL);
    assert!(res.body.get("passwordHash").is_none());

    let cookie = res.headers.get(header::SET_COOKIE).and_then(|v| v.to_str().ok()).unwrap_or_default();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));
    Ok(())
}

#[tokio::test]
async fn signout_requires_a_session_and_clears_the_cookie() -> Result<()> {
    let app = TestApp::new().await?;

    let res = app.post("/auth/signout", json!({}), None).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = app.post("/auth/signout", json!({}), Some(&app.admin_token)).await?;
    assert_eq!(res.status, StatusCode::OK);
    let cookie = res.headers.get(header::SET_COOKIE).and_then(|v| v.to_str().ok()).unwrap_or_default();
    assert!(cookie.contains("Max-Age=0"));
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_a_json_400() -> Result<()> {
    let app = TestApp::new().await?;

    let res = app
        .request(axum::http::Method::POST, "/auth/signin", None, None)
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body["message"].is_string());
    Ok(())
}
