mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::{ids, str_of, TestApp};

#[tokio::test]
async fn create_subject_then_topic_links_them() -> Result<()> {
    let app = TestApp::new().await?;

    let res = app
        .post(
            "/subjects",
            json!({ "name": "Algebra", "iconUrl": "x", "description": "y" }),
            Some(&app.admin_token),
        )
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);
    let subject_id = res.id();
    assert!(!subject_id.is_empty());
    assert_eq!(res.body["topics"], json!([]));
    assert_eq!(res.body["isActive"], true);

    let topic = app.topic("Linear Equations", &subject_id, 1).await?;
    let topic_id = str_of(&topic, "id");
    assert_eq!(str_of(&topic, "subjectId"), subject_id);

    let res = app.get(&format!("/subjects/{}", subject_id), None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(ids(&res.body, "topics"), vec![topic_id]);
    Ok(())
}

#[tokio::test]
async fn mutations_require_an_admin_session() -> Result<()> {
    let app = TestApp::new().await?;
    let body = json!({ "name": "Geometry", "iconUrl": "x", "description": "y" });

    let res = app.post("/subjects", body.clone(), None).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["message"], "Authentication required");

    let learner = app.signup("learner@example.com").await?;
    let res = app.post("/subjects", body, Some(&learner)).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["message"], "Admin access required");

    let res = app.get("/subjects", None).await?;
    assert_eq!(res.body, json!([]));
    Ok(())
}

#[tokio::test]
async fn subject_names_are_unique() -> Result<()> {
    let app = TestApp::new().await?;
    app.subject("Algebra").await?;

    let res = app
        .post(
            "/subjects",
            json!({ "name": "Algebra", "iconUrl": "x", "description": "y" }),
            Some(&app.admin_token),
        )
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["errors"][0]["field"], "name");
    assert_eq!(res.body["errors"][0]["message"], "Subject with this name already exists");
    Ok(())
}

#[tokio::test]
async fn missing_fields_fail_before_any_write() -> Result<()> {
    let app = TestApp::new().await?;

    let res = app.post("/subjects", json!({ "name": "Algebra" }), Some(&app.admin_token)).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "Validation failed");
    assert_eq!(res.body["errors"][0], json!({ "field": "iconUrl", "message": "iconUrl is required" }));

    let res = app.get("/subjects", None).await?;
    assert_eq!(res.body, json!([]));
    Ok(())
}

#[tokio::test]
async fn update_changes_only_given_fields() -> Result<()> {
    let app = TestApp::new().await?;
    let subject = app.subject("Algebra").await?;
    let id = str_of(&subject, "id");

    let res = app
        .put(&format!("/subjects/{}", id), json!({ "description": "Symbols and rules" }), Some(&app.admin_token))
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["name"], "Algebra");
    assert_eq!(res.body["description"], "Symbols and rules");
    Ok(())
}

#[tokio::test]
async fn update_cannot_blank_out_the_name() -> Result<()> {
    let app = TestApp::new().await?;
    let id = str_of(&app.subject("Algebra").await?, "id");

    let res = app
        .put(&format!("/subjects/{}", id), json!({ "name": "   " }), Some(&app.admin_token))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["errors"][0], json!({ "field": "name", "message": "name cannot be empty" }));

    let res = app.get(&format!("/subjects/{}", id), None).await?;
    assert_eq!(res.body["name"], "Algebra");
    Ok(())
}

#[tokio::test]
async fn soft_delete_hides_from_active_listing() -> Result<()> {
    let app = TestApp::new().await?;
    let algebra = app.subject("Algebra").await?;
    app.subject("Geometry").await?;

    let res = app
        .delete(&format!("/subjects/soft/{}", str_of(&algebra, "id")), Some(&app.admin_token))
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["isActive"], false);

    let res = app.get("/subjects?active=true", None).await?;
    let names: Vec<&str> = res.body.as_array().map(|s| s.iter().filter_map(|x| x["name"].as_str()).collect()).unwrap_or_default();
    assert_eq!(names, ["Geometry"]);

    let res = app.get("/subjects", None).await?;
    assert_eq!(res.body.as_array().map(Vec::len), Some(2));
    Ok(())
}

#[tokio::test]
async fn hard_delete_is_guarded_by_children() -> Result<()> {
    let app = TestApp::new().await?;
    let subject = app.subject("Algebra").await?;
    let subject_id = str_of(&subject, "id");
    let topic = app.topic("Linear Equations", &subject_id, 1).await?;

    let res = app.delete(&format!("/subjects/hard/{}", subject_id), Some(&app.admin_token)).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "Cannot delete subject with existing topics");
    let res = app.get(&format!("/subjects/{}", subject_id), None).await?;
    assert_eq!(res.status, StatusCode::OK);

    let res = app
        .delete(&format!("/topics/hard/{}", str_of(&topic, "id")), Some(&app.admin_token))
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    let res = app.get(&format!("/subjects/{}", subject_id), None).await?;
    assert!(ids(&res.body, "topics").is_empty());

    let concept = app.concept("Variable", &subject_id).await?;
    let res = app.delete(&format!("/subjects/hard/{}", subject_id), Some(&app.admin_token)).await?;
    assert_eq!(res.body["message"], "Cannot delete subject with existing concepts");

    app.delete(&format!("/concepts/hard/{}", str_of(&concept, "id")), Some(&app.admin_token))
        .await?;
    let res = app.delete(&format!("/subjects/hard/{}", subject_id), Some(&app.admin_token)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["id"], subject_id);

    let res = app.get(&format!("/subjects/{}", subject_id), None).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["message"], "Subject not found");
    Ok(())
}

#[tokio::test]
async fn malformed_ids_are_rejected() -> Result<()> {
    let app = TestApp::new().await?;

    let res = app.get("/subjects/not-a-uuid", None).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "Invalid id format");
    Ok(())
}
