mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::{ids, str_of, TestApp};

#[tokio::test]
async fn moving_a_topic_updates_both_subjects() -> Result<()> {
    let app = TestApp::new().await?;
    let a = str_of(&app.subject("Algebra").await?, "id");
    let b = str_of(&app.subject("Geometry").await?, "id");
    let topic = str_of(&app.topic("Linear Equations", &a, 1).await?, "id");

    let res = app
        .put(&format!("/topics/{}", topic), json!({ "subjectId": b }), Some(&app.admin_token))
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(str_of(&res.body, "subjectId"), b);

    let a_doc = app.get(&format!("/subjects/{}", a), None).await?.body;
    let b_doc = app.get(&format!("/subjects/{}", b), None).await?.body;
    assert!(ids(&a_doc, "topics").is_empty());
    assert_eq!(ids(&b_doc, "topics"), vec![topic]);
    Ok(())
}

#[tokio::test]
async fn moving_to_a_missing_subject_changes_nothing() -> Result<()> {
    let app = TestApp::new().await?;
    let a = str_of(&app.subject("Algebra").await?, "id");
    let topic = str_of(&app.topic("Linear Equations", &a, 1).await?, "id");

    let ghost = uuid::Uuid::new_v4().to_string();
    let res = app
        .put(&format!("/topics/{}", topic), json!({ "subjectId": ghost }), Some(&app.admin_token))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["errors"][0]["message"], "Subject not found");

    let a_doc = app.get(&format!("/subjects/{}", a), None).await?.body;
    assert_eq!(ids(&a_doc, "topics"), vec![topic.clone()]);
    let topic_doc = app.get(&format!("/topics/{}", topic), None).await?.body;
    assert_eq!(str_of(&topic_doc, "subjectId"), a);
    Ok(())
}

#[tokio::test]
async fn positions_are_unique_within_a_subject() -> Result<()> {
    let app = TestApp::new().await?;
    let a = str_of(&app.subject("Algebra").await?, "id");
    let b = str_of(&app.subject("Geometry").await?, "id");
    app.topic("Linear Equations", &a, 1).await?;
    app.topic("Triangles", &b, 1).await?;

    let res = app
        .post(
            "/topics",
            json!({
                "name": "Quadratics",
                "subjectId": a,
                "position": 1,
                "difficultyRange": "Intermediate",
                "estimatedStudyHours": 4,
            }),
            Some(&app.admin_token),
        )
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["errors"][0]["message"], "Position 1 is already used in this subject");

    let second = str_of(&app.topic("Quadratics", &a, 2).await?, "id");
    let res = app
        .put(&format!("/topics/{}", second), json!({ "position": 1 }), Some(&app.admin_token))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .put(&format!("/topics/{}", second), json!({ "subjectId": b }), Some(&app.admin_token))
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn topics_list_by_subject_in_position_order() -> Result<()> {
    let app = TestApp::new().await?;
    let a = str_of(&app.subject("Algebra").await?, "id");
    let b = str_of(&app.subject("Geometry").await?, "id");
    app.topic("Quadratics", &a, 2).await?;
    app.topic("Linear Equations", &a, 1).await?;
    app.topic("Triangles", &b, 1).await?;

    let res = app.get(&format!("/topics?subjectId={}", a), None).await?;
    let names: Vec<&str> = res
        .body
        .as_array()
        .map(|t| t.iter().filter_map(|x| x["name"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(names, ["Linear Equations", "Quadratics"]);
    Ok(())
}

#[tokio::test]
async fn invalid_difficulty_range_is_reported() -> Result<()> {
    let app = TestApp::new().await?;
    let a = str_of(&app.subject("Algebra").await?, "id");

    let res = app
        .post(
            "/topics",
            json!({
                "name": "Quadratics",
                "subjectId": a,
                "position": 1,
                "difficultyRange": "Expert",
                "estimatedStudyHours": 4,
            }),
            Some(&app.admin_token),
        )
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["errors"][0]["field"], "difficultyRange");
    Ok(())
}

#[tokio::test]
async fn topic_with_subtopics_cannot_be_hard_deleted() -> Result<()> {
    let app = TestApp::new().await?;
    let a = str_of(&app.subject("Algebra").await?, "id");
    let topic = str_of(&app.topic("Linear Equations", &a, 1).await?, "id");
    app.subtopic("One variable", &topic, 1).await?;

    let res = app.delete(&format!("/topics/hard/{}", topic), Some(&app.admin_token)).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "Cannot delete topic with existing subtopics");

    let res = app.delete(&format!("/topics/soft/{}", topic), Some(&app.admin_token)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["isActive"], false);
    assert_eq!(res.body["subtopics"].as_array().map(Vec::len), Some(1));
    Ok(())
}
