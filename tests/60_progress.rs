mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::{str_of, TestApp};

struct Course {
    topic: String,
    subtopic: String,
    concept: String,
    exercises: Vec<String>,
}

async fn course(app: &TestApp) -> Result<Course> {
    let subject = str_of(&app.subject("Algebra").await?, "id");
    let topic = str_of(&app.topic("Linear Equations", &subject, 1).await?, "id");
    let subtopic = str_of(&app.subtopic("One variable", &topic, 1).await?, "id");
    let module = str_of(&app.module("Balancing", &subtopic, 1).await?, "id");
    let concept = str_of(&app.concept("Variable", &subject).await?, "id");

    let mut exercises = Vec::new();
    for (question, answer) in [("x + 2 = 5", "3"), ("2x = 8", "4")] {
        let exercise = app
            .create(
                "/exercises",
                json!({
                    "moduleId": module,
                    "type": "numeric",
                    "question": question,
                    "correctAnswer": answer,
                    "explanation": "Undo each operation",
                    "difficultyLevel": 1,
                    "concepts": [{ "conceptId": concept, "isPrimaryFocus": true }],
                }),
            )
            .await?;
        exercises.push(str_of(&exercise, "id"));
    }

    Ok(Course {
        topic,
        subtopic,
        concept,
        exercises,
    })
}

#[tokio::test]
async fn attempts_require_a_session() -> Result<()> {
    let app = TestApp::new().await?;
    let c = course(&app).await?;

    let res = app
        .post(&format!("/exercises/{}/attempts", c.exercises[0]), json!({ "answer": "3" }), None)
        .await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn correct_attempt_raises_mastery_and_completion() -> Result<()> {
    let app = TestApp::new().await?;
    let c = course(&app).await?;
    let learner = app.signup("lea@example.com").await?;

    let res = app
        .post(&format!("/exercises/{}/attempts", c.exercises[0]), json!({ "answer": " 3.0 " }), Some(&learner))
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["isCorrect"], true);
    assert_eq!(res.body["explanation"], "Undo each operation");
    assert_eq!(res.body["conceptMastery"][0]["masteryPercentage"], 100.0);
    assert_eq!(res.body["subtopicProgress"]["completionPercentage"], 50.0);
    assert_eq!(res.body["topicProgress"]["completionPercentage"], 50.0);

    let res = app
        .post(&format!("/exercises/{}/attempts", c.exercises[1]), json!({ "answer": 5 }), Some(&learner))
        .await?;
    assert_eq!(res.body["isCorrect"], false);
    assert_eq!(res.body["correctAnswer"], "4");
    assert_eq!(res.body["conceptMastery"][0]["masteryPercentage"], 50.0);
    assert_eq!(res.body["subtopicProgress"]["completionPercentage"], 50.0);

    let report = app.get("/progress", Some(&learner)).await?;
    assert_eq!(report.status, StatusCode::OK);
    assert_eq!(report.body["recentResults"].as_array().map(Vec::len), Some(2));
    assert_eq!(report.body["concepts"][0]["conceptId"], c.concept);
    assert_eq!(report.body["subtopics"][0]["subtopicId"], c.subtopic);
    assert_eq!(report.body["topics"][0]["topicId"], c.topic);
    Ok(())
}

#[tokio::test]
async fn repeating_a_solved_exercise_does_not_double_count() -> Result<()> {
    let app = TestApp::new().await?;
    let c = course(&app).await?;
    let learner = app.signup("lea@example.com").await?;
    let path = format!("/exercises/{}/attempts", c.exercises[0]);

    app.post(&path, json!({ "answer": "3" }), Some(&learner)).await?;
    let res = app.post(&path, json!({ "answer": "3" }), Some(&learner)).await?;
    assert_eq!(res.body["subtopicProgress"]["completionPercentage"], 50.0);
    assert_eq!(res.body["conceptMastery"][0]["attempts"], 2);
    Ok(())
}

#[tokio::test]
async fn progress_is_per_user() -> Result<()> {
    let app = TestApp::new().await?;
    let c = course(&app).await?;
    let lea = app.signup("lea@example.com").await?;
    let max = app.signup("max@example.com").await?;

    app.post(&format!("/exercises/{}/attempts", c.exercises[0]), json!({ "answer": "3" }), Some(&lea))
        .await?;

    let report = app.get("/progress", Some(&max)).await?;
    assert_eq!(report.body["recentResults"], json!([]));
    assert_eq!(report.body["concepts"], json!([]));
    Ok(())
}

#[tokio::test]
async fn attempt_on_a_missing_exercise_is_404() -> Result<()> {
    let app = TestApp::new().await?;
    let learner = app.signup("lea@example.com").await?;

    let res = app
        .post(&format!("/exercises/{}/attempts", uuid::Uuid::new_v4()), json!({ "answer": "3" }), Some(&learner))
        .await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["message"], "Exercise not found");
    Ok(())
}

#[tokio::test]
async fn a_concept_linked_twice_is_rejected_and_counted_once() -> Result<()> {
    let app = TestApp::new().await?;
    let c = course(&app).await?;
    let learner = app.signup("lea@example.com").await?;

    let res = app
        .put(
            &format!("/exercises/{}", c.exercises[0]),
            json!({
                "concepts": [
                    { "conceptId": c.concept, "isPrimaryFocus": true },
                    { "conceptId": c.concept, "isPrimaryFocus": false },
                ]
            }),
            Some(&app.admin_token),
        )
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["errors"][0]["message"], "Each concept can be linked only once");

    let res = app
        .post(&format!("/exercises/{}/attempts", c.exercises[0]), json!({ "answer": "3" }), Some(&learner))
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["conceptMastery"].as_array().map(Vec::len), Some(1));

    let res = app.get("/progress", Some(&learner)).await?;
    assert_eq!(res.body["concepts"][0]["attempts"], 1);
    assert_eq!(res.body["concepts"][0]["correctAttempts"], 1);
    Ok(())
}
