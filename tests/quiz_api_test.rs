mod common;

use axum::http::{Method, StatusCode};
use common::{quiz_payload, send, signup, test_app, two_mcq_quiz, MockAssistant};
use knowlearn_backend::{models::quiz::Quiz, services::share_service::ShareService};
use serde_json::json;

#[tokio::test]
async fn quiz_crud_is_scoped_to_the_creator() {
    let (_, app) = test_app(MockAssistant::new());
    let owner = signup(&app, "owner@example.com").await;
    let other = signup(&app, "other@example.com").await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/quizzes",
        Some(&owner),
        Some(quiz_payload("Arithmetic")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["themeColor"], "#6366f1");
    assert_eq!(created["settings"]["isReleased"], true);
    assert_eq!(created["questions"][0]["options"][1]["isCorrect"], true);
    assert!(created["questions"][1]["id"].as_str().unwrap().len() == 9);

    let (status, body) = send(&app, Method::GET, &format!("/api/quizzes/{}", id), Some(&other), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");

    let (status, list) = send(&app, Method::GET, "/api/quizzes", Some(&other), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(list.as_array().unwrap().is_empty());

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/quizzes/{}", id),
        Some(&owner),
        Some(quiz_payload("Arithmetic II")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Arithmetic II");
    assert_eq!(updated["createdAt"], created["createdAt"]);

    let (status, list) = send(&app, Method::GET, "/api/quizzes?search=ii", Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/quizzes/{}", id), Some(&owner), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = send(&app, Method::GET, &format!("/api/quizzes/{}", id), Some(&owner), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn more_than_one_correct_option_is_rejected() {
    let (_, app) = test_app(MockAssistant::new());
    let token = signup(&app, "t@example.com").await;

    let mut payload = quiz_payload("Ambiguous");
    payload["questions"][0]["options"][0]["isCorrect"] = json!(true);
    let (status, body) = send(&app, Method::POST, "/api/quizzes", Some(&token), Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");

    let mut payload = quiz_payload("Zero points");
    payload["questions"][1]["points"] = json!(0);
    let (status, _) = send(&app, Method::POST, "/api/quizzes", Some(&token), Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/quizzes",
        Some(&token),
        Some(quiz_payload("   ")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn share_link_imports_before_play() {
    let (_, author_app) = test_app(MockAssistant::new());
    let token = signup(&author_app, "author@example.com").await;
    let (_, created) = send(
        &author_app,
        Method::POST,
        "/api/quizzes",
        Some(&token),
        Some(quiz_payload("Shared quiz")),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, share) = send(
        &author_app,
        Method::GET,
        &format!("/api/quizzes/{}/share", id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let share_token = share["token"].as_str().unwrap().to_string();
    assert!(share["url"]
        .as_str()
        .unwrap()
        .ends_with(&format!("#/quiz/{}?share={}", id, share_token)));

    // A separate deployment has never seen this quiz.
    let (_, reader_app) = test_app(MockAssistant::new());
    let (status, body) = send(&reader_app, Method::GET, &format!("/api/play/{}", id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");

    let uri = format!("/api/play/{}?share={}", id, share_token);
    let (status, view) = send(&reader_app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["imported"], true);
    assert_eq!(view["totalQuestions"], 2);
    assert!(view.get("questions").is_none());

    let (status, view) = send(&reader_app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["imported"], false);

    let (status, body) = send(
        &reader_app,
        Method::GET,
        &format!("/api/play/{}?share=@@@@garbage", id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "corrupt_share_link");
}

#[tokio::test]
async fn share_token_for_another_quiz_is_rejected() {
    let (_, app) = test_app(MockAssistant::new());
    let quiz: Quiz = serde_json::from_value(json!({
        "id": "abc123xyz",
        "title": "Elsewhere",
        "description": "",
        "creatorId": "someone",
        "createdAt": "2026-01-01T00:00:00Z",
        "updatedAt": "2026-01-01T00:00:00Z",
        "questions": [],
        "settings": {"isReleased": true, "requireConfidence": true}
    }))
    .unwrap();
    let token = ShareService::encode(&quiz).unwrap();

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/play/other-id?share={}", token),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "corrupt_share_link");
}

#[tokio::test]
async fn share_token_with_invalid_content_is_not_imported() {
    let (state, app) = test_app(MockAssistant::new());

    let mut negative = two_mcq_quiz();
    negative.questions[1].points = -5.0;
    let mut ambiguous = two_mcq_quiz();
    ambiguous.id = "quiz00002".to_string();
    if let Some(options) = ambiguous.questions[0].options.as_mut() {
        options[1].is_correct = true;
    }

    for quiz in [&negative, &ambiguous] {
        let token = ShareService::encode(quiz).unwrap();
        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/api/play/{}?share={}", quiz.id, token),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
        assert_eq!(body["code"], "corrupt_share_link");
        assert!(state.storage.quiz_by_id(&quiz.id).await.unwrap().is_none());
    }
}

#[tokio::test]
async fn play_through_feeds_analytics_and_replay() {
    let (_, app) = test_app(MockAssistant::new());
    let token = signup(&app, "educator@example.com").await;
    let (_, created) = send(
        &app,
        Method::POST,
        "/api/quizzes",
        Some(&token),
        Some(quiz_payload("Analytics")),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, started) = send(
        &app,
        Method::POST,
        &format!("/api/play/{}/sessions", id),
        None,
        Some(json!({"respondentName": "Grace"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", started);
    assert_eq!(started["phase"], "in_progress");
    assert!(started["currentQuestion"]["options"][0].get("isCorrect").is_none());
    let sid = started["sessionId"].as_str().unwrap().to_string();
    assert!(started["resumeToken"].is_string());

    let base = format!("/api/play/sessions/{}", sid);
    let (status, _) = send(&app, Method::PATCH, &format!("{}/answer", base), None, Some(json!({"answer": "o2"}))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::PATCH, &format!("{}/confidence", base), None, Some(json!({"confidence": 5}))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::POST, &format!("{}/submit", base), None, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "invalid_transition");

    let (status, _) = send(&app, Method::POST, &format!("{}/next", base), None, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::PATCH, &format!("{}/answer", base), None, Some(json!({"answer": "It just is"}))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, submitted) = send(&app, Method::POST, &format!("{}/submit", base), None, None).await;
    assert_eq!(status, StatusCode::OK, "{}", submitted);
    assert_eq!(submitted["phase"], "submitted");
    assert_eq!(submitted["response"]["totalScore"], 1.0);
    let response_id = submitted["response"]["id"].as_str().unwrap().to_string();

    let (status, review) = send(&app, Method::POST, &format!("{}/review", base), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(review["reviewItem"]["answerText"], "4");

    let (status, analytics) = send(
        &app,
        Method::GET,
        &format!("/api/quizzes/{}/analytics", id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(analytics["stats"]["totalResponses"], 1);
    assert_eq!(analytics["stats"]["maxScore"], 3.0);
    assert_eq!(analytics["stats"]["accuracy"]["status"], "percent");
    assert_eq!(analytics["stats"]["accuracy"]["percent"], 33);
    assert_eq!(analytics["stats"]["confidenceCurve"][0]["confidence"], 3);
    assert_eq!(analytics["stats"]["confidenceCurve"][1]["confidence"], 5);
    assert_eq!(analytics["responses"][0]["respondentName"], "Grace");

    let (status, replay) = send(
        &app,
        Method::GET,
        &format!("/api/quizzes/{}/responses/{}", id, response_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replay["items"][0]["isCorrect"], true);
    assert_eq!(replay["items"][1]["answerText"], "It just is");
}

#[tokio::test]
async fn unreleased_quizzes_cannot_be_started() {
    let (_, app) = test_app(MockAssistant::new());
    let token = signup(&app, "educator@example.com").await;
    let mut payload = quiz_payload("Hidden");
    payload["settings"] = json!({"isReleased": false, "requireConfidence": true});
    let (_, created) = send(&app, Method::POST, "/api/quizzes", Some(&token), Some(payload)).await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/play/{}/sessions", id),
        None,
        Some(json!({"respondentName": "Grace"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");
}

#[tokio::test]
async fn builder_drafts_round_trip() {
    let (_, app) = test_app(MockAssistant::new());
    let token = signup(&app, "educator@example.com").await;

    let (status, _) = send(&app, Method::GET, "/api/quizzes/newquiz01/draft", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, saved) = send(
        &app,
        Method::PUT,
        "/api/quizzes/newquiz01/draft",
        Some(&token),
        Some(quiz_payload("Work in progress")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["id"], "newquiz01");

    let (status, draft) = send(&app, Method::GET, "/api/quizzes/newquiz01/draft", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(draft["title"], "Work in progress");

    let other = signup(&app, "other@example.com").await;
    let (status, _) = send(&app, Method::GET, "/api/quizzes/newquiz01/draft", Some(&other), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/quizzes/newquiz01/draft",
        Some(&other),
        Some(quiz_payload("Hijacked")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (_, draft) = send(&app, Method::GET, "/api/quizzes/newquiz01/draft", Some(&token), None).await;
    assert_eq!(draft["title"], "Work in progress");

    let (status, _) = send(&app, Method::DELETE, "/api/quizzes/newquiz01/draft", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, "/api/quizzes/newquiz01/draft", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
