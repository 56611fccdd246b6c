#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use knowlearn_backend::{
    config::Config,
    error::Result,
    models::{
        quiz::{Question, QuestionType, Quiz, QuizOption, QuizSettings},
        response::{QuizResponse, ResponseEntry},
    },
    router,
    services::ai_service::{QuestionReview, QuizAssistant},
    store::MemoryStore,
    AppState,
};
use mockall::mock;
use serde_json::Value as JsonValue;
use tower::ServiceExt;

mock! {
    pub Assistant {}

    #[async_trait]
    impl QuizAssistant for Assistant {
        async fn generate_quiz(&self, topic: &str, creator_id: &str) -> Result<Quiz>;
        async fn review_question(&self, question: &Question) -> Result<QuestionReview>;
    }
}

pub fn test_config() -> Config {
    Config {
        server_address: "127.0.0.1:0".to_string(),
        database_url: None,
        jwt_secret: "test_secret_key".to_string(),
        session_ttl_hours: 24,
        ai_api_key: None,
        ai_api_url: "http://127.0.0.1:9/v1/chat/completions".to_string(),
        ai_model: "test-model".to_string(),
        ai_timeout_secs: 1,
        api_rps: 10_000,
        public_rps: 10_000,
        share_base_url: "http://localhost:5173".to_string(),
        player_idle_minutes: 120,
    }
}

pub fn test_state(assistant: MockAssistant) -> AppState {
    AppState::new(Arc::new(MemoryStore::new()), test_config(), Arc::new(assistant))
}

pub fn test_app(assistant: MockAssistant) -> (AppState, Router) {
    let state = test_state(assistant);
    let app = router(state.clone());
    (state, app)
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let req = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let resp = app.clone().oneshot(req).await.expect("response");
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.expect("body");
    let json = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null)
    };
    (status, json)
}

/// Registers an account and returns its bearer token.
pub async fn signup(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(serde_json::json!({
            "email": email,
            "name": "Test Educator",
            "password": "secret123"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "signup failed: {}", body);
    body["token"].as_str().expect("token").to_string()
}

fn mcq(id: &str, correct: &str) -> Question {
    Question {
        id: id.to_string(),
        question_type: QuestionType::Mcq,
        text: format!("Question {}", id),
        points: 1.0,
        timer: None,
        explanation: Some(format!("Because {}", correct)),
        options: Some(
            ["a", "b", "c"]
                .iter()
                .map(|o| QuizOption {
                    id: format!("{}-{}", id, o),
                    text: format!("Option {}", o.to_uppercase()),
                    is_correct: *o == correct,
                })
                .collect(),
        ),
    }
}

/// Two one-point mcq questions whose correct option is `a`.
pub fn two_mcq_quiz() -> Quiz {
    let at = Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap();
    Quiz {
        id: "quiz00001".to_string(),
        title: "Cell Biology".to_string(),
        description: "Basics".to_string(),
        creator_id: "educator01".to_string(),
        created_at: at,
        updated_at: at,
        questions: vec![mcq("q1", "a"), mcq("q2", "a")],
        banner_url: None,
        theme_color: Some("#6366f1".to_string()),
        cover_image: None,
        settings: QuizSettings::default(),
    }
}

/// Three questions: two mcq and a trailing short answer.
pub fn three_question_quiz() -> Quiz {
    let mut quiz = two_mcq_quiz();
    quiz.questions.push(Question {
        id: "q3".to_string(),
        question_type: QuestionType::ShortAnswer,
        text: "Explain osmosis".to_string(),
        points: 2.0,
        timer: None,
        explanation: None,
        options: None,
    });
    quiz
}

pub fn response_with(quiz: &Quiz, id: &str, choices: &[(&str, &str, u8)]) -> QuizResponse {
    let start = Utc.with_ymd_and_hms(2026, 1, 2, 10, 0, 0).unwrap();
    let entries = choices
        .iter()
        .map(|(qid, answer, confidence)| {
            let question = quiz.question(qid).expect("question");
            ResponseEntry {
                question_id: qid.to_string(),
                answer: answer.to_string(),
                confidence: *confidence,
                time_spent: 0,
                is_correct: question.is_mcq().then(|| question.is_correct_choice(answer)),
            }
        })
        .collect();
    QuizResponse {
        id: id.to_string(),
        quiz_id: quiz.id.clone(),
        respondent_name: format!("Student {}", id),
        start_time: start,
        end_time: start + chrono::Duration::seconds(90),
        entries,
        total_score: 0.0,
    }
}

pub fn quiz_payload(title: &str) -> JsonValue {
    serde_json::json!({
        "title": title,
        "description": "Built in a test",
        "questions": [
            {
                "type": "mcq",
                "text": "2 + 2 = ?",
                "points": 1,
                "options": [
                    {"id": "o1", "text": "3", "isCorrect": false},
                    {"id": "o2", "text": "4", "isCorrect": true}
                ]
            },
            {
                "type": "short_answer",
                "text": "Why?",
                "points": 2
            }
        ]
    })
}
