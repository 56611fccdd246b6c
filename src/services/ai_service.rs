use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{Error, ExternalServiceError, Result};
use crate::models::quiz::{Question, QuestionType, Quiz, QuizOption, QuizSettings};
use crate::services::quiz_service::DEFAULT_THEME_COLOR;
use crate::utils::ids::short_id;

pub const GENERATED_QUESTION_COUNT: usize = 5;
pub const REVIEW_UNAVAILABLE: &str = "Pedagogical review currently unavailable.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionReview {
    pub suggestion: String,
    pub difficulty: Difficulty,
}

impl QuestionReview {
    pub fn unavailable() -> Self {
        Self {
            suggestion: REVIEW_UNAVAILABLE.to_string(),
            difficulty: Difficulty::Medium,
        }
    }
}

/// Text-generation backend used by the builder.
#[async_trait]
pub trait QuizAssistant: Send + Sync {
    async fn generate_quiz(&self, topic: &str, creator_id: &str) -> Result<Quiz>;
    async fn review_question(&self, question: &Question) -> Result<QuestionReview>;
}

#[derive(Debug, Deserialize)]
pub struct GeneratedOption {
    pub text: String,
    #[serde(rename = "isCorrect")]
    pub is_correct: bool,
}

#[derive(Debug, Deserialize)]
pub struct GeneratedQuestion {
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub text: String,
    pub points: f64,
    pub explanation: String,
    #[serde(default)]
    pub options: Option<Vec<GeneratedOption>>,
}

#[derive(Debug, Deserialize)]
pub struct GeneratedQuiz {
    pub title: String,
    pub description: String,
    pub questions: Vec<GeneratedQuestion>,
}

#[derive(Clone)]
pub struct AIService {
    client: Client,
    api_key: Option<String>,
    api_url: String,
    model: String,
    timeout: Duration,
}

impl AIService {
    pub fn new(
        client: Client,
        api_key: Option<String>,
        api_url: String,
        model: String,
        timeout_secs: u64,
    ) -> Self {
        Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            api_url,
            model,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    async fn chat_openai(&self, payload: JsonValue) -> Result<JsonValue> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ExternalServiceError::CredentialInvalid)?;

        let res = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&payload)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ExternalServiceError::Transient(e.to_string()))?;

        let status = res.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ExternalServiceError::CredentialInvalid.into());
        }
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(
                ExternalServiceError::Transient(format!("AI API error {}: {}", status, text))
                    .into(),
            );
        }

        let body: JsonValue = res
            .json()
            .await
            .map_err(|e| ExternalServiceError::Transient(e.to_string()))?;

        body.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .and_then(|s| serde_json::from_str(s).ok())
            .ok_or_else(|| {
                ExternalServiceError::Transient("Invalid AI response format".to_string()).into()
            })
    }
}

#[async_trait]
impl QuizAssistant for AIService {
    async fn generate_quiz(&self, topic: &str, creator_id: &str) -> Result<Quiz> {
        let system_prompt = r#"You are an expert curriculum designer.
Return a JSON object {"title", "description", "questions"}.
Each question has "type" ("mcq" or "short_answer"), "text", "points", "explanation",
and for mcq an "options" array of {"text", "isCorrect"} with exactly one correct option.
Include a mix of mcq and short_answer questions. Give deep explanations for the correct answers."#;

        let user_content = format!(
            "Create a high-quality assessment about: \"{}\". It must have exactly {} questions. Every mcq has exactly 4 options.",
            topic, GENERATED_QUESTION_COUNT
        );

        let payload = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_content}
            ],
            "response_format": { "type": "json_object" },
            "temperature": 0.7
        });

        let raw = self.chat_openai(payload).await?;
        let quiz = build_generated_quiz(raw, topic, creator_id, Utc::now())?;
        tracing::info!(quiz_id = %quiz.id, questions = quiz.questions.len(), "quiz generated");
        Ok(quiz)
    }

    async fn review_question(&self, question: &Question) -> Result<QuestionReview> {
        let choices = match question.options() {
            [] => String::new(),
            opts => format!(
                "\nChoices: {}",
                opts.iter()
                    .map(|o| o.text.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        };
        let type_label = match question.question_type {
            QuestionType::Mcq => "mcq",
            QuestionType::ShortAnswer => "short_answer",
        };
        let user_content = format!(
            "Review this educational question for pedagogical clarity and accuracy.\nQuestion: {}\nType: {}{}",
            question.text, type_label, choices
        );

        let payload = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": "Return a JSON object {\"suggestion\": <brief suggestion>, \"difficulty\": \"Easy\" | \"Medium\" | \"Hard\"}."},
                {"role": "user", "content": user_content}
            ],
            "response_format": { "type": "json_object" }
        });

        match self.chat_openai(payload).await.and_then(parse_review) {
            Ok(review) => Ok(review),
            Err(Error::ExternalService(ExternalServiceError::Transient(reason))) => {
                tracing::warn!(%reason, "question review unavailable");
                Ok(QuestionReview::unavailable())
            }
            Err(e) => Err(e),
        }
    }
}

pub fn parse_review(raw: JsonValue) -> Result<QuestionReview> {
    serde_json::from_value(raw).map_err(|e| {
        ExternalServiceError::Transient(format!("review did not match schema: {}", e)).into()
    })
}

/// Turns raw model output into a quiz owned by `creator_id`. Every id is
/// freshly assigned; mcq questions with fewer than two options are dropped.
pub fn build_generated_quiz(
    raw: JsonValue,
    topic: &str,
    creator_id: &str,
    now: DateTime<Utc>,
) -> Result<Quiz> {
    let generated: GeneratedQuiz = serde_json::from_value(raw).map_err(|e| {
        ExternalServiceError::Transient(format!("generated quiz did not match schema: {}", e))
    })?;

    let questions: Vec<Question> = generated
        .questions
        .into_iter()
        .filter_map(build_generated_question)
        .take(GENERATED_QUESTION_COUNT)
        .collect();
    if questions.is_empty() {
        return Err(ExternalServiceError::Transient(
            "generated quiz contained no usable questions".to_string(),
        )
        .into());
    }

    let title = match generated.title.trim() {
        "" => topic.trim().to_string(),
        t => t.to_string(),
    };
    let description = match generated.description.trim() {
        "" => "AI-generated study resource.".to_string(),
        d => d.to_string(),
    };

    Ok(Quiz {
        id: short_id(),
        title,
        description,
        creator_id: creator_id.to_string(),
        created_at: now,
        updated_at: now,
        questions,
        banner_url: None,
        theme_color: Some(DEFAULT_THEME_COLOR.to_string()),
        cover_image: None,
        settings: QuizSettings::default(),
    })
}

fn build_generated_question(q: GeneratedQuestion) -> Option<Question> {
    let options = match q.question_type {
        QuestionType::Mcq => {
            let raw = q.options.unwrap_or_default();
            if raw.len() < 2 {
                return None;
            }
            // Keep the first option flagged correct; later flags are cleared.
            let mut seen_correct = false;
            Some(
                raw.into_iter()
                    .map(|o| {
                        let is_correct = o.is_correct && !seen_correct;
                        seen_correct |= is_correct;
                        QuizOption {
                            id: short_id(),
                            text: o.text,
                            is_correct,
                        }
                    })
                    .collect(),
            )
        }
        QuestionType::ShortAnswer => None,
    };

    let points = if q.points.is_finite() && q.points > 0.0 {
        q.points
    } else {
        1.0
    };

    Some(Question {
        id: short_id(),
        question_type: q.question_type,
        text: q.text,
        points,
        timer: None,
        explanation: Some(q.explanation).filter(|e| !e.trim().is_empty()),
        options,
    })
}
