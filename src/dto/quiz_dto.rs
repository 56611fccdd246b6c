use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::quiz::{Question, QuestionType, QuizSettings};
use crate::models::response::QuizResponse;
use crate::services::scoring_service::{QuizStats, ReplayItem};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionPayload {
    pub id: Option<String>,
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPayload {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[validate(length(max = 5000))]
    pub text: String,
    pub points: Option<f64>,
    pub timer: Option<u32>,
    pub explanation: Option<String>,
    pub options: Option<Vec<OptionPayload>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuizPayload {
    #[validate(length(max = 300))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    #[validate(nested)]
    pub questions: Vec<QuestionPayload>,
    pub cover_image: Option<String>,
    pub banner_url: Option<String>,
    pub theme_color: Option<String>,
    pub settings: Option<QuizSettings>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuizListQuery {
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareResponse {
    pub token: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSummary {
    pub id: String,
    pub respondent_name: String,
    pub total_score: f64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl From<&QuizResponse> for ResponseSummary {
    fn from(r: &QuizResponse) -> Self {
        Self {
            id: r.id.clone(),
            respondent_name: r.respondent_name.clone(),
            total_score: r.total_score,
            start_time: r.start_time,
            end_time: r.end_time,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub quiz_id: String,
    pub title: String,
    pub stats: QuizStats,
    pub responses: Vec<ResponseSummary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayResponse {
    pub response: ResponseSummary,
    pub items: Vec<ReplayItem>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerateQuizPayload {
    #[validate(length(min = 1, max = 500))]
    pub topic: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewQuestionPayload {
    pub question: Question,
}
