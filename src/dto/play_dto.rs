use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::quiz::{Question, QuestionType, Quiz};
use crate::models::response::QuizResponse;
use crate::services::player_service::PlayerPhase;
use crate::services::scoring_service::ReplayItem;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicOption {
    pub id: String,
    pub text: String,
}

/// A question as a respondent sees it: no correctness flags, no explanation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuestion {
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub text: String,
    pub points: f64,
    pub timer: Option<u32>,
    pub options: Vec<PublicOption>,
}

impl From<&Question> for PublicQuestion {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id.clone(),
            question_type: q.question_type,
            text: q.text.clone(),
            points: q.points,
            timer: q.timer,
            options: q
                .options()
                .iter()
                .map(|o| PublicOption {
                    id: o.id.clone(),
                    text: o.text.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuizView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub cover_image: Option<String>,
    pub theme_color: Option<String>,
    pub is_released: bool,
    pub require_confidence: bool,
    pub overall_timer: u32,
    pub total_questions: usize,
    pub imported: bool,
}

impl PublicQuizView {
    pub fn new(quiz: &Quiz, imported: bool) -> Self {
        Self {
            id: quiz.id.clone(),
            title: quiz.title.clone(),
            description: quiz.description.clone(),
            cover_image: quiz.cover_image.clone(),
            theme_color: quiz.theme_color.clone(),
            is_released: quiz.settings.is_released,
            require_confidence: quiz.settings.require_confidence,
            overall_timer: quiz.settings.overall_timer,
            total_questions: quiz.questions.len(),
            imported,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub phase: PlayerPhase,
    pub quiz_id: String,
    pub title: String,
    pub respondent_name: String,
    pub question_count: usize,
    pub current_index: usize,
    pub current_question: Option<PublicQuestion>,
    pub current_answer: Option<String>,
    pub current_confidence: Option<u8>,
    pub require_confidence: bool,
    pub elapsed_seconds: u64,
    pub time_remaining_seconds: Option<u64>,
    pub score: Option<f64>,
    pub max_score: f64,
    pub response_id: Option<String>,
    pub review_index: Option<usize>,
    pub review_item: Option<ReplayItem>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: Uuid,
    /// Held by the respondent to pick this play-through up again later.
    pub resume_token: Uuid,
    pub resumed: bool,
    #[serde(flatten)]
    pub player: PlayerView,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitView {
    pub session_id: Uuid,
    pub response: QuizResponse,
    #[serde(flatten)]
    pub player: PlayerView,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayQuery {
    pub share: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    #[validate(length(max = 200))]
    pub respondent_name: String,
    pub resume_token: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AnswerRequest {
    #[validate(length(max = 10000))]
    pub answer: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ConfidenceRequest {
    #[validate(range(min = 1, max = 5))]
    pub confidence: u8,
}
