use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Mcq,
    ShortAnswer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOption {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub text: String,
    #[serde(default = "default_points")]
    pub points: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<QuizOption>>,
}

fn default_points() -> f64 {
    1.0
}

impl Question {
    pub fn is_mcq(&self) -> bool {
        self.question_type == QuestionType::Mcq
    }

    pub fn options(&self) -> &[QuizOption] {
        self.options.as_deref().unwrap_or_default()
    }

    pub fn option(&self, option_id: &str) -> Option<&QuizOption> {
        self.options().iter().find(|o| o.id == option_id)
    }

    /// Whether `answer` names a correct option. More than one option may be
    /// flagged correct in stored data; choosing any of them counts.
    pub fn is_correct_choice(&self, answer: &str) -> bool {
        self.option(answer).is_some_and(|o| o.is_correct)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSettings {
    pub is_released: bool,
    pub require_confidence: bool,
    #[serde(default)]
    pub shuffle_questions: bool,
    /// Seconds; 0 means unlimited.
    #[serde(default)]
    pub overall_timer: u32,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            is_released: true,
            require_confidence: true,
            shuffle_questions: false,
            overall_timer: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: String,
    pub title: String,
    pub description: String,
    pub creator_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub questions: Vec<Question>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    pub settings: QuizSettings,
}

impl Quiz {
    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    pub fn max_score(&self) -> f64 {
        self.questions.iter().map(|q| q.points).sum()
    }
}
