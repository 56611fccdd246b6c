use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEntry {
    pub question_id: String,
    pub answer: String,
    pub confidence: u8,
    #[serde(default)]
    pub time_spent: u32,
    /// Only set for multiple-choice entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResponse {
    pub id: String,
    pub quiz_id: String,
    pub respondent_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub entries: Vec<ResponseEntry>,
    pub total_score: f64,
}

impl QuizResponse {
    pub fn entry_for(&self, question_id: &str) -> Option<&ResponseEntry> {
        self.entries.iter().find(|e| e.question_id == question_id)
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.end_time - self.start_time).num_seconds().max(0)
    }
}
