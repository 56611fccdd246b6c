use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::quiz::Quiz;

/// Resumable state of a respondent's play-through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub respondent_name: String,
    pub current_index: usize,
    #[serde(default)]
    pub answers: HashMap<String, String>,
    #[serde(default)]
    pub confidences: HashMap<String, u8>,
    #[serde(default)]
    pub elapsed_seconds: u64,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum DraftKind {
    Builder(Box<Quiz>),
    Player(PlayerSnapshot),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    #[serde(flatten)]
    pub kind: DraftKind,
    pub updated_at: DateTime<Utc>,
}

impl Draft {
    pub fn player(&self) -> Option<&PlayerSnapshot> {
        match &self.kind {
            DraftKind::Player(snapshot) => Some(snapshot),
            DraftKind::Builder(_) => None,
        }
    }

    pub fn builder(&self) -> Option<&Quiz> {
        match &self.kind {
            DraftKind::Builder(quiz) => Some(quiz),
            DraftKind::Player(_) => None,
        }
    }
}
