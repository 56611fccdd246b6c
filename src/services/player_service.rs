use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::dto::play_dto::{PlayerView, PublicQuestion};
use crate::error::{Error, Result};
use crate::models::draft::PlayerSnapshot;
use crate::models::quiz::Quiz;
use crate::models::response::{QuizResponse, ResponseEntry};
use crate::services::scoring_service::{
    ScoringService, MAX_CONFIDENCE, MIN_CONFIDENCE, NEUTRAL_CONFIDENCE,
};
use crate::utils::ids::short_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerPhase {
    NotStarted,
    InProgress,
    Submitted,
    Reviewing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not in progress; nothing counted.
    Idle,
    Counted,
    /// The overall timer ran out on this tick.
    TimeExpired,
}

/// One respondent's walk through a quiz.
#[derive(Debug, Clone)]
pub struct AssessmentPlayer {
    quiz: Quiz,
    phase: PlayerPhase,
    respondent_name: String,
    current_index: usize,
    answers: HashMap<String, String>,
    confidences: HashMap<String, u8>,
    elapsed_seconds: u64,
    started_at: Option<DateTime<Utc>>,
    response: Option<QuizResponse>,
    review_index: usize,
}

impl AssessmentPlayer {
    pub fn new(quiz: Quiz) -> Self {
        Self {
            quiz,
            phase: PlayerPhase::NotStarted,
            respondent_name: String::new(),
            current_index: 0,
            answers: HashMap::new(),
            confidences: HashMap::new(),
            elapsed_seconds: 0,
            started_at: None,
            response: None,
            review_index: 0,
        }
    }

    /// Rebuilds an in-progress player from a saved draft. Answers to
    /// questions that no longer exist are dropped.
    pub fn resume(quiz: Quiz, snapshot: PlayerSnapshot) -> Result<Self> {
        Self::ensure_playable(&quiz)?;
        let last = quiz.questions.len() - 1;
        let known = |id: &String| quiz.question(id).is_some();
        let answers = snapshot
            .answers
            .into_iter()
            .filter(|(id, _)| known(id))
            .collect();
        let confidences = snapshot
            .confidences
            .into_iter()
            .filter(|(id, level)| known(id) && (MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(level))
            .collect();

        Ok(Self {
            phase: PlayerPhase::InProgress,
            respondent_name: snapshot.respondent_name,
            current_index: snapshot.current_index.min(last),
            answers,
            confidences,
            elapsed_seconds: snapshot.elapsed_seconds,
            started_at: Some(snapshot.started_at),
            response: None,
            review_index: 0,
            quiz,
        })
    }

    fn ensure_playable(quiz: &Quiz) -> Result<()> {
        if !quiz.settings.is_released {
            return Err(Error::Forbidden(
                "this assessment is not open for responses".to_string(),
            ));
        }
        if quiz.questions.is_empty() {
            return Err(Error::BadRequest("this assessment has no questions".to_string()));
        }
        Ok(())
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn phase(&self) -> PlayerPhase {
        self.phase
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn response(&self) -> Option<&QuizResponse> {
        self.response.as_ref()
    }

    pub fn answer_for(&self, question_id: &str) -> Option<&str> {
        self.answers.get(question_id).map(String::as_str)
    }

    pub fn confidence_for(&self, question_id: &str) -> Option<u8> {
        self.confidences.get(question_id).copied()
    }

    fn require_phase(&self, expected: PlayerPhase, action: &str) -> Result<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(Error::InvalidTransition(format!(
                "cannot {} while {:?}",
                action, self.phase
            )))
        }
    }

    fn last_index(&self) -> usize {
        self.quiz.questions.len().saturating_sub(1)
    }

    fn current_question_id(&self) -> Result<String> {
        self.quiz
            .questions
            .get(self.current_index)
            .map(|q| q.id.clone())
            .ok_or_else(|| Error::Internal("question index out of range".to_string()))
    }

    pub fn start(&mut self, respondent_name: &str, now: DateTime<Utc>) -> Result<()> {
        self.require_phase(PlayerPhase::NotStarted, "start")?;
        let name = respondent_name.trim();
        if name.is_empty() {
            return Err(Error::BadRequest("please enter your name".to_string()));
        }
        Self::ensure_playable(&self.quiz)?;
        self.respondent_name = name.to_string();
        self.started_at = Some(now);
        self.phase = PlayerPhase::InProgress;
        Ok(())
    }

    pub fn answer(&mut self, answer: &str) -> Result<()> {
        self.require_phase(PlayerPhase::InProgress, "answer")?;
        let question_id = self.current_question_id()?;
        self.answers.insert(question_id, answer.to_string());
        Ok(())
    }

    pub fn set_confidence(&mut self, level: u8) -> Result<()> {
        self.require_phase(PlayerPhase::InProgress, "rate confidence")?;
        if !self.quiz.settings.require_confidence {
            return Err(Error::InvalidTransition(
                "this assessment does not collect confidence".to_string(),
            ));
        }
        if !(MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(&level) {
            return Err(Error::BadRequest(format!(
                "confidence must be between {} and {}",
                MIN_CONFIDENCE, MAX_CONFIDENCE
            )));
        }
        let question_id = self.current_question_id()?;
        self.confidences.insert(question_id, level);
        Ok(())
    }

    pub fn next(&mut self) -> Result<()> {
        self.require_phase(PlayerPhase::InProgress, "advance")?;
        if self.current_index >= self.last_index() {
            return Err(Error::InvalidTransition(
                "already on the last question".to_string(),
            ));
        }
        self.current_index += 1;
        Ok(())
    }

    pub fn back(&mut self) -> Result<()> {
        self.require_phase(PlayerPhase::InProgress, "go back")?;
        if self.current_index == 0 {
            return Err(Error::InvalidTransition(
                "already on the first question".to_string(),
            ));
        }
        self.current_index -= 1;
        Ok(())
    }

    /// One second of wall time. Only counts while in progress.
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != PlayerPhase::InProgress {
            return TickOutcome::Idle;
        }
        self.elapsed_seconds += 1;
        let limit = u64::from(self.quiz.settings.overall_timer);
        if limit > 0 && self.elapsed_seconds >= limit {
            TickOutcome::TimeExpired
        } else {
            TickOutcome::Counted
        }
    }

    pub fn time_remaining(&self) -> Option<u64> {
        match self.quiz.settings.overall_timer {
            0 => None,
            limit => Some(u64::from(limit).saturating_sub(self.elapsed_seconds)),
        }
    }

    /// Submit from the last question.
    pub fn submit(&mut self, now: DateTime<Utc>) -> Result<QuizResponse> {
        let response = self.prepare_submit(now)?;
        self.record_submission(response.clone());
        Ok(response)
    }

    /// Explicit end action: submit from any question.
    pub fn finish(&mut self, now: DateTime<Utc>) -> Result<QuizResponse> {
        let response = self.prepare_finish(now)?;
        self.record_submission(response.clone());
        Ok(response)
    }

    /// The response `submit` would produce, without leaving `InProgress`.
    pub fn prepare_submit(&self, now: DateTime<Utc>) -> Result<QuizResponse> {
        self.require_phase(PlayerPhase::InProgress, "submit")?;
        if self.current_index != self.last_index() {
            return Err(Error::InvalidTransition(
                "submit is only available on the last question".to_string(),
            ));
        }
        Ok(self.build_response(now))
    }

    /// The response `finish` would produce, without leaving `InProgress`.
    pub fn prepare_finish(&self, now: DateTime<Utc>) -> Result<QuizResponse> {
        self.require_phase(PlayerPhase::InProgress, "finish")?;
        Ok(self.build_response(now))
    }

    /// Moves to `Submitted` once `response` has been stored.
    pub fn record_submission(&mut self, response: QuizResponse) {
        self.phase = PlayerPhase::Submitted;
        self.response = Some(response);
    }

    fn build_response(&self, now: DateTime<Utc>) -> QuizResponse {
        let entries: Vec<ResponseEntry> = self
            .quiz
            .questions
            .iter()
            .map(|q| {
                let answer = self.answers.get(&q.id).cloned().unwrap_or_default();
                let confidence = if self.quiz.settings.require_confidence {
                    self.confidences
                        .get(&q.id)
                        .copied()
                        .unwrap_or(NEUTRAL_CONFIDENCE)
                } else {
                    NEUTRAL_CONFIDENCE
                };
                ResponseEntry {
                    question_id: q.id.clone(),
                    is_correct: ScoringService::grade_answer(q, &answer),
                    answer,
                    confidence,
                    time_spent: 0,
                }
            })
            .collect();

        let total_score = ScoringService::score_entries(&self.quiz, &entries);
        QuizResponse {
            id: short_id(),
            quiz_id: self.quiz.id.clone(),
            respondent_name: self.respondent_name.clone(),
            start_time: self.started_at.unwrap_or(now),
            end_time: now,
            entries,
            total_score,
        }
    }

    pub fn review(&mut self) -> Result<()> {
        self.require_phase(PlayerPhase::Submitted, "review")?;
        self.review_index = 0;
        self.phase = PlayerPhase::Reviewing;
        Ok(())
    }

    pub fn review_next(&mut self) -> Result<()> {
        self.require_phase(PlayerPhase::Reviewing, "advance review")?;
        if self.review_index >= self.last_index() {
            return Err(Error::InvalidTransition(
                "already reviewing the last question".to_string(),
            ));
        }
        self.review_index += 1;
        Ok(())
    }

    pub fn review_back(&mut self) -> Result<()> {
        self.require_phase(PlayerPhase::Reviewing, "go back in review")?;
        if self.review_index == 0 {
            return Err(Error::InvalidTransition(
                "already reviewing the first question".to_string(),
            ));
        }
        self.review_index -= 1;
        Ok(())
    }

    /// Draft of an in-progress play-through, `None` in any other phase.
    pub fn snapshot(&self) -> Option<PlayerSnapshot> {
        if self.phase != PlayerPhase::InProgress {
            return None;
        }
        Some(PlayerSnapshot {
            respondent_name: self.respondent_name.clone(),
            current_index: self.current_index,
            answers: self.answers.clone(),
            confidences: self.confidences.clone(),
            elapsed_seconds: self.elapsed_seconds,
            started_at: self.started_at.unwrap_or_else(Utc::now),
        })
    }

    pub fn view(&self) -> PlayerView {
        let in_progress = self.phase == PlayerPhase::InProgress;
        let current = self
            .quiz
            .questions
            .get(self.current_index)
            .filter(|_| in_progress);

        let (review_index, review_item) = match (&self.phase, &self.response) {
            (PlayerPhase::Reviewing, Some(response)) => (
                Some(self.review_index),
                ScoringService::replay(&self.quiz, response)
                    .into_iter()
                    .nth(self.review_index),
            ),
            _ => (None, None),
        };

        PlayerView {
            phase: self.phase,
            quiz_id: self.quiz.id.clone(),
            title: self.quiz.title.clone(),
            respondent_name: self.respondent_name.clone(),
            question_count: self.quiz.questions.len(),
            current_index: self.current_index,
            current_question: current.map(PublicQuestion::from),
            current_answer: current.and_then(|q| self.answers.get(&q.id).cloned()),
            current_confidence: current.and_then(|q| self.confidences.get(&q.id).copied()),
            require_confidence: self.quiz.settings.require_confidence,
            elapsed_seconds: self.elapsed_seconds,
            time_remaining_seconds: self.time_remaining(),
            score: self.response.as_ref().map(|r| r.total_score),
            max_score: self.quiz.max_score(),
            response_id: self.response.as_ref().map(|r| r.id.clone()),
            review_index,
            review_item,
        }
    }
}
