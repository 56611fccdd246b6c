use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::quiz::{Question, QuestionType, Quiz};
use crate::models::response::{QuizResponse, ResponseEntry};

pub const MIN_CONFIDENCE: u8 = 1;
pub const MAX_CONFIDENCE: u8 = 5;
pub const NEUTRAL_CONFIDENCE: u8 = 3;

/// Aggregate accuracy; `NoData` when nothing can be divided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "percent", rename_all = "snake_case")]
pub enum Accuracy {
    NoData,
    Percent(u32),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceBucket {
    pub confidence: u8,
    pub count: usize,
    pub correct: usize,
    pub accuracy: f64,
    pub accuracy_percent: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAccuracy {
    pub question_id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub correct: usize,
    pub responses: usize,
    pub accuracy: f64,
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizStats {
    pub total_responses: usize,
    pub max_score: f64,
    pub average_score: Option<f64>,
    pub accuracy: Accuracy,
    pub average_duration_seconds: Option<f64>,
    pub confidence_curve: Vec<ConfidenceBucket>,
    pub per_question: Vec<QuestionAccuracy>,
}

/// One question of a submitted response, as shown read-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayItem {
    pub question_id: String,
    pub question_text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub answer: String,
    pub answer_text: String,
    pub is_correct: Option<bool>,
    pub confidence: Option<u8>,
    pub points: f64,
    pub explanation: Option<String>,
}

pub struct ScoringService;

impl ScoringService {
    /// `Some` for multiple-choice questions only; short answers are never
    /// auto-graded.
    pub fn grade_answer(question: &Question, answer: &str) -> Option<bool> {
        match question.question_type {
            QuestionType::Mcq => Some(question.is_correct_choice(answer)),
            QuestionType::ShortAnswer => None,
        }
    }

    pub fn max_score(quiz: &Quiz) -> f64 {
        quiz.max_score()
    }

    /// Sum of points of correctly answered multiple-choice questions. Entries
    /// are matched by question id; entries for unknown questions are ignored
    /// and each question counts at most once.
    pub fn score_entries(quiz: &Quiz, entries: &[ResponseEntry]) -> f64 {
        quiz.questions
            .iter()
            .filter(|q| q.is_mcq())
            .filter(|q| {
                entries
                    .iter()
                    .find(|e| e.question_id == q.id)
                    .is_some_and(|e| e.is_correct == Some(true))
            })
            .map(|q| q.points)
            .sum()
    }

    pub fn score_response(quiz: &Quiz, response: &QuizResponse) -> f64 {
        Self::score_entries(quiz, &response.entries)
    }

    /// Mean score over the maximum, rounded half away from zero.
    pub fn accuracy(quiz: &Quiz, responses: &[QuizResponse]) -> Accuracy {
        let max = quiz.max_score();
        match Self::average_score(quiz, responses) {
            Some(avg) if max > 0.0 => Accuracy::Percent(round_percent(avg / max)),
            _ => Accuracy::NoData,
        }
    }

    pub fn average_score(quiz: &Quiz, responses: &[QuizResponse]) -> Option<f64> {
        if responses.is_empty() {
            return None;
        }
        let total: f64 = responses
            .iter()
            .map(|r| Self::score_response(quiz, r))
            .sum();
        Some(total / responses.len() as f64)
    }

    pub fn confidence_curve(quiz: &Quiz, responses: &[QuizResponse]) -> Vec<ConfidenceBucket> {
        let mut buckets: BTreeMap<u8, (usize, usize)> = BTreeMap::new();

        for response in responses {
            for question in &quiz.questions {
                let Some(entry) = response.entry_for(&question.id) else {
                    continue;
                };
                if !(MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(&entry.confidence) {
                    continue;
                }
                let bucket = buckets.entry(entry.confidence).or_default();
                bucket.0 += 1;
                if entry.is_correct == Some(true) {
                    bucket.1 += 1;
                }
            }
        }

        buckets
            .into_iter()
            .map(|(confidence, (count, correct))| {
                let accuracy = correct as f64 / count as f64;
                ConfidenceBucket {
                    confidence,
                    count,
                    correct,
                    accuracy,
                    accuracy_percent: round_percent(accuracy),
                }
            })
            .collect()
    }

    /// Denominator is the number of responses, so missing entries count as
    /// incorrect.
    pub fn question_accuracy(quiz: &Quiz, responses: &[QuizResponse]) -> Vec<QuestionAccuracy> {
        quiz.questions
            .iter()
            .map(|question| {
                let correct = responses
                    .iter()
                    .filter(|r| {
                        r.entry_for(&question.id)
                            .is_some_and(|e| e.is_correct == Some(true))
                    })
                    .count();
                let total = responses.len();
                let (accuracy, percent) = if total == 0 {
                    (0.0, 0)
                } else {
                    (correct as f64 / total as f64, (correct * 100 / total) as u32)
                };
                QuestionAccuracy {
                    question_id: question.id.clone(),
                    text: question.text.clone(),
                    question_type: question.question_type,
                    correct,
                    responses: total,
                    accuracy,
                    percent,
                }
            })
            .collect()
    }

    pub fn stats(quiz: &Quiz, responses: &[QuizResponse]) -> QuizStats {
        let average_duration_seconds = if responses.is_empty() {
            None
        } else {
            let total: i64 = responses.iter().map(|r| r.duration_seconds()).sum();
            Some(total as f64 / responses.len() as f64)
        };

        QuizStats {
            total_responses: responses.len(),
            max_score: quiz.max_score(),
            average_score: Self::average_score(quiz, responses),
            accuracy: Self::accuracy(quiz, responses),
            average_duration_seconds,
            confidence_curve: Self::confidence_curve(quiz, responses),
            per_question: Self::question_accuracy(quiz, responses),
        }
    }

    /// Walks the quiz's current questions and pairs each with the response's
    /// entry, if any.
    pub fn replay(quiz: &Quiz, response: &QuizResponse) -> Vec<ReplayItem> {
        quiz.questions
            .iter()
            .map(|question| {
                let entry = response.entry_for(&question.id);
                let answer = entry.map(|e| e.answer.clone()).unwrap_or_default();
                let answer_text = match question.question_type {
                    QuestionType::Mcq => question
                        .option(&answer)
                        .map(|o| o.text.clone())
                        .unwrap_or_else(|| "No Answer".to_string()),
                    QuestionType::ShortAnswer if answer.is_empty() => "No Response".to_string(),
                    QuestionType::ShortAnswer => answer.clone(),
                };
                let is_correct = match question.question_type {
                    QuestionType::Mcq => Some(entry.is_some_and(|e| e.is_correct == Some(true))),
                    QuestionType::ShortAnswer => None,
                };
                ReplayItem {
                    question_id: question.id.clone(),
                    question_text: question.text.clone(),
                    question_type: question.question_type,
                    answer,
                    answer_text,
                    is_correct,
                    confidence: entry.map(|e| e.confidence),
                    points: question.points,
                    explanation: question.explanation.clone(),
                }
            })
            .collect()
    }
}

fn round_percent(ratio: f64) -> u32 {
    let percent = (ratio * 100.0).round();
    if percent.is_finite() && percent > 0.0 {
        percent as u32
    } else {
        0
    }
}
