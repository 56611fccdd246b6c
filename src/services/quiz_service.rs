use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::dto::play_dto::PublicQuizView;
use crate::dto::quiz_dto::{
    AnalyticsResponse, QuestionPayload, QuizPayload, ReplayResponse, ResponseSummary,
    ShareResponse,
};
use crate::error::{Error, Result};
use crate::models::draft::DraftKind;
use crate::models::quiz::{Question, QuestionType, Quiz, QuizOption};
use crate::services::auth_service::SessionContext;
use crate::services::scoring_service::ScoringService;
use crate::services::share_service::ShareService;
use crate::services::storage_service::StorageService;
use crate::utils::ids::short_id;

pub const DEFAULT_THEME_COLOR: &str = "#6366f1";

#[derive(Clone)]
pub struct QuizService {
    storage: StorageService,
    share_base_url: String,
}

impl QuizService {
    pub fn new(storage: StorageService, share_base_url: String) -> Self {
        Self {
            storage,
            share_base_url,
        }
    }

    /// The caller's quizzes, newest edit first, optionally filtered by a
    /// case-insensitive title search.
    pub async fn list(&self, ctx: &SessionContext, search: Option<&str>) -> Result<Vec<Quiz>> {
        let needle = search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        let mut quizzes: Vec<Quiz> = self
            .storage
            .quizzes_by_creator(&ctx.user_id)
            .await?
            .into_iter()
            .filter(|q| match &needle {
                Some(n) => q.title.to_lowercase().contains(n),
                None => true,
            })
            .collect();
        quizzes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(quizzes)
    }

    pub async fn create(&self, ctx: &SessionContext, payload: QuizPayload) -> Result<Quiz> {
        let now = Utc::now();
        let quiz = build_quiz(short_id(), &ctx.user_id, now, now, payload)?;
        validate_quiz(&quiz)?;
        self.storage.save_quiz(&quiz).await?;
        tracing::info!(quiz_id = %quiz.id, user_id = %ctx.user_id, "quiz created");
        Ok(quiz)
    }

    /// Persists a quiz produced elsewhere (AI generation) for its creator.
    pub async fn save_generated(&self, ctx: &SessionContext, mut quiz: Quiz) -> Result<Quiz> {
        quiz.creator_id = ctx.user_id.clone();
        validate_quiz(&quiz)?;
        self.storage.save_quiz(&quiz).await?;
        tracing::info!(quiz_id = %quiz.id, user_id = %ctx.user_id, "generated quiz saved");
        Ok(quiz)
    }

    pub async fn get_owned(&self, ctx: &SessionContext, quiz_id: &str) -> Result<Quiz> {
        let quiz = self
            .storage
            .quiz_by_id(quiz_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Assessment {} not found", quiz_id)))?;
        if quiz.creator_id != ctx.user_id {
            return Err(Error::Forbidden(
                "only the creator can manage this assessment".to_string(),
            ));
        }
        Ok(quiz)
    }

    /// Whole-record replacement; creator and creation time are kept.
    pub async fn update(
        &self,
        ctx: &SessionContext,
        quiz_id: &str,
        payload: QuizPayload,
    ) -> Result<Quiz> {
        let existing = self.get_owned(ctx, quiz_id).await?;
        let quiz = build_quiz(
            existing.id,
            &existing.creator_id,
            existing.created_at,
            Utc::now(),
            payload,
        )?;
        validate_quiz(&quiz)?;
        self.storage.save_quiz(&quiz).await?;
        tracing::info!(quiz_id = %quiz.id, "quiz updated");
        Ok(quiz)
    }

    pub async fn delete(&self, ctx: &SessionContext, quiz_id: &str) -> Result<()> {
        self.get_owned(ctx, quiz_id).await?;
        self.storage.delete_quiz(quiz_id).await?;
        self.storage.clear_quiz_drafts(quiz_id).await?;
        tracing::info!(quiz_id, "quiz deleted");
        Ok(())
    }

    pub async fn share(&self, ctx: &SessionContext, quiz_id: &str) -> Result<ShareResponse> {
        let quiz = self.get_owned(ctx, quiz_id).await?;
        Ok(ShareResponse {
            token: ShareService::encode(&quiz)?,
            url: ShareService::share_url(&self.share_base_url, &quiz)?,
        })
    }

    /// Entry point of the play flow. A share token is decoded and, when no
    /// local copy exists yet, stored under its original id before use.
    pub async fn public_quiz(&self, quiz_id: &str, share: Option<&str>) -> Result<PublicQuizView> {
        let mut imported = false;
        if let Some(token) = share.filter(|t| !t.trim().is_empty()) {
            let shared = ShareService::decode(token)?;
            if shared.id != quiz_id {
                return Err(Error::CorruptShareLink(
                    "link does not match the requested assessment".to_string(),
                ));
            }
            validate_quiz(&shared).map_err(|e| match e {
                Error::BadRequest(reason) => Error::CorruptShareLink(reason),
                other => other,
            })?;
            if self.storage.quiz_by_id(&shared.id).await?.is_none() {
                self.storage.save_quiz(&shared).await?;
                imported = true;
                tracing::info!(quiz_id = %shared.id, "quiz imported from share link");
            }
        }

        let quiz = self
            .storage
            .quiz_by_id(quiz_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Assessment {} not found", quiz_id)))?;
        Ok(PublicQuizView::new(&quiz, imported))
    }

    pub async fn analytics(&self, ctx: &SessionContext, quiz_id: &str) -> Result<AnalyticsResponse> {
        let quiz = self.get_owned(ctx, quiz_id).await?;
        let responses = self.storage.responses_for_quiz(quiz_id).await?;
        Ok(AnalyticsResponse {
            quiz_id: quiz.id.clone(),
            title: quiz.title.clone(),
            stats: ScoringService::stats(&quiz, &responses),
            responses: responses.iter().map(ResponseSummary::from).collect(),
        })
    }

    pub async fn replay(
        &self,
        ctx: &SessionContext,
        quiz_id: &str,
        response_id: &str,
    ) -> Result<ReplayResponse> {
        let quiz = self.get_owned(ctx, quiz_id).await?;
        let response = self
            .storage
            .responses_for_quiz(quiz_id)
            .await?
            .into_iter()
            .find(|r| r.id == response_id)
            .ok_or_else(|| Error::NotFound(format!("Response {} not found", response_id)))?;
        Ok(ReplayResponse {
            response: ResponseSummary::from(&response),
            items: ScoringService::replay(&quiz, &response),
        })
    }

    /// Saves unsaved builder state. The quiz itself need not exist yet, but an
    /// existing quiz must belong to the caller.
    pub async fn save_builder_draft(
        &self,
        ctx: &SessionContext,
        quiz_id: &str,
        payload: QuizPayload,
    ) -> Result<Quiz> {
        let created_at = match self.storage.quiz_by_id(quiz_id).await? {
            Some(existing) if existing.creator_id != ctx.user_id => {
                return Err(Error::Forbidden(
                    "only the creator can edit this assessment".to_string(),
                ))
            }
            Some(existing) => existing.created_at,
            None => Utc::now(),
        };
        let held_by_other = self
            .storage
            .draft(quiz_id)
            .await?
            .and_then(|d| d.builder().map(|q| q.creator_id != ctx.user_id))
            .unwrap_or(false);
        if held_by_other {
            return Err(Error::Forbidden(
                "another author holds a draft under this id".to_string(),
            ));
        }
        let quiz = build_quiz(quiz_id.to_string(), &ctx.user_id, created_at, Utc::now(), payload)?;
        self.storage
            .save_draft(quiz_id, DraftKind::Builder(Box::new(quiz.clone())))
            .await?;
        Ok(quiz)
    }

    pub async fn builder_draft(&self, ctx: &SessionContext, quiz_id: &str) -> Result<Quiz> {
        self.storage
            .draft(quiz_id)
            .await?
            .and_then(|d| d.builder().cloned())
            .filter(|q| q.creator_id == ctx.user_id)
            .ok_or_else(|| Error::NotFound(format!("No draft saved for {}", quiz_id)))
    }

    pub async fn clear_builder_draft(&self, ctx: &SessionContext, quiz_id: &str) -> Result<()> {
        self.builder_draft(ctx, quiz_id).await?;
        self.storage.clear_draft(quiz_id).await
    }
}

fn build_quiz(
    id: String,
    creator_id: &str,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    payload: QuizPayload,
) -> Result<Quiz> {
    let title = payload.title.trim().to_string();
    if title.is_empty() {
        return Err(Error::BadRequest("Please enter a title.".to_string()));
    }
    Ok(Quiz {
        id,
        title,
        description: payload.description,
        creator_id: creator_id.to_string(),
        created_at,
        updated_at,
        questions: payload.questions.into_iter().map(build_question).collect(),
        banner_url: payload.banner_url,
        theme_color: payload
            .theme_color
            .or_else(|| Some(DEFAULT_THEME_COLOR.to_string())),
        cover_image: payload.cover_image,
        settings: payload.settings.unwrap_or_default(),
    })
}

fn build_question(payload: QuestionPayload) -> Question {
    let options = match payload.question_type {
        QuestionType::Mcq => Some(
            payload
                .options
                .unwrap_or_default()
                .into_iter()
                .map(|o| QuizOption {
                    id: o.id.filter(|id| !id.is_empty()).unwrap_or_else(short_id),
                    text: o.text,
                    is_correct: o.is_correct,
                })
                .collect(),
        ),
        QuestionType::ShortAnswer => None,
    };
    Question {
        id: payload.id.filter(|id| !id.is_empty()).unwrap_or_else(short_id),
        question_type: payload.question_type,
        text: payload.text,
        points: payload.points.unwrap_or(1.0),
        timer: payload.timer,
        explanation: payload.explanation,
        options,
    }
}

/// Write-time invariants: unique ids, positive points, and at most one
/// correct option per multiple-choice question.
pub fn validate_quiz(quiz: &Quiz) -> Result<()> {
    let mut question_ids = HashSet::new();
    for (idx, q) in quiz.questions.iter().enumerate() {
        let label = format!("question {}", idx + 1);
        if !question_ids.insert(q.id.as_str()) {
            return Err(Error::BadRequest(format!("{}: duplicate id {}", label, q.id)));
        }
        if !(q.points.is_finite() && q.points > 0.0) {
            return Err(Error::BadRequest(format!("{}: points must be positive", label)));
        }
        match q.question_type {
            QuestionType::Mcq => {
                let options = q.options();
                if options.is_empty() {
                    return Err(Error::BadRequest(format!("{}: add at least one option", label)));
                }
                let mut option_ids = HashSet::new();
                if options.iter().any(|o| !option_ids.insert(o.id.as_str())) {
                    return Err(Error::BadRequest(format!("{}: duplicate option id", label)));
                }
                if options.iter().filter(|o| o.is_correct).count() > 1 {
                    return Err(Error::BadRequest(format!(
                        "{}: only one option can be marked correct",
                        label
                    )));
                }
            }
            QuestionType::ShortAnswer => {
                if q.options.as_ref().is_some_and(|o| !o.is_empty()) {
                    return Err(Error::BadRequest(format!(
                        "{}: short answer questions take no options",
                        label
                    )));
                }
            }
        }
    }
    Ok(())
}
