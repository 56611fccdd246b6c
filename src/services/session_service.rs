use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::dto::play_dto::{SessionView, SubmitView};
use crate::error::{Error, Result};
use crate::models::draft::DraftKind;
use crate::models::response::QuizResponse;
use crate::services::player_service::{AssessmentPlayer, TickOutcome};
use crate::services::storage_service::{player_draft_key, StorageService};

pub struct PlayerSession {
    player: AssessmentPlayer,
    resume_token: Uuid,
    draft_key: String,
    ticker: Option<JoinHandle<()>>,
    last_activity: DateTime<Utc>,
}

impl PlayerSession {
    fn view(&self, session_id: Uuid, resumed: bool) -> SessionView {
        SessionView {
            session_id,
            resume_token: self.resume_token,
            resumed,
            player: self.player.view(),
        }
    }

    fn stop_timer(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }
}

impl Drop for PlayerSession {
    fn drop(&mut self) {
        self.stop_timer();
    }
}

type SharedSession = Arc<Mutex<PlayerSession>>;

/// In-process registry of live play-throughs. Each in-progress session owns
/// one ticker task that is aborted as soon as the session leaves that phase.
#[derive(Clone)]
pub struct SessionService {
    storage: StorageService,
    sessions: Arc<RwLock<HashMap<Uuid, SharedSession>>>,
}

impl SessionService {
    pub fn new(storage: StorageService) -> Self {
        Self {
            storage,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn session(&self, session_id: Uuid) -> Result<SharedSession> {
        self.sessions
            .read()
            .await
            .get(&session_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Play session {} not found", session_id)))
    }

    /// Starts a play-through. With the `resume_token` of an earlier session
    /// the respondent's own draft is picked up instead.
    pub async fn start(
        &self,
        quiz_id: &str,
        respondent_name: &str,
        resume_token: Option<Uuid>,
    ) -> Result<SessionView> {
        let quiz = self
            .storage
            .quiz_by_id(quiz_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Assessment {} not found", quiz_id)))?;

        let draft = match resume_token {
            Some(token) => self
                .storage
                .draft(&player_draft_key(quiz_id, token))
                .await?
                .and_then(|d| d.player().cloned())
                .map(|snapshot| (token, snapshot)),
            None => None,
        };

        let resumed = draft.is_some();
        let (resume_token, player) = match draft {
            Some((token, snapshot)) => (token, AssessmentPlayer::resume(quiz, snapshot)?),
            None => {
                let mut player = AssessmentPlayer::new(quiz);
                player.start(respondent_name, Utc::now())?;
                (Uuid::new_v4(), player)
            }
        };

        let draft_key = player_draft_key(quiz_id, resume_token);
        self.save_player_draft(&draft_key, &player).await?;

        let session_id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(PlayerSession {
            player,
            resume_token,
            draft_key,
            ticker: None,
            last_activity: Utc::now(),
        }));
        let ticker = self.spawn_ticker(session_id, Arc::downgrade(&session));
        let view = {
            let mut guard = session.lock().await;
            guard.ticker = Some(ticker);
            guard.view(session_id, resumed)
        };
        self.sessions.write().await.insert(session_id, session);

        tracing::info!(%session_id, quiz_id, resumed, "play session started");
        Ok(view)
    }

    fn spawn_ticker(&self, session_id: Uuid, session: Weak<Mutex<PlayerSession>>) -> JoinHandle<()> {
        let storage = self.storage.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            interval.tick().await;
            loop {
                interval.tick().await;
                let Some(session) = session.upgrade() else {
                    break;
                };
                let mut guard = session.lock().await;
                match guard.player.tick() {
                    TickOutcome::Counted => {}
                    TickOutcome::Idle => break,
                    TickOutcome::TimeExpired => {
                        let response = match guard.player.prepare_finish(Utc::now()) {
                            Ok(response) => response,
                            Err(e) => {
                                tracing::warn!(%session_id, error = ?e, "timer expiry could not finish session");
                                break;
                            }
                        };
                        // Keep ticking on failure; the next tick retries.
                        if let Err(e) = storage.save_response(&response).await {
                            tracing::error!(%session_id, error = ?e, "failed to persist timed-out response");
                            continue;
                        }
                        tracing::info!(%session_id, response_id = %response.id, "overall timer expired, response submitted");
                        guard.player.record_submission(response);
                        // Detach rather than abort: this is the ticker itself.
                        guard.ticker = None;
                        discard_draft(&storage, &guard.draft_key).await;
                        break;
                    }
                }
            }
        })
    }

    async fn save_player_draft(&self, draft_key: &str, player: &AssessmentPlayer) -> Result<()> {
        if let Some(snapshot) = player.snapshot() {
            self.storage
                .save_draft(draft_key, DraftKind::Player(snapshot))
                .await?;
        }
        Ok(())
    }

    pub async fn view(&self, session_id: Uuid) -> Result<SessionView> {
        let session = self.session(session_id).await?;
        let guard = session.lock().await;
        Ok(guard.view(session_id, false))
    }

    /// Applies an in-progress transition and refreshes the respondent's draft.
    async fn update<F>(&self, session_id: Uuid, action: F) -> Result<SessionView>
    where
        F: FnOnce(&mut AssessmentPlayer) -> Result<()>,
    {
        let session = self.session(session_id).await?;
        let mut guard = session.lock().await;
        action(&mut guard.player)?;
        guard.last_activity = Utc::now();
        self.save_player_draft(&guard.draft_key, &guard.player).await?;
        Ok(guard.view(session_id, false))
    }

    pub async fn answer(&self, session_id: Uuid, answer: &str) -> Result<SessionView> {
        self.update(session_id, |p| p.answer(answer)).await
    }

    pub async fn set_confidence(&self, session_id: Uuid, level: u8) -> Result<SessionView> {
        self.update(session_id, |p| p.set_confidence(level)).await
    }

    pub async fn next(&self, session_id: Uuid) -> Result<SessionView> {
        self.update(session_id, |p| p.next()).await
    }

    pub async fn back(&self, session_id: Uuid) -> Result<SessionView> {
        self.update(session_id, |p| p.back()).await
    }

    pub async fn review(&self, session_id: Uuid) -> Result<SessionView> {
        self.update(session_id, |p| p.review()).await
    }

    pub async fn review_next(&self, session_id: Uuid) -> Result<SessionView> {
        self.update(session_id, |p| p.review_next()).await
    }

    pub async fn review_back(&self, session_id: Uuid) -> Result<SessionView> {
        self.update(session_id, |p| p.review_back()).await
    }

    pub async fn submit(&self, session_id: Uuid) -> Result<SubmitView> {
        self.complete(session_id, |p, now| p.prepare_submit(now)).await
    }

    pub async fn finish(&self, session_id: Uuid) -> Result<SubmitView> {
        self.complete(session_id, |p, now| p.prepare_finish(now)).await
    }

    /// The player only leaves `InProgress` once the response is stored, so a
    /// failed write can be retried.
    async fn complete<F>(&self, session_id: Uuid, prepare: F) -> Result<SubmitView>
    where
        F: FnOnce(&AssessmentPlayer, DateTime<Utc>) -> Result<QuizResponse>,
    {
        let session = self.session(session_id).await?;
        let mut guard = session.lock().await;
        let response = prepare(&guard.player, Utc::now())?;
        self.storage.save_response(&response).await?;

        guard.player.record_submission(response.clone());
        guard.stop_timer();
        guard.last_activity = Utc::now();
        discard_draft(&self.storage, &guard.draft_key).await;

        tracing::info!(
            %session_id,
            quiz_id = %response.quiz_id,
            response_id = %response.id,
            total_score = response.total_score,
            "response submitted"
        );
        Ok(SubmitView {
            session_id,
            response,
            player: guard.player.view(),
        })
    }

    /// Drops the session without submitting. The draft stays for resuming.
    pub async fn abandon(&self, session_id: Uuid) -> Result<()> {
        let removed = self.sessions.write().await.remove(&session_id);
        let Some(session) = removed else {
            return Err(Error::NotFound(format!("Play session {} not found", session_id)));
        };
        session.lock().await.stop_timer();
        tracing::info!(%session_id, "play session abandoned");
        Ok(())
    }

    /// Removes sessions without activity for `max_idle`. In-progress drafts
    /// are kept so the respondent can resume later.
    pub async fn sweep_idle(&self, max_idle: chrono::Duration) -> usize {
        let cutoff = Utc::now() - max_idle;
        let mut sessions = self.sessions.write().await;
        let mut stale = Vec::new();
        for (id, session) in sessions.iter() {
            if session.lock().await.last_activity < cutoff {
                stale.push(*id);
            }
        }
        for id in &stale {
            if let Some(session) = sessions.remove(id) {
                session.lock().await.stop_timer();
            }
        }
        stale.len()
    }
}

async fn discard_draft(storage: &StorageService, draft_key: &str) {
    if let Err(e) = storage.clear_draft(draft_key).await {
        tracing::warn!(draft_key, error = ?e, "could not clear player draft");
    }
}
