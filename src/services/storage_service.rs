use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::Result;
use crate::models::draft::{Draft, DraftKind};
use crate::models::quiz::Quiz;
use crate::models::response::QuizResponse;
use crate::models::user::{StoredUser, User};
use crate::store::KeyValueStore;

pub const USERS_KEY: &str = "knowlearn_users";
pub const QUIZZES_KEY: &str = "knowlearn_quizzes";
pub const RESPONSES_KEY: &str = "knowlearn_responses";
pub const DRAFTS_KEY: &str = "knowlearn_quiz_drafts";

/// Drafts map key of one respondent's play-through. Builder drafts sit under
/// the bare quiz id.
pub fn player_draft_key(quiz_id: &str, resume_token: Uuid) -> String {
    format!("{}:{}", quiz_id, resume_token)
}

fn is_player_draft_of(key: &str, quiz_id: &str) -> bool {
    key.strip_prefix(quiz_id)
        .and_then(|rest| rest.strip_prefix(':'))
        .is_some_and(|token| Uuid::parse_str(token).is_ok())
}

/// Typed access to the four collections. Every mutation is a whole-collection
/// read-modify-write; `write_lock` serialises them within this process.
#[derive(Clone)]
pub struct StorageService {
    store: Arc<dyn KeyValueStore>,
    write_lock: Arc<Mutex<()>>,
}

impl StorageService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    async fn load<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        match self.store.get(key).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(T::default()),
        }
    }

    async fn persist<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.store.put(key, serde_json::to_value(value)?).await
    }

    // Users

    pub async fn stored_users(&self) -> Result<Vec<StoredUser>> {
        self.load(USERS_KEY).await
    }

    /// Returns false when the email is already registered.
    pub async fn register_user(&self, user: User, password_hash: String) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut users = self.stored_users().await?;
        if users.iter().any(|u| u.user.email == user.email) {
            return Ok(false);
        }
        users.push(StoredUser {
            user,
            password_hash,
        });
        self.persist(USERS_KEY, &users).await?;
        Ok(true)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<StoredUser>> {
        Ok(self
            .stored_users()
            .await?
            .into_iter()
            .find(|u| u.user.email == email))
    }

    pub async fn find_user_by_id(&self, id: &str) -> Result<Option<User>> {
        Ok(self
            .stored_users()
            .await?
            .into_iter()
            .find(|u| u.user.id == id)
            .map(|u| u.user))
    }

    /// Returns false when no user has this email.
    pub async fn set_password_hash(&self, email: &str, password_hash: String) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut users = self.stored_users().await?;
        let Some(stored) = users.iter_mut().find(|u| u.user.email == email) else {
            return Ok(false);
        };
        stored.password_hash = password_hash;
        self.persist(USERS_KEY, &users).await?;
        Ok(true)
    }

    /// Replaces the profile of the user with the same id. Returns false when
    /// the id is unknown or the new email belongs to someone else.
    pub async fn update_profile(&self, updated: User) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut users = self.stored_users().await?;
        if users
            .iter()
            .any(|u| u.user.email == updated.email && u.user.id != updated.id)
        {
            return Ok(false);
        }
        let Some(stored) = users.iter_mut().find(|u| u.user.id == updated.id) else {
            return Ok(false);
        };
        stored.user = updated;
        self.persist(USERS_KEY, &users).await?;
        Ok(true)
    }

    // Quizzes

    pub async fn quizzes(&self) -> Result<Vec<Quiz>> {
        self.load(QUIZZES_KEY).await
    }

    /// Insert or replace by id; last write wins.
    pub async fn save_quiz(&self, quiz: &Quiz) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut quizzes = self.quizzes().await?;
        match quizzes.iter_mut().find(|q| q.id == quiz.id) {
            Some(existing) => *existing = quiz.clone(),
            None => quizzes.push(quiz.clone()),
        }
        self.persist(QUIZZES_KEY, &quizzes).await
    }

    pub async fn delete_quiz(&self, id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut quizzes = self.quizzes().await?;
        quizzes.retain(|q| q.id != id);
        self.persist(QUIZZES_KEY, &quizzes).await
    }

    pub async fn quiz_by_id(&self, id: &str) -> Result<Option<Quiz>> {
        Ok(self.quizzes().await?.into_iter().find(|q| q.id == id))
    }

    pub async fn quizzes_by_creator(&self, creator_id: &str) -> Result<Vec<Quiz>> {
        Ok(self
            .quizzes()
            .await?
            .into_iter()
            .filter(|q| q.creator_id == creator_id)
            .collect())
    }

    // Responses

    pub async fn responses(&self) -> Result<Vec<QuizResponse>> {
        self.load(RESPONSES_KEY).await
    }

    /// Appends the response. Responses are never edited afterwards.
    pub async fn save_response(&self, response: &QuizResponse) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut responses = self.responses().await?;
        responses.push(response.clone());
        self.persist(RESPONSES_KEY, &responses).await
    }

    pub async fn responses_for_quiz(&self, quiz_id: &str) -> Result<Vec<QuizResponse>> {
        Ok(self
            .responses()
            .await?
            .into_iter()
            .filter(|r| r.quiz_id == quiz_id)
            .collect())
    }

    // Drafts

    async fn drafts(&self) -> Result<HashMap<String, Draft>> {
        self.load(DRAFTS_KEY).await
    }

    pub async fn save_draft(&self, key: &str, kind: DraftKind) -> Result<Draft> {
        let _guard = self.write_lock.lock().await;
        let mut drafts = self.drafts().await?;
        let draft = Draft {
            kind,
            updated_at: Utc::now(),
        };
        drafts.insert(key.to_string(), draft.clone());
        self.persist(DRAFTS_KEY, &drafts).await?;
        Ok(draft)
    }

    pub async fn draft(&self, key: &str) -> Result<Option<Draft>> {
        Ok(self.drafts().await?.remove(key))
    }

    pub async fn clear_draft(&self, key: &str) -> Result<()> {
        self.clear_drafts_where(|k| k == key).await
    }

    /// Drops the builder draft and every respondent draft of a quiz.
    pub async fn clear_quiz_drafts(&self, quiz_id: &str) -> Result<()> {
        self.clear_drafts_where(|k| k == quiz_id || is_player_draft_of(k, quiz_id))
            .await
    }

    async fn clear_drafts_where<F>(&self, matches: F) -> Result<()>
    where
        F: Fn(&str) -> bool,
    {
        let _guard = self.write_lock.lock().await;
        let mut drafts = self.drafts().await?;
        let before = drafts.len();
        drafts.retain(|k, _| !matches(k));
        if drafts.len() == before {
            return Ok(());
        }
        if drafts.is_empty() {
            self.store.delete(DRAFTS_KEY).await
        } else {
            self.persist(DRAFTS_KEY, &drafts).await
        }
    }
}
