pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod utils;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::config::Config;
use crate::error::Result;
use crate::services::{
    ai_service::{AIService, QuizAssistant},
    auth_service::AuthService,
    quiz_service::QuizService,
    session_service::SessionService,
    storage_service::StorageService,
};
use crate::store::KeyValueStore;

pub use routes::router;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub storage: StorageService,
    pub auth_service: AuthService,
    pub quiz_service: QuizService,
    pub session_service: SessionService,
    pub assistant: Arc<dyn QuizAssistant>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        config: Config,
        assistant: Arc<dyn QuizAssistant>,
    ) -> Self {
        let storage = StorageService::new(store);
        let auth_service = AuthService::new(
            storage.clone(),
            config.jwt_secret.clone(),
            config.session_ttl_hours,
        );
        let quiz_service = QuizService::new(storage.clone(), config.share_base_url.clone());
        let session_service = SessionService::new(storage.clone());

        Self {
            config: Arc::new(config),
            storage,
            auth_service,
            quiz_service,
            session_service,
            assistant,
        }
    }

    /// State wired to the HTTP AI adapter described by `config`.
    pub fn with_ai_service(store: Arc<dyn KeyValueStore>, config: Config) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.ai_timeout_secs))
            .build()
            .map_err(|e| crate::error::Error::Internal(format!("HTTP client: {}", e)))?;
        let assistant = AIService::new(
            http_client,
            config.ai_api_key.clone(),
            config.ai_api_url.clone(),
            config.ai_model.clone(),
            config.ai_timeout_secs,
        );
        Ok(Self::new(store, config, Arc::new(assistant)))
    }
}
