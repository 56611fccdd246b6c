pub mod ai_service;
pub mod auth_service;
pub mod player_service;
pub mod quiz_service;
pub mod scoring_service;
pub mod session_service;
pub mod share_service;
pub mod storage_service;
