pub mod auth_dto;
pub mod play_dto;
pub mod quiz_dto;
