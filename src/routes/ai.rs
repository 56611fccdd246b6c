use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::quiz_dto::{GenerateQuizPayload, ReviewQuestionPayload},
    error::Result,
    services::{ai_service::QuestionReview, auth_service::SessionContext},
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/ai/generate",
    request_body = GenerateQuizPayload,
    responses(
        (status = 201, description = "Generated assessment saved to the caller's library", body = Quiz),
        (status = 502, description = "AI credential missing or rejected"),
        (status = 503, description = "AI service unavailable")
    )
)]
#[axum::debug_handler]
pub async fn generate_quiz(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Json(payload): Json<GenerateQuizPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let quiz = state
        .assistant
        .generate_quiz(payload.topic.trim(), &ctx.user_id)
        .await?;
    let quiz = state.quiz_service.save_generated(&ctx, quiz).await?;
    Ok((StatusCode::CREATED, Json(quiz)))
}

#[utoipa::path(
    post,
    path = "/api/ai/review",
    request_body = ReviewQuestionPayload,
    responses(
        (status = 200, description = "Suggestion and difficulty", body = QuestionReview),
        (status = 502, description = "AI credential missing or rejected")
    )
)]
#[axum::debug_handler]
pub async fn review_question(
    State(state): State<AppState>,
    Json(payload): Json<ReviewQuestionPayload>,
) -> Result<Json<QuestionReview>> {
    let review = state.assistant.review_question(&payload.question).await?;
    Ok(Json(review))
}
