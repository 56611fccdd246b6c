use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::quiz_dto::{
        AnalyticsResponse, QuizListQuery, QuizPayload, ReplayResponse, ShareResponse,
    },
    error::Result,
    models::quiz::Quiz,
    services::auth_service::SessionContext,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/quizzes",
    params(
        ("search" = Option<String>, Query, description = "Case-insensitive title filter")
    ),
    responses(
        (status = 200, description = "Assessments owned by the caller, newest first", body = Vec<Quiz>)
    )
)]
#[axum::debug_handler]
pub async fn list_quizzes(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Query(query): Query<QuizListQuery>,
) -> Result<Json<Vec<Quiz>>> {
    let quizzes = state
        .quiz_service
        .list(&ctx, query.search.as_deref())
        .await?;
    Ok(Json(quizzes))
}

#[utoipa::path(
    post,
    path = "/api/quizzes",
    request_body = QuizPayload,
    responses(
        (status = 201, description = "Assessment created", body = Quiz),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_quiz(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Json(payload): Json<QuizPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let quiz = state.quiz_service.create(&ctx, payload).await?;
    Ok((StatusCode::CREATED, Json(quiz)))
}

#[utoipa::path(
    get,
    path = "/api/quizzes/{id}",
    params(("id" = String, Path, description = "Assessment ID")),
    responses(
        (status = 200, description = "Assessment found", body = Quiz),
        (status = 403, description = "Not the creator"),
        (status = 404, description = "Assessment not found")
    )
)]
#[axum::debug_handler]
pub async fn get_quiz(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
) -> Result<Json<Quiz>> {
    Ok(Json(state.quiz_service.get_owned(&ctx, &id).await?))
}

#[utoipa::path(
    put,
    path = "/api/quizzes/{id}",
    params(("id" = String, Path, description = "Assessment ID")),
    request_body = QuizPayload,
    responses(
        (status = 200, description = "Assessment replaced", body = Quiz),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Assessment not found")
    )
)]
#[axum::debug_handler]
pub async fn update_quiz(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
    Json(payload): Json<QuizPayload>,
) -> Result<Json<Quiz>> {
    payload.validate()?;
    Ok(Json(state.quiz_service.update(&ctx, &id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/quizzes/{id}",
    params(("id" = String, Path, description = "Assessment ID")),
    responses(
        (status = 204, description = "Assessment deleted"),
        (status = 404, description = "Assessment not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_quiz(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    state.quiz_service.delete(&ctx, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/quizzes/{id}/share",
    params(("id" = String, Path, description = "Assessment ID")),
    responses(
        (status = 200, description = "Self-contained share link", body = ShareResponse),
        (status = 404, description = "Assessment not found")
    )
)]
#[axum::debug_handler]
pub async fn share_quiz(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
) -> Result<Json<ShareResponse>> {
    Ok(Json(state.quiz_service.share(&ctx, &id).await?))
}

#[utoipa::path(
    get,
    path = "/api/quizzes/{id}/analytics",
    params(("id" = String, Path, description = "Assessment ID")),
    responses(
        (status = 200, description = "Aggregate statistics and response list", body = AnalyticsResponse),
        (status = 404, description = "Assessment not found")
    )
)]
#[axum::debug_handler]
pub async fn quiz_analytics(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
) -> Result<Json<AnalyticsResponse>> {
    Ok(Json(state.quiz_service.analytics(&ctx, &id).await?))
}

#[utoipa::path(
    get,
    path = "/api/quizzes/{id}/responses/{rid}",
    params(
        ("id" = String, Path, description = "Assessment ID"),
        ("rid" = String, Path, description = "Response ID")
    ),
    responses(
        (status = 200, description = "Per-question replay of one response", body = ReplayResponse),
        (status = 404, description = "Assessment or response not found")
    )
)]
#[axum::debug_handler]
pub async fn replay_response(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path((id, rid)): Path<(String, String)>,
) -> Result<Json<ReplayResponse>> {
    Ok(Json(state.quiz_service.replay(&ctx, &id, &rid).await?))
}

#[utoipa::path(
    get,
    path = "/api/quizzes/{id}/draft",
    params(("id" = String, Path, description = "Assessment ID")),
    responses(
        (status = 200, description = "Unsaved builder state", body = Quiz),
        (status = 404, description = "No draft saved")
    )
)]
#[axum::debug_handler]
pub async fn get_draft(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
) -> Result<Json<Quiz>> {
    Ok(Json(state.quiz_service.builder_draft(&ctx, &id).await?))
}

#[utoipa::path(
    put,
    path = "/api/quizzes/{id}/draft",
    params(("id" = String, Path, description = "Assessment ID")),
    request_body = QuizPayload,
    responses(
        (status = 200, description = "Draft saved", body = Quiz),
        (status = 403, description = "Not the creator")
    )
)]
#[axum::debug_handler]
pub async fn save_draft(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
    Json(payload): Json<QuizPayload>,
) -> Result<Json<Quiz>> {
    payload.validate()?;
    Ok(Json(
        state
            .quiz_service
            .save_builder_draft(&ctx, &id, payload)
            .await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/quizzes/{id}/draft",
    params(("id" = String, Path, description = "Assessment ID")),
    responses(
        (status = 204, description = "Draft discarded"),
        (status = 404, description = "No draft saved")
    )
)]
#[axum::debug_handler]
pub async fn discard_draft(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    state.quiz_service.clear_builder_draft(&ctx, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
