use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::play_dto::{
        AnswerRequest, ConfidenceRequest, PlayQuery, PublicQuizView, SessionView,
        StartSessionRequest, SubmitView,
    },
    error::Result,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/play/{quiz_id}",
    params(
        ("quiz_id" = String, Path, description = "Assessment ID"),
        ("share" = Option<String>, Query, description = "Share token; imported when no local copy exists")
    ),
    responses(
        (status = 200, description = "Respondent view of the assessment", body = PublicQuizView),
        (status = 400, description = "Share token is corrupt"),
        (status = 404, description = "Assessment not found")
    )
)]
#[axum::debug_handler]
pub async fn get_public_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
    Query(query): Query<PlayQuery>,
) -> Result<Json<PublicQuizView>> {
    let view = state
        .quiz_service
        .public_quiz(&quiz_id, query.share.as_deref())
        .await?;
    Ok(Json(view))
}

#[utoipa::path(
    post,
    path = "/api/play/{quiz_id}/sessions",
    params(("quiz_id" = String, Path, description = "Assessment ID")),
    request_body = StartSessionRequest,
    responses(
        (status = 201, description = "Play session started, or resumed from the respondent's own draft", body = SessionView),
        (status = 403, description = "Assessment not released"),
        (status = 404, description = "Assessment not found")
    )
)]
#[axum::debug_handler]
pub async fn start_session(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
    Json(payload): Json<StartSessionRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let view = state
        .session_service
        .start(&quiz_id, &payload.respondent_name, payload.resume_token)
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[utoipa::path(
    get,
    path = "/api/play/sessions/{sid}",
    params(("sid" = Uuid, Path, description = "Play session ID")),
    responses(
        (status = 200, description = "Current player state", body = SessionView),
        (status = 404, description = "Session not found")
    )
)]
#[axum::debug_handler]
pub async fn get_session(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
) -> Result<Json<SessionView>> {
    Ok(Json(state.session_service.view(sid).await?))
}

#[utoipa::path(
    delete,
    path = "/api/play/sessions/{sid}",
    params(("sid" = Uuid, Path, description = "Play session ID")),
    responses(
        (status = 204, description = "Session dropped; the draft is kept"),
        (status = 404, description = "Session not found")
    )
)]
#[axum::debug_handler]
pub async fn abandon_session(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.session_service.abandon(sid).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    patch,
    path = "/api/play/sessions/{sid}/answer",
    params(("sid" = Uuid, Path, description = "Play session ID")),
    request_body = AnswerRequest,
    responses(
        (status = 200, description = "Answer recorded for the current question", body = SessionView),
        (status = 409, description = "Session is not in progress")
    )
)]
#[axum::debug_handler]
pub async fn answer(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
    Json(payload): Json<AnswerRequest>,
) -> Result<Json<SessionView>> {
    payload.validate()?;
    Ok(Json(state.session_service.answer(sid, &payload.answer).await?))
}

#[utoipa::path(
    patch,
    path = "/api/play/sessions/{sid}/confidence",
    params(("sid" = Uuid, Path, description = "Play session ID")),
    request_body = ConfidenceRequest,
    responses(
        (status = 200, description = "Confidence recorded for the current question", body = SessionView),
        (status = 400, description = "Level outside 1..=5"),
        (status = 409, description = "Session is not in progress")
    )
)]
#[axum::debug_handler]
pub async fn confidence(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
    Json(payload): Json<ConfidenceRequest>,
) -> Result<Json<SessionView>> {
    payload.validate()?;
    Ok(Json(
        state
            .session_service
            .set_confidence(sid, payload.confidence)
            .await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/play/sessions/{sid}/next",
    params(("sid" = Uuid, Path, description = "Play session ID")),
    responses(
        (status = 200, description = "Moved to the next question", body = SessionView),
        (status = 409, description = "Already on the last question")
    )
)]
#[axum::debug_handler]
pub async fn next(State(state): State<AppState>, Path(sid): Path<Uuid>) -> Result<Json<SessionView>> {
    Ok(Json(state.session_service.next(sid).await?))
}

#[utoipa::path(
    post,
    path = "/api/play/sessions/{sid}/back",
    params(("sid" = Uuid, Path, description = "Play session ID")),
    responses(
        (status = 200, description = "Moved to the previous question", body = SessionView),
        (status = 409, description = "Already on the first question")
    )
)]
#[axum::debug_handler]
pub async fn back(State(state): State<AppState>, Path(sid): Path<Uuid>) -> Result<Json<SessionView>> {
    Ok(Json(state.session_service.back(sid).await?))
}

#[utoipa::path(
    post,
    path = "/api/play/sessions/{sid}/submit",
    params(("sid" = Uuid, Path, description = "Play session ID")),
    responses(
        (status = 200, description = "Response scored and stored", body = SubmitView),
        (status = 409, description = "Not on the last question")
    )
)]
#[axum::debug_handler]
pub async fn submit(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
) -> Result<Json<SubmitView>> {
    Ok(Json(state.session_service.submit(sid).await?))
}

#[utoipa::path(
    post,
    path = "/api/play/sessions/{sid}/finish",
    params(("sid" = Uuid, Path, description = "Play session ID")),
    responses(
        (status = 200, description = "Ended early; response scored and stored", body = SubmitView),
        (status = 409, description = "Session is not in progress")
    )
)]
#[axum::debug_handler]
pub async fn finish(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
) -> Result<Json<SubmitView>> {
    Ok(Json(state.session_service.finish(sid).await?))
}

#[utoipa::path(
    post,
    path = "/api/play/sessions/{sid}/review",
    params(("sid" = Uuid, Path, description = "Play session ID")),
    responses(
        (status = 200, description = "Entered review of the submitted response", body = SessionView),
        (status = 409, description = "Nothing submitted yet")
    )
)]
#[axum::debug_handler]
pub async fn review(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
) -> Result<Json<SessionView>> {
    Ok(Json(state.session_service.review(sid).await?))
}

#[utoipa::path(
    post,
    path = "/api/play/sessions/{sid}/review/next",
    params(("sid" = Uuid, Path, description = "Play session ID")),
    responses(
        (status = 200, description = "Next reviewed question", body = SessionView),
        (status = 409, description = "Not reviewing or at the end")
    )
)]
#[axum::debug_handler]
pub async fn review_next(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
) -> Result<Json<SessionView>> {
    Ok(Json(state.session_service.review_next(sid).await?))
}

#[utoipa::path(
    post,
    path = "/api/play/sessions/{sid}/review/back",
    params(("sid" = Uuid, Path, description = "Play session ID")),
    responses(
        (status = 200, description = "Previous reviewed question", body = SessionView),
        (status = 409, description = "Not reviewing or at the start")
    )
)]
#[axum::debug_handler]
pub async fn review_back(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
) -> Result<Json<SessionView>> {
    Ok(Json(state.session_service.review_back(sid).await?))
}
