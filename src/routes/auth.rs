use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::auth_dto::{LoginPayload, ResetPasswordPayload, SignupPayload, UpdateProfilePayload},
    error::Result,
    models::user::User,
    services::auth_service::SessionContext,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupPayload,
    responses(
        (status = 201, description = "Account registered and logged in", body = AuthResponse),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Email already registered")
    )
)]
#[axum::debug_handler]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let auth = state.auth_service.signup(payload).await?;
    Ok((StatusCode::CREATED, Json(auth)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Invalid email or password")
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let auth = state.auth_service.login(payload).await?;
    Ok(Json(auth))
}

#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    request_body = ResetPasswordPayload,
    responses(
        (status = 204, description = "Password replaced; every login session of the account is closed"),
        (status = 401, description = "Missing or expired session"),
        (status = 403, description = "Email belongs to another account"),
        (status = 404, description = "No account with this email")
    )
)]
#[axum::debug_handler]
pub async fn reset_password(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Json(payload): Json<ResetPasswordPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    state.auth_service.reset_password(&ctx, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 204, description = "Session closed"),
        (status = 401, description = "Missing or expired session")
    )
)]
#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
) -> Result<impl IntoResponse> {
    state.auth_service.logout(&ctx).await;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Missing or expired session")
    )
)]
#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
) -> Result<Json<User>> {
    Ok(Json(state.auth_service.profile(&ctx).await?))
}

#[utoipa::path(
    patch,
    path = "/api/profile",
    request_body = UpdateProfilePayload,
    responses(
        (status = 200, description = "Profile updated", body = User),
        (status = 409, description = "Email already registered")
    )
)]
#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<Json<User>> {
    payload.validate()?;
    Ok(Json(state.auth_service.update_profile(&ctx, payload).await?))
}

