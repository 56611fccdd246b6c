pub mod ai;
pub mod auth;
pub mod health;
pub mod play;
pub mod quizzes;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

use crate::middleware::{
    auth::require_session,
    rate_limit::{rps_middleware, RateLimiter},
};
use crate::AppState;

const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::signup,
        auth::login,
        auth::reset_password,
        auth::logout,
        auth::get_profile,
        auth::update_profile,
        quizzes::list_quizzes,
        quizzes::create_quiz,
        quizzes::get_quiz,
        quizzes::update_quiz,
        quizzes::delete_quiz,
        quizzes::share_quiz,
        quizzes::quiz_analytics,
        quizzes::replay_response,
        quizzes::get_draft,
        quizzes::save_draft,
        quizzes::discard_draft,
        ai::generate_quiz,
        ai::review_question,
        play::get_public_quiz,
        play::start_session,
        play::get_session,
        play::abandon_session,
        play::answer,
        play::confidence,
        play::next,
        play::back,
        play::submit,
        play::finish,
        play::review,
        play::review_next,
        play::review_back,
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Full application router. Builder and account routes sit behind the login
/// session check; the play flow and sign-in are public.
pub fn router(state: AppState) -> Router {
    let api_rps = state.config.api_rps;
    let public_rps = state.config.public_rps;

    let base_routes = Router::new()
        .route("/health", get(health::health))
        .route("/api/docs/openapi.json", get(openapi_json));

    let public_api = Router::new()
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/play/:quiz_id", get(play::get_public_quiz))
        .route("/api/play/:quiz_id/sessions", post(play::start_session))
        .route(
            "/api/play/sessions/:sid",
            get(play::get_session).delete(play::abandon_session),
        )
        .route("/api/play/sessions/:sid/answer", patch(play::answer))
        .route("/api/play/sessions/:sid/confidence", patch(play::confidence))
        .route("/api/play/sessions/:sid/next", post(play::next))
        .route("/api/play/sessions/:sid/back", post(play::back))
        .route("/api/play/sessions/:sid/submit", post(play::submit))
        .route("/api/play/sessions/:sid/finish", post(play::finish))
        .route("/api/play/sessions/:sid/review", post(play::review))
        .route("/api/play/sessions/:sid/review/next", post(play::review_next))
        .route("/api/play/sessions/:sid/review/back", post(play::review_back))
        .layer(from_fn_with_state(
            RateLimiter::new(public_rps),
            rps_middleware,
        ));

    let session_api = Router::new()
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/reset-password", post(auth::reset_password))
        .route(
            "/api/profile",
            get(auth::get_profile).patch(auth::update_profile),
        )
        .route(
            "/api/quizzes",
            get(quizzes::list_quizzes).post(quizzes::create_quiz),
        )
        .route(
            "/api/quizzes/:id",
            get(quizzes::get_quiz)
                .put(quizzes::update_quiz)
                .delete(quizzes::delete_quiz),
        )
        .route("/api/quizzes/:id/share", get(quizzes::share_quiz))
        .route("/api/quizzes/:id/analytics", get(quizzes::quiz_analytics))
        .route(
            "/api/quizzes/:id/responses/:rid",
            get(quizzes::replay_response),
        )
        .route(
            "/api/quizzes/:id/draft",
            get(quizzes::get_draft)
                .put(quizzes::save_draft)
                .delete(quizzes::discard_draft),
        )
        .route("/api/ai/generate", post(ai::generate_quiz))
        .route("/api/ai/review", post(ai::review_question))
        .route_layer(from_fn_with_state(state.clone(), require_session))
        .layer(from_fn_with_state(RateLimiter::new(api_rps), rps_middleware));

    base_routes
        .merge(public_api)
        .merge(session_api)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}
