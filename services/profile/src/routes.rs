//! Profile service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::{ApiError, ApiResult},
    middleware::auth_middleware,
    models::{IdentityClaims, ProfileUpdateRequest, UserId},
    state::AppState,
};

/// Request for account registration
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Create the router for the profile service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/users", get(get_users))
        .route("/users/me", get(get_me).patch(update_me))
        .route("/users/me/creations", get(get_my_creations))
        .route("/users/creations", get(get_my_creations))
        .route("/users/:id", get(get_user))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/users/register", post(register))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "profile-service"
    }))
}

/// Register a password account
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let user = state
        .accounts
        .register(&payload.email, &payload.password, &payload.name)
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Normalized profile of the authenticated user
pub async fn get_me(
    State(state): State<AppState>,
    Extension(claims): Extension<IdentityClaims>,
) -> ApiResult<impl IntoResponse> {
    let view = state.profiles.current(&claims).await?;
    Ok(Json(view))
}

/// Partially update the authenticated user's profile
pub async fn update_me(
    State(state): State<AppState>,
    Extension(claims): Extension<IdentityClaims>,
    payload: Result<Json<ProfileUpdateRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let view = state.profiles.update(&claims, request).await?;
    Ok(Json(view))
}

/// Creations of the authenticated user
pub async fn get_my_creations(
    State(state): State<AppState>,
    Extension(claims): Extension<IdentityClaims>,
) -> ApiResult<impl IntoResponse> {
    let user_id = claims.user_id().ok_or(ApiError::Unauthorized)?;
    let creations = state.accounts.creations(user_id).await?;
    Ok(Json(creations))
}

/// Get all users
pub async fn get_users(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let users = state.accounts.list_users().await?;
    Ok(Json(users))
}

/// Get a user by ID
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> ApiResult<impl IntoResponse> {
    let user = state.accounts.get_user(id).await?;
    Ok(Json(user))
}
