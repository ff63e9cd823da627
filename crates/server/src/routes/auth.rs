use super::AppState;
use crate::{
    dtos::auth::{ClaimsResponse, LoginRequest, ProfileResponse, RegisterRequest},
    error::{ApiError, ErrorResponse},
};
use axum::{Json, extract::State, http::StatusCode};
use database::services::profile::{ProfileService, Registration, TokenClaims};

/// Registers a student or instructor; the role follows from the email domain
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Profile registered", body = ProfileResponse),
        (status = 400, description = "Invalid input or email domain", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ProfileResponse>), ApiError> {
    let registration = Registration::try_from(request)?;
    let profile = ProfileService::register(&state.db, registration).await?;

    Ok((StatusCode::CREATED, Json(profile.into())))
}

/// Checks credentials and returns the claims to embed in issued tokens
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = ClaimsResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ClaimsResponse>, ApiError> {
    let profile = ProfileService::authenticate(&state.db, &request.email, &request.password).await?;

    Ok(Json(TokenClaims::from(&profile).into()))
}
