use axum::{Json, extract::State};
use validator::Validate;

use crate::{
    AppState,
    auth::issue_token,
    error::ApiError,
    models::{LoginRequest, LoginResponse},
    password,
};

/// login
///
/// [Public Route] Verifies credentials and issues a signed identity token.
///
/// Both failure modes — unknown email and wrong password — collapse into the
/// same generic `invalid_credentials` response so the endpoint cannot be used
/// to probe which emails are registered.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    payload.validate()?;

    let email = payload.email.trim().to_lowercase();
    let user = state
        .repo
        .get_user_by_email(&email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    password::verify_password(&payload.password, &user.password_hash)
        .map_err(|_| ApiError::InvalidCredentials)?;

    let access_token = issue_token(&user, &state.config)?;
    Ok(Json(LoginResponse { access_token }))
}
