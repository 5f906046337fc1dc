use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    models::{Audit, RegisterUserRequest, UpdateUserRequest, User, UserResponse},
    password::{self, PasswordError},
    policy,
};

/// register_user
///
/// [Public Route] Creates a new account. The plaintext password is hashed
/// before the record ever reaches the repository; the admin flag always
/// starts false and is not settable through this endpoint.
#[utoipa::path(
    post,
    path = "/users",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "Created", body = UserResponse),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    payload.validate()?;

    let password_hash = password::hash_password(&payload.password).map_err(|e| match e {
        PasswordError::TooShort | PasswordError::TooLong => ApiError::Validation(e.to_string()),
        other => ApiError::Internal(other.to_string()),
    })?;

    let user = User {
        audit: Audit::stamp(),
        first_name: payload.first_name,
        last_name: payload.last_name,
        email: payload.email.trim().to_lowercase(),
        password_hash,
        is_admin: false,
    };

    let created = state.repo.create_user(user).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// get_users
///
/// [Public Route] Lists every user in their public representation.
#[utoipa::path(
    get,
    path = "/users",
    responses((status = 200, description = "Users", body = [UserResponse]))
)]
pub async fn get_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.repo.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// get_user
///
/// [Public Route] Single user read by id.
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Found", body = UserResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.repo.get_user(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(user.into()))
}

/// update_user
///
/// [Authenticated Route] Profile update, restricted to the user themself or
/// an admin. The payload allow-list means id, password material, the admin
/// flag and timestamps cannot be set here.
#[utoipa::path(
    put,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated", body = UserResponse),
        (status = 403, description = "Not self or admin"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn update_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(mut payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    payload.validate()?;

    if state.repo.get_user(id).await?.is_none() {
        return Err(ApiError::NotFound);
    }
    policy::modify_user(auth.actor(), id).require("forbidden_not_self")?;

    if let Some(email) = payload.email.take() {
        payload.email = Some(email.trim().to_lowercase());
    }

    let updated = state.repo.update_user(id, payload).await?;
    Ok(Json(updated.into()))
}

/// delete_user
///
/// [Authenticated Route] Account deletion, self-or-admin only. The user's
/// places and reviews are removed with the account.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not self or admin"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.repo.get_user(id).await?.is_none() {
        return Err(ApiError::NotFound);
    }
    policy::modify_user(auth.actor(), id).require("forbidden_not_self")?;

    if state.repo.delete_user(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
