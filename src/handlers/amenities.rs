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
    models::{Amenity, AmenityResponse, Audit, CreateAmenityRequest, UpdateAmenityRequest},
    policy,
};

/// get_amenities
///
/// [Public Route] Lists the amenity catalog.
#[utoipa::path(
    get,
    path = "/amenities",
    responses((status = 200, description = "Amenities", body = [AmenityResponse]))
)]
pub async fn get_amenities(
    State(state): State<AppState>,
) -> Result<Json<Vec<AmenityResponse>>, ApiError> {
    let amenities = state.repo.list_amenities().await?;
    Ok(Json(
        amenities.into_iter().map(AmenityResponse::from).collect(),
    ))
}

/// get_amenity
///
/// [Public Route] Single amenity read by id.
#[utoipa::path(
    get,
    path = "/amenities/{id}",
    params(("id" = Uuid, Path, description = "Amenity ID")),
    responses(
        (status = 200, description = "Found", body = AmenityResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_amenity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AmenityResponse>, ApiError> {
    let amenity = state
        .repo
        .get_amenity(id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(amenity.into()))
}

/// create_amenity
///
/// [Admin Route] Adds an amenity to the catalog. Names are unique.
#[utoipa::path(
    post,
    path = "/amenities",
    request_body = CreateAmenityRequest,
    responses(
        (status = 201, description = "Created", body = AmenityResponse),
        (status = 403, description = "Admin only"),
        (status = 409, description = "Name already taken")
    )
)]
pub async fn create_amenity(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateAmenityRequest>,
) -> Result<(StatusCode, Json<AmenityResponse>), ApiError> {
    payload.validate()?;
    policy::modify_amenity(auth.actor()).require("admin_only")?;

    let amenity = Amenity {
        audit: Audit::stamp(),
        name: payload.name,
        description: payload.description,
    };

    let created = state.repo.create_amenity(amenity).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// update_amenity
///
/// [Admin Route] Renames or re-describes an amenity.
#[utoipa::path(
    put,
    path = "/amenities/{id}",
    params(("id" = Uuid, Path, description = "Amenity ID")),
    request_body = UpdateAmenityRequest,
    responses(
        (status = 200, description = "Updated", body = AmenityResponse),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Name already taken")
    )
)]
pub async fn update_amenity(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAmenityRequest>,
) -> Result<Json<AmenityResponse>, ApiError> {
    payload.validate()?;

    if state.repo.get_amenity(id).await?.is_none() {
        return Err(ApiError::NotFound);
    }
    policy::modify_amenity(auth.actor()).require("admin_only")?;

    let updated = state.repo.update_amenity(id, payload).await?;
    Ok(Json(updated.into()))
}

/// delete_amenity
///
/// [Admin Route] Removes an amenity and every attachment of it.
#[utoipa::path(
    delete,
    path = "/amenities/{id}",
    params(("id" = Uuid, Path, description = "Amenity ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_amenity(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.repo.get_amenity(id).await?.is_none() {
        return Err(ApiError::NotFound);
    }
    policy::modify_amenity(auth.actor()).require("admin_only")?;

    if state.repo.delete_amenity(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
