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
    models::{Audit, CreatePlaceRequest, Place, PlaceResponse, UpdatePlaceRequest},
    policy,
};

/// get_places
///
/// [Public Route] Lists all places, oldest first.
#[utoipa::path(
    get,
    path = "/places",
    responses((status = 200, description = "Places", body = [PlaceResponse]))
)]
pub async fn get_places(
    State(state): State<AppState>,
) -> Result<Json<Vec<PlaceResponse>>, ApiError> {
    let places = state.repo.list_places().await?;
    Ok(Json(places.into_iter().map(PlaceResponse::from).collect()))
}

/// get_place
///
/// [Public Route] Single place read by id, attached amenities included.
#[utoipa::path(
    get,
    path = "/places/{id}",
    params(("id" = Uuid, Path, description = "Place ID")),
    responses(
        (status = 200, description = "Found", body = PlaceResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_place(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PlaceResponse>, ApiError> {
    let place = state.repo.get_place(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(place.into()))
}

/// create_place
///
/// [Authenticated Route] Creates a listing. The owner is the authenticated
/// actor; the body carries no owner field.
#[utoipa::path(
    post,
    path = "/places",
    request_body = CreatePlaceRequest,
    responses(
        (status = 201, description = "Created", body = PlaceResponse),
        (status = 400, description = "Invalid payload")
    )
)]
pub async fn create_place(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreatePlaceRequest>,
) -> Result<(StatusCode, Json<PlaceResponse>), ApiError> {
    payload.validate()?;
    policy::create_place(auth.actor()).require("forbidden")?;

    let place = Place {
        audit: Audit::stamp(),
        name: payload.name,
        city: payload.city,
        price_per_night: payload.price_per_night,
        description: payload.description,
        latitude: payload.latitude,
        longitude: payload.longitude,
        owner_id: auth.id,
        amenity_ids: vec![],
    };

    let created = state.repo.create_place(place).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// update_place
///
/// [Authenticated Route] Partial update, owner-or-admin only. Ownership is
/// checked against the freshly fetched record on every request.
#[utoipa::path(
    put,
    path = "/places/{id}",
    params(("id" = Uuid, Path, description = "Place ID")),
    request_body = UpdatePlaceRequest,
    responses(
        (status = 200, description = "Updated", body = PlaceResponse),
        (status = 403, description = "Not owner or admin"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_place(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePlaceRequest>,
) -> Result<Json<PlaceResponse>, ApiError> {
    payload.validate()?;

    let place = state.repo.get_place(id).await?.ok_or(ApiError::NotFound)?;
    policy::modify_place(auth.actor(), place.owner_id).require("forbidden_not_owner")?;

    let updated = state.repo.update_place(id, payload).await?;
    Ok(Json(updated.into()))
}

/// delete_place
///
/// [Authenticated Route] Deletes a listing and, by cascade, its reviews.
/// Owner-or-admin only.
#[utoipa::path(
    delete,
    path = "/places/{id}",
    params(("id" = Uuid, Path, description = "Place ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not owner or admin"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_place(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let place = state.repo.get_place(id).await?.ok_or(ApiError::NotFound)?;
    policy::modify_place(auth.actor(), place.owner_id).require("forbidden_not_owner")?;

    if state.repo.delete_place(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

/// attach_amenity
///
/// [Authenticated Route] Attaches an amenity to a place. Owner-or-admin only;
/// attaching an already-attached amenity is a no-op.
#[utoipa::path(
    post,
    path = "/places/{id}/amenities/{amenity_id}",
    params(
        ("id" = Uuid, Path, description = "Place ID"),
        ("amenity_id" = Uuid, Path, description = "Amenity ID")
    ),
    responses(
        (status = 200, description = "Attached", body = PlaceResponse),
        (status = 403, description = "Not owner or admin"),
        (status = 404, description = "Place or amenity not found")
    )
)]
pub async fn attach_amenity(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((place_id, amenity_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<PlaceResponse>, ApiError> {
    let place = state
        .repo
        .get_place(place_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    policy::modify_place(auth.actor(), place.owner_id).require("forbidden_not_owner")?;

    let updated = state.repo.attach_amenity(place_id, amenity_id).await?;
    Ok(Json(updated.into()))
}

/// detach_amenity
///
/// [Authenticated Route] Removes an amenity attachment. Owner-or-admin only;
/// detaching an unattached amenity is a no-op.
#[utoipa::path(
    delete,
    path = "/places/{id}/amenities/{amenity_id}",
    params(
        ("id" = Uuid, Path, description = "Place ID"),
        ("amenity_id" = Uuid, Path, description = "Amenity ID")
    ),
    responses(
        (status = 200, description = "Detached", body = PlaceResponse),
        (status = 403, description = "Not owner or admin"),
        (status = 404, description = "Place or amenity not found")
    )
)]
pub async fn detach_amenity(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((place_id, amenity_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<PlaceResponse>, ApiError> {
    let place = state
        .repo
        .get_place(place_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    policy::modify_place(auth.actor(), place.owner_id).require("forbidden_not_owner")?;

    let updated = state.repo.detach_amenity(place_id, amenity_id).await?;
    Ok(Json(updated.into()))
}
