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
    models::{Audit, CreateReviewRequest, Review, ReviewResponse, UpdateReviewRequest},
    policy,
};

/// get_reviews
///
/// [Public Route] Lists all reviews, oldest first.
#[utoipa::path(
    get,
    path = "/reviews",
    responses((status = 200, description = "Reviews", body = [ReviewResponse]))
)]
pub async fn get_reviews(
    State(state): State<AppState>,
) -> Result<Json<Vec<ReviewResponse>>, ApiError> {
    let reviews = state.repo.list_reviews().await?;
    Ok(Json(reviews.into_iter().map(ReviewResponse::from).collect()))
}

/// get_review
///
/// [Public Route] Single review read by id.
#[utoipa::path(
    get,
    path = "/reviews/{id}",
    params(("id" = Uuid, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Found", body = ReviewResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let review = state.repo.get_review(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(review.into()))
}

/// get_place_reviews
///
/// [Public Route] Lists the reviews of one place. A missing place is a 404,
/// not an empty list.
#[utoipa::path(
    get,
    path = "/places/{id}/reviews",
    params(("id" = Uuid, Path, description = "Place ID")),
    responses(
        (status = 200, description = "Reviews", body = [ReviewResponse]),
        (status = 404, description = "Place not found")
    )
)]
pub async fn get_place_reviews(
    State(state): State<AppState>,
    Path(place_id): Path<Uuid>,
) -> Result<Json<Vec<ReviewResponse>>, ApiError> {
    if state.repo.get_place(place_id).await?.is_none() {
        return Err(ApiError::NotFound);
    }
    let reviews = state.repo.list_reviews_for_place(place_id).await?;
    Ok(Json(reviews.into_iter().map(ReviewResponse::from).collect()))
}

/// create_review
///
/// [Authenticated Route] Reviews a place. The author comes from the bearer
/// credential. Owners cannot review their own place (403) and an author can
/// review a given place at most once (409, enforced by the repository).
#[utoipa::path(
    post,
    path = "/reviews",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Created", body = ReviewResponse),
        (status = 403, description = "Own place"),
        (status = 404, description = "Place not found"),
        (status = 409, description = "Already reviewed")
    )
)]
pub async fn create_review(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>), ApiError> {
    payload.validate()?;

    let place = state
        .repo
        .get_place(payload.place_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    policy::create_review(auth.actor(), place.owner_id).require("self_review_forbidden")?;

    let review = Review {
        audit: Audit::stamp(),
        text: payload.text.trim().to_string(),
        user_id: auth.id,
        place_id: place.audit.id,
    };

    let created = state.repo.create_review(review).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// update_review
///
/// [Authenticated Route] Author-only text edit. A payload with no usable text
/// is `nothing_to_update`.
#[utoipa::path(
    put,
    path = "/reviews/{id}",
    params(("id" = Uuid, Path, description = "Review ID")),
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Updated", body = ReviewResponse),
        (status = 400, description = "Nothing to update"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_review(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateReviewRequest>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let review = state.repo.get_review(id).await?.ok_or(ApiError::NotFound)?;
    policy::update_review(auth.actor(), review.user_id).require("forbidden_not_author")?;

    let text = payload
        .text
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Validation("nothing_to_update".to_string()))?;

    let updated = state.repo.update_review(id, text).await?;
    Ok(Json(updated.into()))
}

/// delete_review
///
/// [Authenticated Route] Deletes a review: its author, or an admin.
#[utoipa::path(
    delete,
    path = "/reviews/{id}",
    params(("id" = Uuid, Path, description = "Review ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not author or admin"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_review(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let review = state.repo.get_review(id).await?.ok_or(ApiError::NotFound)?;
    policy::delete_review(auth.actor(), review.user_id).require("forbidden_delete")?;

    if state.repo.delete_review(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
