use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{post, put},
};

/// Authenticated Router Module
///
/// Every route here sits behind the auth middleware, so handlers always
/// receive a resolved `AuthUser`. Ownership/authorship rules are applied
/// inside the handlers through the policy module: self-or-admin for user
/// records, owner-or-admin for places, author rules for reviews.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // PUT/DELETE /users/{id}
        // Profile update and account deletion, self-or-admin only.
        .route(
            "/users/{id}",
            put(handlers::update_user).delete(handlers::delete_user),
        )
        // POST /places
        // New listing; the authenticated actor becomes the owner.
        .route("/places", post(handlers::create_place))
        // PUT/DELETE /places/{id}
        // Listing mutation, owner-or-admin only.
        .route(
            "/places/{id}",
            put(handlers::update_place).delete(handlers::delete_place),
        )
        // POST/DELETE /places/{id}/amenities/{amenity_id}
        // Amenity attachment management on a listing, owner-or-admin only.
        .route(
            "/places/{id}/amenities/{amenity_id}",
            post(handlers::attach_amenity).delete(handlers::detach_amenity),
        )
        // POST /reviews
        // New review; enforces no-self-review (403) and one-per-place (409).
        .route("/reviews", post(handlers::create_review))
        // PUT/DELETE /reviews/{id}
        // Text edit is author-only; delete is author-or-admin.
        .route(
            "/reviews/{id}",
            put(handlers::update_review).delete(handlers::delete_review),
        )
}
