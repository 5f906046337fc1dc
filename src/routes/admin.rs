use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{post, put},
};

/// Admin Router Module
///
/// Catalog management for amenities. These routes pass through the same auth
/// middleware as the authenticated group; the admin requirement itself is
/// enforced in the handlers via `policy::modify_amenity`, so a plain
/// authenticated user gets a 403 rather than a 401.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // POST /amenities
        // Adds a catalog entry; names are globally unique.
        .route("/amenities", post(handlers::create_amenity))
        // PUT/DELETE /amenities/{id}
        // Rename/re-describe or remove a catalog entry. Removal detaches the
        // amenity from every place that carried it.
        .route(
            "/amenities/{id}",
            put(handlers::update_amenity).delete(handlers::delete_amenity),
        )
}
