use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints accessible to any client, anonymous or logged-in: every read
/// surface, account registration, and login. None of these handlers consult
/// the bearer credential.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for monitoring and load balancer checks.
        .route("/health", get(|| async { "ok" }))
        // POST /users
        // Registration. Open to anyone; duplicate emails are a 409.
        .route("/users", post(handlers::register_user))
        // GET /users, GET /users/{id}
        // Public user representations; password material is never part of
        // the output schema.
        .route("/users", get(handlers::get_users))
        .route("/users/{id}", get(handlers::get_user))
        // POST /auth/login
        // Credential verification and token issuance.
        .route("/auth/login", post(handlers::login))
        // GET /places, GET /places/{id}
        .route("/places", get(handlers::get_places))
        .route("/places/{id}", get(handlers::get_place))
        // GET /places/{id}/reviews
        // Place-scoped review listing; 404 when the place is absent.
        .route("/places/{id}/reviews", get(handlers::get_place_reviews))
        // GET /amenities, GET /amenities/{id}
        .route("/amenities", get(handlers::get_amenities))
        .route("/amenities/{id}", get(handlers::get_amenity))
        // GET /reviews, GET /reviews/{id}
        .route("/reviews", get(handlers::get_reviews))
        .route("/reviews/{id}", get(handlers::get_review))
}
