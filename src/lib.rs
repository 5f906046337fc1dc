use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod password;
pub mod policy;
pub mod repository;

// Routing segregation (Public, Authenticated, Admin).
pub mod routes;
use auth::AuthUser;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

// Core state types for the application entry point (main.rs) and tests.
pub use config::AppConfig;
pub use repository::{MemoryRepository, PostgresRepository, RepositoryState};

/// ApiDoc
///
/// Aggregates the OpenAPI documentation for every endpoint and schema. The
/// generated JSON is served at `/api-docs/openapi.json` and rendered at
/// `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::register_user, handlers::get_users, handlers::get_user,
        handlers::update_user, handlers::delete_user, handlers::login,
        handlers::get_places, handlers::get_place, handlers::create_place,
        handlers::update_place, handlers::delete_place,
        handlers::attach_amenity, handlers::detach_amenity,
        handlers::get_amenities, handlers::get_amenity,
        handlers::create_amenity, handlers::update_amenity, handlers::delete_amenity,
        handlers::get_reviews, handlers::get_review, handlers::get_place_reviews,
        handlers::create_review, handlers::update_review, handlers::delete_review
    ),
    components(
        schemas(
            models::RegisterUserRequest, models::UpdateUserRequest, models::UserResponse,
            models::LoginRequest, models::LoginResponse,
            models::CreatePlaceRequest, models::UpdatePlaceRequest, models::PlaceResponse,
            models::CreateAmenityRequest, models::UpdateAmenityRequest, models::AmenityResponse,
            models::CreateReviewRequest, models::UpdateReviewRequest, models::ReviewResponse,
        )
    ),
    tags(
        (name = "staylist", description = "Vacation rental listings API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single shared container for the application's services: the repository
/// handle (whichever backend was constructed at startup) and the immutable
/// configuration. Handlers and extractors receive everything through this
/// state; there is no global storage instance anywhere.
#[derive(Clone)]
pub struct AppState {
    /// Storage layer behind the uniform repository contract.
    pub repo: RepositoryState,
    /// Loaded, immutable configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// Let extractors pull individual components out of the shared state.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Gate for the authenticated and admin route groups. The `AuthUser`
/// extractor performs the actual work (token validation plus a repository
/// lookup); a failed extraction rejects the request with 401 before any
/// handler runs.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the complete routing structure, applies the auth gate to the
/// protected groups, and stacks the observability and CORS layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        // Documentation: auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public routes: no middleware.
        .merge(public::public_routes())
        // Authenticated routes: bearer credential required.
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        // Admin routes: same credential gate; the role check happens in the
        // handlers so non-admins receive 403 rather than 401.
        .merge(
            admin::admin_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .with_state(state);

    // Request correlation and tracing, applied outermost.
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span factory for `TraceLayer`: one span per request carrying the method,
/// URI and the generated request id, so every log line of a request is
/// correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
