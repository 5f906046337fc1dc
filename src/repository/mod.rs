use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Amenity, Place, Review, UpdateAmenityRequest, UpdatePlaceRequest, UpdateUserRequest, User,
};

mod memory;
mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PostgresRepository;

/// RepoError
///
/// Storage-level outcomes the handlers must distinguish. Uniqueness violations
/// carry the user-visible reason string so Postgres constraint names and
/// in-memory scans produce the same error; everything else unexpected is a
/// backend failure whose detail stays server-side.
#[derive(Debug, Error, PartialEq)]
pub enum RepoError {
    #[error("{0}")]
    Duplicate(&'static str),

    #[error("not_found")]
    NotFound,

    #[error("storage failure: {0}")]
    Backend(String),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository
///
/// The uniform persistence contract shared by the in-memory and relational
/// backends. Guarantees: generated ids are unique per entity type, every
/// successful update refreshes `updated_at`, updating a nonexistent id returns
/// `NotFound` rather than panicking, and lists are ordered by creation time
/// ascending. Entities arrive pre-stamped (`Audit::stamp()`); the repository
/// owns all subsequent timestamp movement.
///
/// Deleting a place cascades to its reviews and amenity attachments in both
/// backends; deleting a user likewise cascades to their places and reviews.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn create_user(&self, user: User) -> RepoResult<User>;
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>>;
    /// Lookup by already-lowercased email.
    async fn get_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    async fn list_users(&self) -> RepoResult<Vec<User>>;
    async fn update_user(&self, id: Uuid, fields: UpdateUserRequest) -> RepoResult<User>;
    async fn delete_user(&self, id: Uuid) -> RepoResult<bool>;

    // --- Places ---
    async fn create_place(&self, place: Place) -> RepoResult<Place>;
    async fn get_place(&self, id: Uuid) -> RepoResult<Option<Place>>;
    async fn list_places(&self) -> RepoResult<Vec<Place>>;
    async fn update_place(&self, id: Uuid, fields: UpdatePlaceRequest) -> RepoResult<Place>;
    async fn delete_place(&self, id: Uuid) -> RepoResult<bool>;
    /// Idempotent attach; `NotFound` if either side is absent.
    async fn attach_amenity(&self, place_id: Uuid, amenity_id: Uuid) -> RepoResult<Place>;
    /// Idempotent detach; `NotFound` if either side is absent.
    async fn detach_amenity(&self, place_id: Uuid, amenity_id: Uuid) -> RepoResult<Place>;

    // --- Amenities ---
    async fn create_amenity(&self, amenity: Amenity) -> RepoResult<Amenity>;
    async fn get_amenity(&self, id: Uuid) -> RepoResult<Option<Amenity>>;
    async fn list_amenities(&self) -> RepoResult<Vec<Amenity>>;
    async fn update_amenity(&self, id: Uuid, fields: UpdateAmenityRequest) -> RepoResult<Amenity>;
    async fn delete_amenity(&self, id: Uuid) -> RepoResult<bool>;

    // --- Reviews ---
    /// Enforces the one-review-per-(author, place) rule via `Duplicate`.
    async fn create_review(&self, review: Review) -> RepoResult<Review>;
    async fn get_review(&self, id: Uuid) -> RepoResult<Option<Review>>;
    async fn list_reviews(&self) -> RepoResult<Vec<Review>>;
    async fn list_reviews_for_place(&self, place_id: Uuid) -> RepoResult<Vec<Review>>;
    async fn update_review(&self, id: Uuid, text: String) -> RepoResult<Review>;
    async fn delete_review(&self, id: Uuid) -> RepoResult<bool>;
}

/// The shared handle handlers receive through the application state.
pub type RepositoryState = Arc<dyn Repository>;
