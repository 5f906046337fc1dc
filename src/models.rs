use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- Shared identity/timestamp record ---

/// Audit
///
/// The identity-and-timestamps record embedded in every entity. `stamp()` is the
/// single place where ids and creation timestamps are minted; `touch()` is the
/// single place where `updated_at` moves forward. Clients can never set any of
/// these fields directly.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct Audit {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Audit {
    /// Mints a fresh identity: new v4 id, both timestamps set to now.
    pub fn stamp() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Refreshes `updated_at`. Called by the repository on every successful update.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// --- Entities (storage shape, never serialized outward directly) ---

/// User
///
/// Canonical user record. The `password_hash` field is deliberately absent from
/// every output schema (`UserResponse`); this struct itself is never serialized.
/// The `email` field is stored lowercase so uniqueness comparisons are
/// case-insensitive.
#[derive(Debug, Clone, FromRow, Default)]
pub struct User {
    #[sqlx(flatten)]
    pub audit: Audit,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
}

/// Place
///
/// A rental listing. `owner_id` is stamped from the authenticated actor at
/// creation; no endpoint moves it afterwards. `amenity_ids` mirrors the
/// `place_amenities` join table and is filled in by the repository, not by a
/// column on `places`.
#[derive(Debug, Clone, FromRow, Default)]
pub struct Place {
    #[sqlx(flatten)]
    pub audit: Audit,
    pub name: String,
    pub city: String,
    pub price_per_night: i32,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub owner_id: Uuid,
    #[sqlx(skip)]
    pub amenity_ids: Vec<Uuid>,
}

/// Amenity
///
/// Catalog entry attachable to places. `name` is globally unique.
#[derive(Debug, Clone, FromRow, Default)]
pub struct Amenity {
    #[sqlx(flatten)]
    pub audit: Audit,
    pub name: String,
    pub description: Option<String>,
}

/// Review
///
/// Invariants enforced across the handlers and repository: the author is never
/// the place owner, and (user_id, place_id) is unique.
#[derive(Debug, Clone, FromRow, Default)]
pub struct Review {
    #[sqlx(flatten)]
    pub audit: Audit,
    pub text: String,
    pub user_id: Uuid,
    pub place_id: Uuid,
}

// --- Request payloads (input schemas) ---

/// RegisterUserRequest
///
/// Input payload for POST /users. The plaintext password is hashed immediately
/// and never stored or logged. Unknown fields (notably `is_admin`) are rejected
/// rather than silently dropped.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema)]
#[serde(deny_unknown_fields)]
#[ts(export)]
pub struct RegisterUserRequest {
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// UpdateUserRequest
///
/// Partial update for PUT /users/{id}. The allow-list is the struct itself:
/// id, password, admin flag and timestamps simply have no field here, and
/// `deny_unknown_fields` rejects any attempt to smuggle them in.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema, Default)]
#[serde(deny_unknown_fields)]
#[ts(export)]
pub struct UpdateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub first_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub last_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email)]
    pub email: Option<String>,
}

/// LoginRequest
///
/// Input payload for POST /auth/login.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// LoginResponse
///
/// The signed identity token returned on successful authentication.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginResponse {
    pub access_token: String,
}

/// CreatePlaceRequest
///
/// Input payload for POST /places. The owner is stamped from the bearer
/// credential, never from the body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema, Default)]
#[serde(deny_unknown_fields)]
#[ts(export)]
pub struct CreatePlaceRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub city: String,
    /// Nightly price; must be a positive integer.
    #[validate(range(min = 1))]
    pub price_per_night: i32,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// UpdatePlaceRequest
///
/// Partial update for PUT /places/{id}. `owner_id` has no field here, so
/// ownership cannot be transferred through this endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema, Default)]
#[serde(deny_unknown_fields)]
#[ts(export)]
pub struct UpdatePlaceRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub city: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub price_per_night: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

/// CreateAmenityRequest
///
/// Input payload for POST /amenities (admin only).
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema, Default)]
#[serde(deny_unknown_fields)]
#[ts(export)]
pub struct CreateAmenityRequest {
    #[validate(length(min = 1))]
    pub name: String,
    pub description: Option<String>,
}

/// UpdateAmenityRequest
///
/// Partial update for PUT /amenities/{id} (admin only).
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema, Default)]
#[serde(deny_unknown_fields)]
#[ts(export)]
pub struct UpdateAmenityRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// CreateReviewRequest
///
/// Input payload for POST /reviews. The author is the bearer credential.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS, ToSchema, Default)]
#[serde(deny_unknown_fields)]
#[ts(export)]
pub struct CreateReviewRequest {
    #[validate(length(min = 1))]
    pub text: String,
    pub place_id: Uuid,
}

/// UpdateReviewRequest
///
/// Author-only edit of the review text. An absent or blank text is reported as
/// `nothing_to_update` by the handler.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(deny_unknown_fields)]
#[ts(export)]
pub struct UpdateReviewRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

// --- Response schemas (output, allow-listed) ---

/// UserResponse
///
/// Public user representation. Password material is not a field of this type,
/// so it cannot leak through any list or detail read.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.audit.id,
            first_name: u.first_name,
            last_name: u.last_name,
            email: u.email,
            created_at: u.audit.created_at,
            updated_at: u.audit.updated_at,
        }
    }
}

/// PlaceResponse
///
/// Full listing representation including the attached amenity ids.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PlaceResponse {
    pub id: Uuid,
    pub name: String,
    pub city: String,
    pub price_per_night: i32,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub owner_id: Uuid,
    pub amenity_ids: Vec<Uuid>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl From<Place> for PlaceResponse {
    fn from(p: Place) -> Self {
        Self {
            id: p.audit.id,
            name: p.name,
            city: p.city,
            price_per_night: p.price_per_night,
            description: p.description,
            latitude: p.latitude,
            longitude: p.longitude,
            owner_id: p.owner_id,
            amenity_ids: p.amenity_ids,
            created_at: p.audit.created_at,
            updated_at: p.audit.updated_at,
        }
    }
}

/// AmenityResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AmenityResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl From<Amenity> for AmenityResponse {
    fn from(a: Amenity) -> Self {
        Self {
            id: a.audit.id,
            name: a.name,
            description: a.description,
            created_at: a.audit.created_at,
            updated_at: a.audit.updated_at,
        }
    }
}

/// ReviewResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub text: String,
    pub user_id: Uuid,
    pub place_id: Uuid,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(r: Review) -> Self {
        Self {
            id: r.audit.id,
            text: r.text,
            user_id: r.user_id,
            place_id: r.place_id,
            created_at: r.audit.created_at,
            updated_at: r.audit.updated_at,
        }
    }
}
