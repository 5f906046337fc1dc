use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use super::{RepoError, RepoResult, Repository};
use crate::models::{
    Amenity, Place, Review, UpdateAmenityRequest, UpdatePlaceRequest, UpdateUserRequest, User,
};

/// PostgresRepository
///
/// The relational backend. Uniqueness is enforced by database constraints and
/// surfaced as `Duplicate`; cascades (place -> reviews, user -> places and
/// reviews, amenity -> attachments) are declared `ON DELETE CASCADE` in the
/// schema. Each operation is a single statement, so atomicity comes from the
/// database itself.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance over the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads the attachment set for a single place.
    async fn amenity_ids(&self, place_id: Uuid) -> RepoResult<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT amenity_id FROM place_amenities WHERE place_id = $1 ORDER BY amenity_id",
        )
        .bind(place_id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)
    }

    async fn fill_amenities(&self, mut place: Place) -> RepoResult<Place> {
        place.amenity_ids = self.amenity_ids(place.audit.id).await?;
        Ok(place)
    }
}

fn backend(e: sqlx::Error) -> RepoError {
    RepoError::Backend(e.to_string())
}

/// Maps a write error to `Duplicate(reason)` when it is a unique-constraint
/// violation, leaving other integrity failures as backend errors.
fn write_err(e: sqlx::Error, duplicate_reason: &'static str) -> RepoError {
    if let sqlx::Error::Database(db) = &e {
        if db.kind() == sqlx::error::ErrorKind::UniqueViolation {
            return RepoError::Duplicate(duplicate_reason);
        }
    }
    backend(e)
}

const USER_COLUMNS: &str = "id, created_at, updated_at, first_name, last_name, email, password_hash, is_admin";
const PLACE_COLUMNS: &str = "id, created_at, updated_at, name, city, price_per_night, description, latitude, longitude, owner_id";
const AMENITY_COLUMNS: &str = "id, created_at, updated_at, name, description";
const REVIEW_COLUMNS: &str = "id, created_at, updated_at, text, user_id, place_id";

#[async_trait]
impl Repository for PostgresRepository {
    // --- Users ---

    async fn create_user(&self, user: User) -> RepoResult<User> {
        let sql = format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(user.audit.id)
            .bind(user.audit.created_at)
            .bind(user.audit.updated_at)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.is_admin)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| write_err(e, "email_already_exists"))
    }

    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)
    }

    async fn get_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)
    }

    async fn list_users(&self) -> RepoResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC");
        sqlx::query_as::<_, User>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(backend)
    }

    async fn update_user(&self, id: Uuid, fields: UpdateUserRequest) -> RepoResult<User> {
        let sql = format!(
            "UPDATE users \
             SET first_name = COALESCE($2, first_name), \
                 last_name = COALESCE($3, last_name), \
                 email = COALESCE($4, email), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(fields.first_name)
            .bind(fields.last_name)
            .bind(fields.email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| write_err(e, "email_already_exists"))?
            .ok_or(RepoError::NotFound)
    }

    async fn delete_user(&self, id: Uuid) -> RepoResult<bool> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map(|res| res.rows_affected() > 0)
            .map_err(backend)
    }

    // --- Places ---

    async fn create_place(&self, place: Place) -> RepoResult<Place> {
        let sql = format!(
            "INSERT INTO places ({PLACE_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {PLACE_COLUMNS}"
        );
        sqlx::query_as::<_, Place>(&sql)
            .bind(place.audit.id)
            .bind(place.audit.created_at)
            .bind(place.audit.updated_at)
            .bind(&place.name)
            .bind(&place.city)
            .bind(place.price_per_night)
            .bind(&place.description)
            .bind(place.latitude)
            .bind(place.longitude)
            .bind(place.owner_id)
            .fetch_one(&self.pool)
            .await
            .map_err(backend)
    }

    async fn get_place(&self, id: Uuid) -> RepoResult<Option<Place>> {
        let sql = format!("SELECT {PLACE_COLUMNS} FROM places WHERE id = $1");
        let place = sqlx::query_as::<_, Place>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        match place {
            Some(place) => Ok(Some(self.fill_amenities(place).await?)),
            None => Ok(None),
        }
    }

    async fn list_places(&self) -> RepoResult<Vec<Place>> {
        let sql = format!("SELECT {PLACE_COLUMNS} FROM places ORDER BY created_at ASC");
        let mut places = sqlx::query_as::<_, Place>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;

        // One pass over the join table instead of a query per place.
        let rows = sqlx::query_as::<_, (Uuid, Uuid)>(
            "SELECT place_id, amenity_id FROM place_amenities ORDER BY amenity_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        let mut by_place: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for (place_id, amenity_id) in rows {
            by_place.entry(place_id).or_default().push(amenity_id);
        }
        for place in &mut places {
            if let Some(ids) = by_place.remove(&place.audit.id) {
                place.amenity_ids = ids;
            }
        }
        Ok(places)
    }

    async fn update_place(&self, id: Uuid, fields: UpdatePlaceRequest) -> RepoResult<Place> {
        let sql = format!(
            "UPDATE places \
             SET name = COALESCE($2, name), \
                 city = COALESCE($3, city), \
                 price_per_night = COALESCE($4, price_per_night), \
                 description = COALESCE($5, description), \
                 latitude = COALESCE($6, latitude), \
                 longitude = COALESCE($7, longitude), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {PLACE_COLUMNS}"
        );
        let place = sqlx::query_as::<_, Place>(&sql)
            .bind(id)
            .bind(fields.name)
            .bind(fields.city)
            .bind(fields.price_per_night)
            .bind(fields.description)
            .bind(fields.latitude)
            .bind(fields.longitude)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?
            .ok_or(RepoError::NotFound)?;
        self.fill_amenities(place).await
    }

    async fn delete_place(&self, id: Uuid) -> RepoResult<bool> {
        // Reviews and attachments go with the place via ON DELETE CASCADE.
        sqlx::query("DELETE FROM places WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map(|res| res.rows_affected() > 0)
            .map_err(backend)
    }

    async fn attach_amenity(&self, place_id: Uuid, amenity_id: Uuid) -> RepoResult<Place> {
        if self.get_amenity(amenity_id).await?.is_none() {
            return Err(RepoError::NotFound);
        }
        let inserted = sqlx::query(
            "INSERT INTO place_amenities (place_id, amenity_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(place_id)
        .bind(amenity_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            // A missing place surfaces as a foreign-key violation here.
            if let sqlx::Error::Database(db) = &e {
                if db.kind() == sqlx::error::ErrorKind::ForeignKeyViolation {
                    return RepoError::NotFound;
                }
            }
            backend(e)
        })?;

        if inserted.rows_affected() > 0 {
            sqlx::query("UPDATE places SET updated_at = NOW() WHERE id = $1")
                .bind(place_id)
                .execute(&self.pool)
                .await
                .map_err(backend)?;
        }
        self.get_place(place_id).await?.ok_or(RepoError::NotFound)
    }

    async fn detach_amenity(&self, place_id: Uuid, amenity_id: Uuid) -> RepoResult<Place> {
        if self.get_amenity(amenity_id).await?.is_none() {
            return Err(RepoError::NotFound);
        }
        let removed = sqlx::query(
            "DELETE FROM place_amenities WHERE place_id = $1 AND amenity_id = $2",
        )
        .bind(place_id)
        .bind(amenity_id)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        if removed.rows_affected() > 0 {
            sqlx::query("UPDATE places SET updated_at = NOW() WHERE id = $1")
                .bind(place_id)
                .execute(&self.pool)
                .await
                .map_err(backend)?;
        }
        self.get_place(place_id).await?.ok_or(RepoError::NotFound)
    }

    // --- Amenities ---

    async fn create_amenity(&self, amenity: Amenity) -> RepoResult<Amenity> {
        let sql = format!(
            "INSERT INTO amenities ({AMENITY_COLUMNS}) VALUES ($1, $2, $3, $4, $5) \
             RETURNING {AMENITY_COLUMNS}"
        );
        sqlx::query_as::<_, Amenity>(&sql)
            .bind(amenity.audit.id)
            .bind(amenity.audit.created_at)
            .bind(amenity.audit.updated_at)
            .bind(&amenity.name)
            .bind(&amenity.description)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| write_err(e, "amenity_already_exists"))
    }

    async fn get_amenity(&self, id: Uuid) -> RepoResult<Option<Amenity>> {
        let sql = format!("SELECT {AMENITY_COLUMNS} FROM amenities WHERE id = $1");
        sqlx::query_as::<_, Amenity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)
    }

    async fn list_amenities(&self) -> RepoResult<Vec<Amenity>> {
        let sql = format!("SELECT {AMENITY_COLUMNS} FROM amenities ORDER BY created_at ASC");
        sqlx::query_as::<_, Amenity>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(backend)
    }

    async fn update_amenity(&self, id: Uuid, fields: UpdateAmenityRequest) -> RepoResult<Amenity> {
        let sql = format!(
            "UPDATE amenities \
             SET name = COALESCE($2, name), \
                 description = COALESCE($3, description), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {AMENITY_COLUMNS}"
        );
        sqlx::query_as::<_, Amenity>(&sql)
            .bind(id)
            .bind(fields.name)
            .bind(fields.description)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| write_err(e, "amenity_already_exists"))?
            .ok_or(RepoError::NotFound)
    }

    async fn delete_amenity(&self, id: Uuid) -> RepoResult<bool> {
        sqlx::query("DELETE FROM amenities WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map(|res| res.rows_affected() > 0)
            .map_err(backend)
    }

    // --- Reviews ---

    async fn create_review(&self, review: Review) -> RepoResult<Review> {
        let sql = format!(
            "INSERT INTO reviews ({REVIEW_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {REVIEW_COLUMNS}"
        );
        sqlx::query_as::<_, Review>(&sql)
            .bind(review.audit.id)
            .bind(review.audit.created_at)
            .bind(review.audit.updated_at)
            .bind(&review.text)
            .bind(review.user_id)
            .bind(review.place_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| write_err(e, "duplicate_review"))
    }

    async fn get_review(&self, id: Uuid) -> RepoResult<Option<Review>> {
        let sql = format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1");
        sqlx::query_as::<_, Review>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)
    }

    async fn list_reviews(&self) -> RepoResult<Vec<Review>> {
        let sql = format!("SELECT {REVIEW_COLUMNS} FROM reviews ORDER BY created_at ASC");
        sqlx::query_as::<_, Review>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(backend)
    }

    async fn list_reviews_for_place(&self, place_id: Uuid) -> RepoResult<Vec<Review>> {
        let sql = format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE place_id = $1 ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, Review>(&sql)
            .bind(place_id)
            .fetch_all(&self.pool)
            .await
            .map_err(backend)
    }

    async fn update_review(&self, id: Uuid, text: String) -> RepoResult<Review> {
        let sql = format!(
            "UPDATE reviews SET text = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING {REVIEW_COLUMNS}"
        );
        sqlx::query_as::<_, Review>(&sql)
            .bind(id)
            .bind(text)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?
            .ok_or(RepoError::NotFound)
    }

    async fn delete_review(&self, id: Uuid) -> RepoResult<bool> {
        sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map(|res| res.rows_affected() > 0)
            .map_err(backend)
    }
}
