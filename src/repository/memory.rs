use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use super::{RepoError, RepoResult, Repository};
use crate::models::{
    Amenity, Place, Review, UpdateAmenityRequest, UpdatePlaceRequest, UpdateUserRequest, User,
};

/// MemoryRepository
///
/// Process-local backend: one map per entity type behind an `RwLock`. No
/// persistence and no transaction isolation; suitable for development and
/// tests. Uniqueness rules are enforced by scanning, and cascades are applied
/// explicitly so this backend is observably equivalent to the relational one.
#[derive(Default)]
pub struct MemoryRepository {
    users: RwLock<HashMap<Uuid, User>>,
    places: RwLock<HashMap<Uuid, Place>>,
    amenities: RwLock<HashMap<Uuid, Amenity>>,
    reviews: RwLock<HashMap<Uuid, Review>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Locks are never held across an await point; a poisoned lock means a panic
/// already happened elsewhere, so it is surfaced as a backend failure.
fn lock_err<T>(_: T) -> RepoError {
    RepoError::Backend("lock poisoned".to_string())
}

fn sorted_by_creation<T: Clone>(
    map: &HashMap<Uuid, T>,
    created_at: impl Fn(&T) -> chrono::DateTime<chrono::Utc>,
) -> Vec<T> {
    let mut items: Vec<T> = map.values().cloned().collect();
    items.sort_by_key(|item| created_at(item));
    items
}

#[async_trait]
impl Repository for MemoryRepository {
    // --- Users ---

    async fn create_user(&self, user: User) -> RepoResult<User> {
        let mut users = self.users.write().map_err(lock_err)?;
        if users.values().any(|u| u.email == user.email) {
            return Err(RepoError::Duplicate("email_already_exists"));
        }
        users.insert(user.audit.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        Ok(self.users.read().map_err(lock_err)?.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        Ok(self
            .users
            .read()
            .map_err(lock_err)?
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list_users(&self) -> RepoResult<Vec<User>> {
        let users = self.users.read().map_err(lock_err)?;
        Ok(sorted_by_creation(&users, |u| u.audit.created_at))
    }

    async fn update_user(&self, id: Uuid, fields: UpdateUserRequest) -> RepoResult<User> {
        let mut users = self.users.write().map_err(lock_err)?;
        // Absence wins over a conflicting email, matching the relational
        // backend where the constraint never fires for a missing row.
        if !users.contains_key(&id) {
            return Err(RepoError::NotFound);
        }
        if let Some(email) = &fields.email {
            if users.values().any(|u| u.audit.id != id && &u.email == email) {
                return Err(RepoError::Duplicate("email_already_exists"));
            }
        }
        let user = users.get_mut(&id).ok_or(RepoError::NotFound)?;
        if let Some(first_name) = fields.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = fields.last_name {
            user.last_name = last_name;
        }
        if let Some(email) = fields.email {
            user.email = email;
        }
        user.audit.touch();
        Ok(user.clone())
    }

    async fn delete_user(&self, id: Uuid) -> RepoResult<bool> {
        let removed = self.users.write().map_err(lock_err)?.remove(&id).is_some();
        if removed {
            // Cascade: the user's places (and those places' reviews) and the
            // user's own reviews go with the account.
            let mut places = self.places.write().map_err(lock_err)?;
            let owned: Vec<Uuid> = places
                .values()
                .filter(|p| p.owner_id == id)
                .map(|p| p.audit.id)
                .collect();
            for place_id in &owned {
                places.remove(place_id);
            }
            drop(places);

            let mut reviews = self.reviews.write().map_err(lock_err)?;
            reviews.retain(|_, r| r.user_id != id && !owned.contains(&r.place_id));
        }
        Ok(removed)
    }

    // --- Places ---

    async fn create_place(&self, place: Place) -> RepoResult<Place> {
        let mut places = self.places.write().map_err(lock_err)?;
        places.insert(place.audit.id, place.clone());
        Ok(place)
    }

    async fn get_place(&self, id: Uuid) -> RepoResult<Option<Place>> {
        Ok(self.places.read().map_err(lock_err)?.get(&id).cloned())
    }

    async fn list_places(&self) -> RepoResult<Vec<Place>> {
        let places = self.places.read().map_err(lock_err)?;
        Ok(sorted_by_creation(&places, |p| p.audit.created_at))
    }

    async fn update_place(&self, id: Uuid, fields: UpdatePlaceRequest) -> RepoResult<Place> {
        let mut places = self.places.write().map_err(lock_err)?;
        let place = places.get_mut(&id).ok_or(RepoError::NotFound)?;
        if let Some(name) = fields.name {
            place.name = name;
        }
        if let Some(city) = fields.city {
            place.city = city;
        }
        if let Some(price) = fields.price_per_night {
            place.price_per_night = price;
        }
        if let Some(description) = fields.description {
            place.description = Some(description);
        }
        if let Some(latitude) = fields.latitude {
            place.latitude = Some(latitude);
        }
        if let Some(longitude) = fields.longitude {
            place.longitude = Some(longitude);
        }
        place.audit.touch();
        Ok(place.clone())
    }

    async fn delete_place(&self, id: Uuid) -> RepoResult<bool> {
        let removed = self.places.write().map_err(lock_err)?.remove(&id).is_some();
        if removed {
            // Cascade: a deleted place takes its reviews with it.
            self.reviews
                .write()
                .map_err(lock_err)?
                .retain(|_, r| r.place_id != id);
        }
        Ok(removed)
    }

    async fn attach_amenity(&self, place_id: Uuid, amenity_id: Uuid) -> RepoResult<Place> {
        if !self
            .amenities
            .read()
            .map_err(lock_err)?
            .contains_key(&amenity_id)
        {
            return Err(RepoError::NotFound);
        }
        let mut places = self.places.write().map_err(lock_err)?;
        let place = places.get_mut(&place_id).ok_or(RepoError::NotFound)?;
        if !place.amenity_ids.contains(&amenity_id) {
            place.amenity_ids.push(amenity_id);
            place.audit.touch();
        }
        Ok(place.clone())
    }

    async fn detach_amenity(&self, place_id: Uuid, amenity_id: Uuid) -> RepoResult<Place> {
        if !self
            .amenities
            .read()
            .map_err(lock_err)?
            .contains_key(&amenity_id)
        {
            return Err(RepoError::NotFound);
        }
        let mut places = self.places.write().map_err(lock_err)?;
        let place = places.get_mut(&place_id).ok_or(RepoError::NotFound)?;
        if let Some(pos) = place.amenity_ids.iter().position(|id| *id == amenity_id) {
            place.amenity_ids.remove(pos);
            place.audit.touch();
        }
        Ok(place.clone())
    }

    // --- Amenities ---

    async fn create_amenity(&self, amenity: Amenity) -> RepoResult<Amenity> {
        let mut amenities = self.amenities.write().map_err(lock_err)?;
        if amenities.values().any(|a| a.name == amenity.name) {
            return Err(RepoError::Duplicate("amenity_already_exists"));
        }
        amenities.insert(amenity.audit.id, amenity.clone());
        Ok(amenity)
    }

    async fn get_amenity(&self, id: Uuid) -> RepoResult<Option<Amenity>> {
        Ok(self.amenities.read().map_err(lock_err)?.get(&id).cloned())
    }

    async fn list_amenities(&self) -> RepoResult<Vec<Amenity>> {
        let amenities = self.amenities.read().map_err(lock_err)?;
        Ok(sorted_by_creation(&amenities, |a| a.audit.created_at))
    }

    async fn update_amenity(&self, id: Uuid, fields: UpdateAmenityRequest) -> RepoResult<Amenity> {
        let mut amenities = self.amenities.write().map_err(lock_err)?;
        if !amenities.contains_key(&id) {
            return Err(RepoError::NotFound);
        }
        if let Some(name) = &fields.name {
            if amenities.values().any(|a| a.audit.id != id && &a.name == name) {
                return Err(RepoError::Duplicate("amenity_already_exists"));
            }
        }
        let amenity = amenities.get_mut(&id).ok_or(RepoError::NotFound)?;
        if let Some(name) = fields.name {
            amenity.name = name;
        }
        if let Some(description) = fields.description {
            amenity.description = Some(description);
        }
        amenity.audit.touch();
        Ok(amenity.clone())
    }

    async fn delete_amenity(&self, id: Uuid) -> RepoResult<bool> {
        let removed = self
            .amenities
            .write()
            .map_err(lock_err)?
            .remove(&id)
            .is_some();
        if removed {
            // Cascade: drop the attachment from every place that carried it.
            let mut places = self.places.write().map_err(lock_err)?;
            for place in places.values_mut() {
                place.amenity_ids.retain(|a| *a != id);
            }
        }
        Ok(removed)
    }

    // --- Reviews ---

    async fn create_review(&self, review: Review) -> RepoResult<Review> {
        let mut reviews = self.reviews.write().map_err(lock_err)?;
        if reviews
            .values()
            .any(|r| r.user_id == review.user_id && r.place_id == review.place_id)
        {
            return Err(RepoError::Duplicate("duplicate_review"));
        }
        reviews.insert(review.audit.id, review.clone());
        Ok(review)
    }

    async fn get_review(&self, id: Uuid) -> RepoResult<Option<Review>> {
        Ok(self.reviews.read().map_err(lock_err)?.get(&id).cloned())
    }

    async fn list_reviews(&self) -> RepoResult<Vec<Review>> {
        let reviews = self.reviews.read().map_err(lock_err)?;
        Ok(sorted_by_creation(&reviews, |r| r.audit.created_at))
    }

    async fn list_reviews_for_place(&self, place_id: Uuid) -> RepoResult<Vec<Review>> {
        let reviews = self.reviews.read().map_err(lock_err)?;
        let mut items: Vec<Review> = reviews
            .values()
            .filter(|r| r.place_id == place_id)
            .cloned()
            .collect();
        items.sort_by_key(|r| r.audit.created_at);
        Ok(items)
    }

    async fn update_review(&self, id: Uuid, text: String) -> RepoResult<Review> {
        let mut reviews = self.reviews.write().map_err(lock_err)?;
        let review = reviews.get_mut(&id).ok_or(RepoError::NotFound)?;
        review.text = text;
        review.audit.touch();
        Ok(review.clone())
    }

    async fn delete_review(&self, id: Uuid) -> RepoResult<bool> {
        Ok(self.reviews.write().map_err(lock_err)?.remove(&id).is_some())
    }
}
