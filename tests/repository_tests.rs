use std::time::Duration;

use staylist::{
    models::{
        Amenity, Audit, Place, Review, UpdateAmenityRequest, UpdatePlaceRequest,
        UpdateUserRequest, User,
    },
    repository::{MemoryRepository, RepoError, Repository},
};
use tokio::test;
use uuid::Uuid;

// --- Test Data Helpers ---

fn test_user(email: &str) -> User {
    User {
        audit: Audit::stamp(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        email: email.to_string(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$placeholder$placeholder".to_string(),
        is_admin: false,
    }
}

fn test_place(owner_id: Uuid, name: &str) -> Place {
    Place {
        audit: Audit::stamp(),
        name: name.to_string(),
        city: "Lisbon".to_string(),
        price_per_night: 120,
        description: Some("Near the water".to_string()),
        latitude: Some(38.72),
        longitude: Some(-9.14),
        owner_id,
        amenity_ids: vec![],
    }
}

fn test_amenity(name: &str) -> Amenity {
    Amenity {
        audit: Audit::stamp(),
        name: name.to_string(),
        description: None,
    }
}

fn test_review(user_id: Uuid, place_id: Uuid) -> Review {
    Review {
        audit: Audit::stamp(),
        text: "Lovely stay".to_string(),
        user_id,
        place_id,
    }
}

// Audit::stamp() has nanosecond resolution, but two stamps taken back-to-back
// can still collide; a small pause keeps creation-order assertions meaningful.
async fn pause() {
    tokio::time::sleep(Duration::from_millis(5)).await;
}

// --- Tests ---

#[test]
async fn create_assigns_unique_ids_and_sets_timestamps() {
    let repo = MemoryRepository::new();

    let a = repo.create_user(test_user("a@example.com")).await.unwrap();
    let b = repo.create_user(test_user("b@example.com")).await.unwrap();

    assert_ne!(a.audit.id, b.audit.id);
    assert_eq!(a.audit.created_at, a.audit.updated_at);
}

#[test]
async fn update_refreshes_updated_at_and_keeps_it_non_decreasing() {
    let repo = MemoryRepository::new();
    let user = repo.create_user(test_user("a@example.com")).await.unwrap();

    pause().await;
    let first = repo
        .update_user(
            user.audit.id,
            UpdateUserRequest {
                first_name: Some("Renamed".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(first.first_name, "Renamed");
    assert!(first.audit.updated_at > user.audit.updated_at);
    assert_eq!(first.audit.created_at, user.audit.created_at);

    pause().await;
    let second = repo
        .update_user(
            user.audit.id,
            UpdateUserRequest {
                last_name: Some("Again".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(second.audit.updated_at >= first.audit.updated_at);
}

#[test]
async fn duplicate_email_is_a_conflict() {
    let repo = MemoryRepository::new();
    repo.create_user(test_user("same@example.com"))
        .await
        .unwrap();

    let err = repo
        .create_user(test_user("same@example.com"))
        .await
        .unwrap_err();
    assert_eq!(err, RepoError::Duplicate("email_already_exists"));
}

#[test]
async fn update_to_an_already_taken_email_is_a_conflict() {
    let repo = MemoryRepository::new();
    repo.create_user(test_user("taken@example.com"))
        .await
        .unwrap();
    let user = repo.create_user(test_user("mine@example.com")).await.unwrap();

    let err = repo
        .update_user(
            user.audit.id,
            UpdateUserRequest {
                email: Some("taken@example.com".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, RepoError::Duplicate("email_already_exists"));
}

#[test]
async fn update_of_a_missing_id_is_not_found() {
    let repo = MemoryRepository::new();

    let err = repo
        .update_user(Uuid::new_v4(), UpdateUserRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err, RepoError::NotFound);

    let err = repo
        .update_place(Uuid::new_v4(), UpdatePlaceRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err, RepoError::NotFound);

    let err = repo
        .update_amenity(Uuid::new_v4(), UpdateAmenityRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err, RepoError::NotFound);

    let err = repo
        .update_review(Uuid::new_v4(), "text".to_string())
        .await
        .unwrap_err();
    assert_eq!(err, RepoError::NotFound);
}

#[test]
async fn delete_returns_false_for_missing_ids() {
    let repo = MemoryRepository::new();
    assert!(!repo.delete_user(Uuid::new_v4()).await.unwrap());
    assert!(!repo.delete_place(Uuid::new_v4()).await.unwrap());
    assert!(!repo.delete_amenity(Uuid::new_v4()).await.unwrap());
    assert!(!repo.delete_review(Uuid::new_v4()).await.unwrap());
}

#[test]
async fn lists_are_ordered_by_creation_time() {
    let repo = MemoryRepository::new();

    let first = repo.create_user(test_user("one@example.com")).await.unwrap();
    pause().await;
    let second = repo.create_user(test_user("two@example.com")).await.unwrap();
    pause().await;
    let third = repo
        .create_user(test_user("three@example.com"))
        .await
        .unwrap();

    let listed = repo.list_users().await.unwrap();
    let ids: Vec<Uuid> = listed.iter().map(|u| u.audit.id).collect();
    assert_eq!(ids, vec![first.audit.id, second.audit.id, third.audit.id]);
}

#[test]
async fn email_lookup_finds_the_stored_record() {
    let repo = MemoryRepository::new();
    let user = repo.create_user(test_user("find@example.com")).await.unwrap();

    let found = repo.get_user_by_email("find@example.com").await.unwrap();
    assert_eq!(found.unwrap().audit.id, user.audit.id);

    let missing = repo.get_user_by_email("nobody@example.com").await.unwrap();
    assert!(missing.is_none());
}

#[test]
async fn duplicate_review_for_the_same_place_is_a_conflict() {
    let repo = MemoryRepository::new();
    let owner = repo.create_user(test_user("owner@example.com")).await.unwrap();
    let guest = repo.create_user(test_user("guest@example.com")).await.unwrap();
    let place = repo
        .create_place(test_place(owner.audit.id, "Loft"))
        .await
        .unwrap();

    repo.create_review(test_review(guest.audit.id, place.audit.id))
        .await
        .unwrap();

    let err = repo
        .create_review(test_review(guest.audit.id, place.audit.id))
        .await
        .unwrap_err();
    assert_eq!(err, RepoError::Duplicate("duplicate_review"));
}

#[test]
async fn deleting_a_place_cascades_to_its_reviews() {
    let repo = MemoryRepository::new();
    let owner = repo.create_user(test_user("owner@example.com")).await.unwrap();
    let guest = repo.create_user(test_user("guest@example.com")).await.unwrap();
    let place = repo
        .create_place(test_place(owner.audit.id, "Loft"))
        .await
        .unwrap();
    let review = repo
        .create_review(test_review(guest.audit.id, place.audit.id))
        .await
        .unwrap();

    assert!(repo.delete_place(place.audit.id).await.unwrap());
    assert!(repo.get_review(review.audit.id).await.unwrap().is_none());
    assert!(
        repo.list_reviews_for_place(place.audit.id)
            .await
            .unwrap()
            .is_empty()
    );
}

#[test]
async fn deleting_a_user_cascades_to_their_places_and_reviews() {
    let repo = MemoryRepository::new();
    let owner = repo.create_user(test_user("owner@example.com")).await.unwrap();
    let guest = repo.create_user(test_user("guest@example.com")).await.unwrap();

    let owned_place = repo
        .create_place(test_place(owner.audit.id, "Owned"))
        .await
        .unwrap();
    let guest_place = repo
        .create_place(test_place(guest.audit.id, "Other"))
        .await
        .unwrap();
    // A review the owner wrote elsewhere, and one their place received.
    let outgoing = repo
        .create_review(test_review(owner.audit.id, guest_place.audit.id))
        .await
        .unwrap();
    let incoming = repo
        .create_review(test_review(guest.audit.id, owned_place.audit.id))
        .await
        .unwrap();

    assert!(repo.delete_user(owner.audit.id).await.unwrap());

    assert!(repo.get_place(owned_place.audit.id).await.unwrap().is_none());
    assert!(repo.get_review(outgoing.audit.id).await.unwrap().is_none());
    assert!(repo.get_review(incoming.audit.id).await.unwrap().is_none());
    // The other user's data is untouched.
    assert!(repo.get_place(guest_place.audit.id).await.unwrap().is_some());
}

#[test]
async fn amenity_attach_and_detach_are_idempotent() {
    let repo = MemoryRepository::new();
    let owner = repo.create_user(test_user("owner@example.com")).await.unwrap();
    let place = repo
        .create_place(test_place(owner.audit.id, "Loft"))
        .await
        .unwrap();
    let wifi = repo.create_amenity(test_amenity("wifi")).await.unwrap();

    let attached = repo
        .attach_amenity(place.audit.id, wifi.audit.id)
        .await
        .unwrap();
    assert_eq!(attached.amenity_ids, vec![wifi.audit.id]);

    // Re-attaching does not duplicate the entry.
    let again = repo
        .attach_amenity(place.audit.id, wifi.audit.id)
        .await
        .unwrap();
    assert_eq!(again.amenity_ids, vec![wifi.audit.id]);

    let detached = repo
        .detach_amenity(place.audit.id, wifi.audit.id)
        .await
        .unwrap();
    assert!(detached.amenity_ids.is_empty());

    // Detaching an unattached amenity is a no-op, not an error.
    let still_empty = repo
        .detach_amenity(place.audit.id, wifi.audit.id)
        .await
        .unwrap();
    assert!(still_empty.amenity_ids.is_empty());
}

#[test]
async fn attach_with_a_missing_side_is_not_found() {
    let repo = MemoryRepository::new();
    let owner = repo.create_user(test_user("owner@example.com")).await.unwrap();
    let place = repo
        .create_place(test_place(owner.audit.id, "Loft"))
        .await
        .unwrap();
    let wifi = repo.create_amenity(test_amenity("wifi")).await.unwrap();

    let err = repo
        .attach_amenity(place.audit.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert_eq!(err, RepoError::NotFound);

    let err = repo
        .attach_amenity(Uuid::new_v4(), wifi.audit.id)
        .await
        .unwrap_err();
    assert_eq!(err, RepoError::NotFound);
}

#[test]
async fn duplicate_amenity_name_is_a_conflict() {
    let repo = MemoryRepository::new();
    repo.create_amenity(test_amenity("wifi")).await.unwrap();

    let err = repo.create_amenity(test_amenity("wifi")).await.unwrap_err();
    assert_eq!(err, RepoError::Duplicate("amenity_already_exists"));
}

#[test]
async fn deleting_an_amenity_detaches_it_from_places() {
    let repo = MemoryRepository::new();
    let owner = repo.create_user(test_user("owner@example.com")).await.unwrap();
    let place = repo
        .create_place(test_place(owner.audit.id, "Loft"))
        .await
        .unwrap();
    let wifi = repo.create_amenity(test_amenity("wifi")).await.unwrap();
    repo.attach_amenity(place.audit.id, wifi.audit.id)
        .await
        .unwrap();

    assert!(repo.delete_amenity(wifi.audit.id).await.unwrap());

    let place = repo.get_place(place.audit.id).await.unwrap().unwrap();
    assert!(place.amenity_ids.is_empty());
}

#[test]
async fn partial_place_update_only_touches_provided_fields() {
    let repo = MemoryRepository::new();
    let owner = repo.create_user(test_user("owner@example.com")).await.unwrap();
    let place = repo
        .create_place(test_place(owner.audit.id, "Loft"))
        .await
        .unwrap();

    let updated = repo
        .update_place(
            place.audit.id,
            UpdatePlaceRequest {
                price_per_night: Some(200),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.price_per_night, 200);
    assert_eq!(updated.name, "Loft");
    assert_eq!(updated.city, "Lisbon");
    assert_eq!(updated.owner_id, owner.audit.id);
}
