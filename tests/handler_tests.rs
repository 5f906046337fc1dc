use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use staylist::{
    AppConfig, AppState,
    auth::AuthUser,
    handlers,
    models::{
        Audit, CreateAmenityRequest, CreatePlaceRequest, CreateReviewRequest, LoginRequest,
        RegisterUserRequest, UpdatePlaceRequest, UpdateReviewRequest, UpdateUserRequest, User,
    },
    repository::{MemoryRepository, Repository},
};
use std::sync::Arc;
use tokio::test;
use uuid::Uuid;

// --- Test Utilities ---

// Handlers are exercised directly against the in-memory backend: the same
// state shape the running server uses, minus the HTTP layer.
fn create_test_state() -> AppState {
    AppState {
        repo: Arc::new(MemoryRepository::new()),
        config: AppConfig::default(),
    }
}

async fn seed_user(state: &AppState, email: &str, is_admin: bool) -> User {
    state
        .repo
        .create_user(User {
            audit: Audit::stamp(),
            first_name: "Seed".to_string(),
            last_name: "User".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$placeholder$placeholder".to_string(),
            is_admin,
        })
        .await
        .expect("failed to seed user")
}

fn auth(user: &User) -> AuthUser {
    AuthUser {
        id: user.audit.id,
        is_admin: user.is_admin,
    }
}

async fn seed_place(state: &AppState, owner: &User) -> Uuid {
    let (status, Json(place)) = handlers::create_place(
        auth(owner),
        State(state.clone()),
        Json(CreatePlaceRequest {
            name: "Canal House".to_string(),
            city: "Amsterdam".to_string(),
            price_per_night: 150,
            description: None,
            latitude: None,
            longitude: None,
        }),
    )
    .await
    .expect("failed to seed place");
    assert_eq!(status, StatusCode::CREATED);
    place.id
}

fn review_payload(place_id: Uuid) -> Json<CreateReviewRequest> {
    Json(CreateReviewRequest {
        text: "Great location".to_string(),
        place_id,
    })
}

// --- Place Ownership ---

#[test]
async fn place_update_by_non_owner_is_forbidden() {
    let state = create_test_state();
    let owner = seed_user(&state, "owner@example.com", false).await;
    let other = seed_user(&state, "other@example.com", false).await;
    let place_id = seed_place(&state, &owner).await;

    let payload = UpdatePlaceRequest {
        name: Some("Taken Over".to_string()),
        ..Default::default()
    };

    let err = handlers::update_place(
        auth(&other),
        State(state.clone()),
        Path(place_id),
        Json(payload.clone()),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);

    // The owner performing the identical update succeeds.
    let Json(updated) = handlers::update_place(
        auth(&owner),
        State(state.clone()),
        Path(place_id),
        Json(payload),
    )
    .await
    .unwrap();
    assert_eq!(updated.name, "Taken Over");
}

#[test]
async fn place_update_by_admin_succeeds() {
    let state = create_test_state();
    let owner = seed_user(&state, "owner@example.com", false).await;
    let admin = seed_user(&state, "admin@example.com", true).await;
    let place_id = seed_place(&state, &owner).await;

    let Json(updated) = handlers::update_place(
        auth(&admin),
        State(state.clone()),
        Path(place_id),
        Json(UpdatePlaceRequest {
            price_per_night: Some(99),
            ..Default::default()
        }),
    )
    .await
    .unwrap();
    assert_eq!(updated.price_per_night, 99);
    // Ownership is untouched by an admin edit.
    assert_eq!(updated.owner_id, owner.audit.id);
}

#[test]
async fn place_delete_checks_owner_before_removing() {
    let state = create_test_state();
    let owner = seed_user(&state, "owner@example.com", false).await;
    let other = seed_user(&state, "other@example.com", false).await;
    let place_id = seed_place(&state, &owner).await;

    let err = handlers::delete_place(auth(&other), State(state.clone()), Path(place_id))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);

    let status = handlers::delete_place(auth(&owner), State(state.clone()), Path(place_id))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[test]
async fn missing_place_is_not_found_before_any_authorization() {
    let state = create_test_state();
    let someone = seed_user(&state, "someone@example.com", false).await;

    let err = handlers::update_place(
        auth(&someone),
        State(state.clone()),
        Path(Uuid::new_v4()),
        Json(UpdatePlaceRequest::default()),
    )
    .await
    .unwrap_err();
    // 404, not 403: absence is reported regardless of who asks.
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}

// --- Review Rules ---

#[test]
async fn owner_cannot_review_their_own_place() {
    let state = create_test_state();
    let owner = seed_user(&state, "owner@example.com", false).await;
    let place_id = seed_place(&state, &owner).await;

    let err = handlers::create_review(auth(&owner), State(state.clone()), review_payload(place_id))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);
    assert_eq!(err.to_string(), "self_review_forbidden");
}

#[test]
async fn second_review_of_the_same_place_is_a_conflict() {
    let state = create_test_state();
    let owner = seed_user(&state, "owner@example.com", false).await;
    let guest = seed_user(&state, "guest@example.com", false).await;
    let place_id = seed_place(&state, &owner).await;

    let (status, _) =
        handlers::create_review(auth(&guest), State(state.clone()), review_payload(place_id))
            .await
            .unwrap();
    assert_eq!(status, StatusCode::CREATED);

    let err =
        handlers::create_review(auth(&guest), State(state.clone()), review_payload(place_id))
            .await
            .unwrap_err();
    assert_eq!(err.status(), StatusCode::CONFLICT);
    assert_eq!(err.to_string(), "duplicate_review");
}

#[test]
async fn review_text_can_only_be_edited_by_its_author() {
    let state = create_test_state();
    let owner = seed_user(&state, "owner@example.com", false).await;
    let guest = seed_user(&state, "guest@example.com", false).await;
    let admin = seed_user(&state, "admin@example.com", true).await;
    let place_id = seed_place(&state, &owner).await;

    let (_, Json(review)) =
        handlers::create_review(auth(&guest), State(state.clone()), review_payload(place_id))
            .await
            .unwrap();

    let edit = Json(UpdateReviewRequest {
        text: Some("Edited".to_string()),
    });

    // Not even an admin may rewrite someone else's review.
    let err = handlers::update_review(
        auth(&admin),
        State(state.clone()),
        Path(review.id),
        edit.clone(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);

    let Json(updated) =
        handlers::update_review(auth(&guest), State(state.clone()), Path(review.id), edit)
            .await
            .unwrap();
    assert_eq!(updated.text, "Edited");
    assert!(updated.updated_at >= review.updated_at);
}

#[test]
async fn blank_review_edit_is_nothing_to_update() {
    let state = create_test_state();
    let owner = seed_user(&state, "owner@example.com", false).await;
    let guest = seed_user(&state, "guest@example.com", false).await;
    let place_id = seed_place(&state, &owner).await;

    let (_, Json(review)) =
        handlers::create_review(auth(&guest), State(state.clone()), review_payload(place_id))
            .await
            .unwrap();

    let err = handlers::update_review(
        auth(&guest),
        State(state.clone()),
        Path(review.id),
        Json(UpdateReviewRequest {
            text: Some("   ".to_string()),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert_eq!(err.to_string(), "nothing_to_update");
}

#[test]
async fn review_delete_is_author_or_admin() {
    let state = create_test_state();
    let owner = seed_user(&state, "owner@example.com", false).await;
    let guest = seed_user(&state, "guest@example.com", false).await;
    let bystander = seed_user(&state, "bystander@example.com", false).await;
    let admin = seed_user(&state, "admin@example.com", true).await;
    let place_id = seed_place(&state, &owner).await;

    let (_, Json(review)) =
        handlers::create_review(auth(&guest), State(state.clone()), review_payload(place_id))
            .await
            .unwrap();

    let err = handlers::delete_review(auth(&bystander), State(state.clone()), Path(review.id))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);

    let status = handlers::delete_review(auth(&admin), State(state.clone()), Path(review.id))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);
}

// --- Amenity Administration ---

#[test]
async fn amenity_creation_requires_the_admin_role() {
    let state = create_test_state();
    let student = seed_user(&state, "student@example.com", false).await;
    let admin = seed_user(&state, "admin@example.com", true).await;

    let payload = CreateAmenityRequest {
        name: "wifi".to_string(),
        description: None,
    };

    let err = handlers::create_amenity(
        auth(&student),
        State(state.clone()),
        Json(payload.clone()),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);

    let (status, Json(created)) =
        handlers::create_amenity(auth(&admin), State(state.clone()), Json(payload))
            .await
            .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created.name, "wifi");
}

// --- User Registration & Profiles ---

#[test]
async fn duplicate_registration_is_a_conflict() {
    let state = create_test_state();

    let payload = RegisterUserRequest {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        password: "difference engine".to_string(),
    };

    let (status, _) = handlers::register_user(State(state.clone()), Json(payload.clone()))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);

    let err = handlers::register_user(State(state.clone()), Json(payload))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::CONFLICT);
    assert_eq!(err.to_string(), "email_already_exists");
}

#[test]
async fn registration_normalizes_email_case() {
    let state = create_test_state();

    let (_, Json(created)) = handlers::register_user(
        State(state.clone()),
        Json(RegisterUserRequest {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "Ada@Example.COM".to_string(),
            password: "difference engine".to_string(),
        }),
    )
    .await
    .unwrap();
    assert_eq!(created.email, "ada@example.com");

    // The differently-cased duplicate hits the same uniqueness rule.
    let err = handlers::register_user(
        State(state.clone()),
        Json(RegisterUserRequest {
            first_name: "Eve".to_string(),
            last_name: "Impostor".to_string(),
            email: "ADA@example.com".to_string(),
            password: "difference engine".to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::CONFLICT);
}

#[test]
async fn serialized_users_never_expose_password_material() {
    let state = create_test_state();

    let (_, Json(created)) = handlers::register_user(
        State(state.clone()),
        Json(RegisterUserRequest {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password: "difference engine".to_string(),
        }),
    )
    .await
    .unwrap();

    let single = serde_json::to_value(&created).unwrap();
    for key in single.as_object().unwrap().keys() {
        assert!(!key.contains("password"), "leaked field: {key}");
    }

    let Json(listed) = handlers::get_users(State(state.clone())).await.unwrap();
    let list = serde_json::to_value(&listed).unwrap();
    for item in list.as_array().unwrap() {
        for key in item.as_object().unwrap().keys() {
            assert!(!key.contains("password"), "leaked field: {key}");
        }
    }
}

#[test]
async fn profile_update_is_self_or_admin() {
    let state = create_test_state();
    let user = seed_user(&state, "user@example.com", false).await;
    let other = seed_user(&state, "other@example.com", false).await;

    let rename = Json(UpdateUserRequest {
        first_name: Some("Changed".to_string()),
        ..Default::default()
    });

    let err = handlers::update_user(
        auth(&other),
        State(state.clone()),
        Path(user.audit.id),
        rename.clone(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);

    let Json(updated) = handlers::update_user(
        auth(&user),
        State(state.clone()),
        Path(user.audit.id),
        rename,
    )
    .await
    .unwrap();
    assert_eq!(updated.first_name, "Changed");
}

// --- Login ---

#[test]
async fn login_failures_are_indistinguishable() {
    let state = create_test_state();

    handlers::register_user(
        State(state.clone()),
        Json(RegisterUserRequest {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password: "difference engine".to_string(),
        }),
    )
    .await
    .unwrap();

    let wrong_password = handlers::login(
        State(state.clone()),
        Json(LoginRequest {
            email: "ada@example.com".to_string(),
            password: "wrong password".to_string(),
        }),
    )
    .await
    .unwrap_err();

    let unknown_email = handlers::login(
        State(state.clone()),
        Json(LoginRequest {
            email: "nobody@example.com".to_string(),
            password: "whatever password".to_string(),
        }),
    )
    .await
    .unwrap_err();

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    // Identical machine-readable reason: no account enumeration.
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    assert_eq!(wrong_password.to_string(), "invalid_credentials");
}

#[test]
async fn successful_login_returns_a_token() {
    let state = create_test_state();

    handlers::register_user(
        State(state.clone()),
        Json(RegisterUserRequest {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password: "difference engine".to_string(),
        }),
    )
    .await
    .unwrap();

    let Json(response) = handlers::login(
        State(state.clone()),
        Json(LoginRequest {
            // Login accepts any casing of the registered email.
            email: "Ada@example.com".to_string(),
            password: "difference engine".to_string(),
        }),
    )
    .await
    .unwrap();
    assert!(!response.access_token.is_empty());
}
