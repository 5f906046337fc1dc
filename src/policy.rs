use uuid::Uuid;

use crate::error::ApiError;

/// Actor
///
/// The party making a request, as resolved from the bearer credential (or the
/// lack of one). Handlers build this per request; it is never cached across
/// requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Anonymous,
    Known { id: Uuid, is_admin: bool },
}

impl Actor {
    fn id(&self) -> Option<Uuid> {
        match self {
            Actor::Anonymous => None,
            Actor::Known { id, .. } => Some(*id),
        }
    }
}

/// Decision
///
/// Outcome of a policy check. `Unauthorized` means no valid actor was
/// presented; `Forbidden` means the actor is authenticated but lacks rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Forbidden,
    Unauthorized,
}

impl Decision {
    /// Converts the decision into a handler-level result, attaching the given
    /// reason to the forbidden case.
    pub fn require(self, reason: &'static str) -> Result<(), ApiError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Forbidden => Err(ApiError::Forbidden(reason)),
            Decision::Unauthorized => Err(ApiError::Unauthorized),
        }
    }
}

fn self_or_admin(actor: Actor, subject: Uuid) -> Decision {
    match actor {
        Actor::Anonymous => Decision::Unauthorized,
        Actor::Known { id, is_admin } if is_admin || id == subject => Decision::Allow,
        Actor::Known { .. } => Decision::Forbidden,
    }
}

/// Update or delete of a user record: the user themself or an admin.
pub fn modify_user(actor: Actor, target_id: Uuid) -> Decision {
    self_or_admin(actor, target_id)
}

/// Place creation: any authenticated actor (who becomes the owner).
pub fn create_place(actor: Actor) -> Decision {
    match actor {
        Actor::Anonymous => Decision::Unauthorized,
        Actor::Known { .. } => Decision::Allow,
    }
}

/// Place update, delete, and amenity attach/detach: the owner or an admin.
pub fn modify_place(actor: Actor, owner_id: Uuid) -> Decision {
    self_or_admin(actor, owner_id)
}

/// Amenity create/update/delete: admin only.
pub fn modify_amenity(actor: Actor) -> Decision {
    match actor {
        Actor::Anonymous => Decision::Unauthorized,
        Actor::Known { is_admin: true, .. } => Decision::Allow,
        Actor::Known { .. } => Decision::Forbidden,
    }
}

/// Review creation: any authenticated actor except the place's own owner.
/// Admins are not exempt from the no-self-review rule; the duplicate-review
/// rule is a uniqueness conflict handled by the repository, not policy.
pub fn create_review(actor: Actor, place_owner_id: Uuid) -> Decision {
    match actor.id() {
        None => Decision::Unauthorized,
        Some(id) if id == place_owner_id => Decision::Forbidden,
        Some(_) => Decision::Allow,
    }
}

/// Review text edit: the author only. Admins may delete but not rewrite.
pub fn update_review(actor: Actor, author_id: Uuid) -> Decision {
    match actor.id() {
        None => Decision::Unauthorized,
        Some(id) if id == author_id => Decision::Allow,
        Some(_) => Decision::Forbidden,
    }
}

/// Review delete: the author or an admin.
pub fn delete_review(actor: Actor, author_id: Uuid) -> Decision {
    self_or_admin(actor, author_id)
}
