// Per-resource endpoint logic. Every handler follows the same order:
// validate payload shape, resolve the actor, fetch the target (absence is a
// 404 before any authorization), apply the policy, call the repository, map
// domain outcomes, serialize through the allow-listed response schemas.

pub mod amenities;
pub mod auth;
pub mod places;
pub mod reviews;
pub mod users;

pub use amenities::*;
pub use auth::*;
pub use places::*;
pub use reviews::*;
pub use users::*;
