// Routing is segregated by required privilege so access control is applied
// explicitly at the module level: anonymous reads and registration, bearer-
// credential mutations, and admin-only catalog management. The authenticated
// and admin routers are both wrapped by the auth middleware in `create_router`;
// ownership and admin rules are then enforced per handler via the policy
// module against freshly fetched entities.

/// Routes accessible to all clients (reads, registration, login).
pub mod public;

/// Routes requiring a valid bearer credential.
pub mod authenticated;

/// Routes whose handlers additionally require the admin role.
pub mod admin;
