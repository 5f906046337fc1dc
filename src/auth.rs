use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::AppConfig, error::ApiError, models::User, policy::Actor, repository::RepositoryState,
};

/// Claims
///
/// Payload of the signed identity token. `sub` is the user id; `is_admin` is
/// computed at issuance as the stored flag OR membership in the configured
/// admin allow-list.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub is_admin: bool,
    /// Issued-at, seconds since the epoch.
    pub iat: usize,
    /// Expiry, seconds since the epoch. Always validated on decode.
    pub exp: usize,
}

/// Signs an identity token for a freshly authenticated user.
pub fn issue_token(user: &User, config: &AppConfig) -> Result<String, ApiError> {
    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: user.audit.id,
        is_admin: user.is_admin || config.is_admin_email(&user.email),
        iat: now,
        exp: now + config.token_ttl_secs as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))
}

/// AuthUser
///
/// The resolved identity of an authenticated request: the output of the
/// extractor below, consumed by handlers for every authorization check.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub is_admin: bool,
}

impl AuthUser {
    /// The policy-layer view of this identity.
    pub fn actor(&self) -> Actor {
        Actor::Known {
            id: self.id,
            is_admin: self.is_admin,
        }
    }
}

/// AuthUser extractor
///
/// Bearer-token authentication as a request extractor: strip the
/// `Authorization: Bearer` prefix, decode and validate the token (expiry
/// included), then confirm against the repository that the user still exists.
/// A token for a deleted user is rejected, and the admin flag is recomputed
/// from the stored record plus the allow-list rather than trusted from the
/// token, so privilege changes take effect on the next request.
///
/// Rejection: 401 with the generic `unauthorized` reason on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized)?;

        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|_| ApiError::Unauthorized)?;

        let user = repo
            .get_user(token_data.claims.sub)
            .await
            .map_err(ApiError::from)?
            .ok_or(ApiError::Unauthorized)?;

        Ok(AuthUser {
            id: user.audit.id,
            is_admin: user.is_admin || config.is_admin_email(&user.email),
        })
    }
}
