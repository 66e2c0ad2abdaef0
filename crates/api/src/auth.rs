//! Session tokens and the authenticated-caller extractor.
//!
//! Tokens are HS256 JWTs carrying the staff id, role and station. Handlers
//! take an [`AuthUser`] and turn its [`Actor`] into a station capability.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use domain::{Actor, Role, StaffId, StaffProfile, StationId};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: StaffId,
    pub email: String,
    pub role: Role,
    pub station: Option<StationId>,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn actor(&self) -> Actor {
        Actor::new(self.sub, self.role, self.station)
    }
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

/// Issues and verifies session tokens.
#[derive(Clone)]
pub struct TokenKeys {
    inner: Arc<Keys>,
}

impl TokenKeys {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Keys {
                encoding: EncodingKey::from_secret(secret.as_bytes()),
                decoding: DecodingKey::from_secret(secret.as_bytes()),
                validation: Validation::new(Algorithm::HS256),
                ttl,
            }),
        }
    }

    /// Signs a token for a logged-in staff member.
    pub fn issue(&self, staff: &StaffProfile) -> Result<String, ApiError> {
        let now = Utc::now();
        let claims = Claims {
            sub: staff.id,
            email: staff.details.email.clone(),
            role: staff.details.role,
            station: staff.details.station,
            iat: now.timestamp(),
            exp: (now + self.inner.ttl).timestamp(),
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, ApiError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.inner.encoding)
            .map_err(|e| ApiError::Internal(format!("failed to sign token: {e}")))
    }

    /// Checks the signature and expiry of a token.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        jsonwebtoken::decode::<Claims>(token, &self.inner.decoding, &self.inner.validation)
            .map(|data| data.claims)
    }
}

impl std::fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenKeys")
            .field("ttl", &self.inner.ttl)
            .finish_non_exhaustive()
    }
}

/// The verified caller of a protected route.
///
/// A missing bearer token is rejected with 401, an invalid or expired one
/// with 403.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Actor);

impl<S> FromRequestParts<S> for AuthUser
where
    TokenKeys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::Unauthenticated("Not authorized, no token".to_string()))?;

        let keys = TokenKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|err| {
            tracing::debug!(error = %err, "rejected session token");
            ApiError::Forbidden("Not authorized, token failed".to_string())
        })?;
        Ok(AuthUser(claims.actor()))
    }
}
