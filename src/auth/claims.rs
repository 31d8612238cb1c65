/// JWT Claims structure
///
/// Represents the payload of an access token containing the subject
/// and standard JWT claims (RFC 7519).

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::error::TokenError;

/// JWT Claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Token ID; keeps two tokens minted in the same second distinct
    pub jti: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl Claims {
    /// Create new claims for a user
    ///
    /// # Arguments
    /// * `user_id` - User's UUID
    /// * `ttl_seconds` - Token lifetime in seconds from now
    pub fn new(user_id: Uuid, ttl_seconds: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            jti: Uuid::new_v4().to_string(),
            exp: now + ttl_seconds,
            iat: now,
        }
    }

    /// Extract user ID from claims
    ///
    /// # Errors
    /// Returns a malformed-token error if the subject is not a valid UUID
    pub fn user_id(&self) -> Result<Uuid, TokenError> {
        Uuid::parse_str(&self.sub).map_err(|_| TokenError::Malformed)
    }

    /// Check if the token has expired
    ///
    /// A token is expired at its expiry instant, not one second after.
    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        now >= self.exp
    }
}
