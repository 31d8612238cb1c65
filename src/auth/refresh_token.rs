/// Refresh Token Model and Policy
///
/// Refresh tokens are:
/// - Cryptographically secure random 64-character strings
/// - Stored by value and looked up by value
/// - Revocable, with a fixed 60-day lifetime
/// - Never physically deleted (revocation sets a timestamp, records are kept)
///
/// Persistence lives behind `storage::RefreshTokenStore`; this module owns
/// generation, the record shape, and the usability state machine.

use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use uuid::Uuid;

const REFRESH_TOKEN_LENGTH: usize = 64;

/// Fixed refresh-token lifetime
pub const REFRESH_TOKEN_LIFETIME_DAYS: i64 = 60;

/// Generate a new cryptographically secure refresh token
///
/// Creates a 64-character random token from the alphanumeric alphabet.
pub fn generate_refresh_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(REFRESH_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Expiry instant for a refresh token issued now
pub fn refresh_token_expiry() -> DateTime<Utc> {
    Utc::now() + Duration::days(REFRESH_TOKEN_LIFETIME_DAYS)
}

/// A persisted refresh-token record
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredRefreshToken {
    pub value: String,
    pub subject_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

/// Usability state of a refresh token
///
/// `Expired` and `Revoked` are terminal; nothing transitions back to `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTokenState {
    Active,
    Expired,
    Revoked,
}

impl StoredRefreshToken {
    /// Classify the token at instant `now`
    ///
    /// Expiry takes precedence over revocation: a token that is both past
    /// its expiry and revoked reports `Expired`.
    pub fn state(&self, now: DateTime<Utc>) -> RefreshTokenState {
        if now >= self.expires_at {
            return RefreshTokenState::Expired;
        }
        if self.revoked_at.is_some() {
            return RefreshTokenState::Revoked;
        }
        RefreshTokenState::Active
    }

    /// A token is usable iff it is still `Active`
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.state(now) == RefreshTokenState::Active
    }
}
