/// Session Management
///
/// Orchestrates password verification, access-token minting, and the
/// refresh-token lifecycle. An unknown email and a wrong password produce
/// the same `AuthError::InvalidCredentials`; which one occurred is visible
/// only in the logs.

use std::sync::Arc;

use chrono::Utc;

use crate::auth::jwt::make_jwt;
use crate::auth::password::verify_password;
use crate::auth::refresh_token::{
    generate_refresh_token, refresh_token_expiry, RefreshTokenState,
};
use crate::configuration::AuthSettings;
use crate::error::{AppError, AuthError, StoreError};
use crate::storage::{CredentialStore, RefreshTokenStore, User};

/// Outcome of a successful login
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct SessionManager {
    credentials: Arc<dyn CredentialStore>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    settings: AuthSettings,
}

impl SessionManager {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        settings: AuthSettings,
    ) -> Self {
        Self {
            credentials,
            refresh_tokens,
            settings,
        }
    }

    /// Authenticate a user and open a session
    ///
    /// Verifies the password, mints an access token, and persists a fresh
    /// refresh token with the fixed long lifetime.
    ///
    /// # Errors
    /// * `AuthError::InvalidCredentials` - unknown email or wrong password
    /// * `HashError` (as internal) - the stored hash could not be checked
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let user = match self.credentials.user_by_email(email).await {
            Ok(user) => user,
            Err(StoreError::NotFound(_)) => {
                tracing::warn!("Login attempt with unknown email");
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e.into()),
        };

        let password_valid = verify_password(password, &user.password_hash)?;
        if !password_valid {
            tracing::warn!(user_id = %user.id, "Login attempt with wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        self.start_session(user).await
    }

    /// Open a session for an already-authenticated user
    ///
    /// Mints the access token and persists a fresh refresh token. Login
    /// calls this after password verification; registration calls it for
    /// the user it just created.
    pub async fn start_session(&self, user: User) -> Result<Session, AppError> {
        let access_token = make_jwt(
            &user.id,
            &self.settings.jwt_secret,
            self.settings.access_token_ttl_seconds,
        )?;

        let refresh_token = generate_refresh_token();
        self.refresh_tokens
            .create(user.id, &refresh_token, refresh_token_expiry())
            .await?;

        Ok(Session {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Mint a new access token from a stored refresh token
    ///
    /// The refresh token is read, never rotated or extended. Expiry is
    /// checked before revocation, so a token that is both reports as
    /// expired.
    ///
    /// # Errors
    /// * `AuthError::TokenInvalid` - no such token value
    /// * `AuthError::TokenExpired` - token is past its expiry
    /// * `AuthError::TokenRevoked` - token was revoked
    pub async fn refresh(&self, refresh_token_value: &str) -> Result<String, AppError> {
        let record = match self.refresh_tokens.lookup(refresh_token_value).await {
            Ok(record) => record,
            Err(StoreError::NotFound(_)) => {
                tracing::warn!("Refresh attempt with unknown token");
                return Err(AuthError::TokenInvalid.into());
            }
            Err(e) => return Err(e.into()),
        };

        match record.state(Utc::now()) {
            RefreshTokenState::Expired => {
                tracing::warn!(user_id = %record.subject_id, "Refresh attempt with expired token");
                Err(AuthError::TokenExpired.into())
            }
            RefreshTokenState::Revoked => {
                tracing::warn!(user_id = %record.subject_id, "Refresh attempt with revoked token");
                Err(AuthError::TokenRevoked.into())
            }
            RefreshTokenState::Active => Ok(make_jwt(
                &record.subject_id,
                &self.settings.jwt_secret,
                self.settings.access_token_ttl_seconds,
            )?),
        }
    }

    /// Revoke a refresh token
    ///
    /// Idempotent from the caller's perspective: revoking an already-revoked
    /// or unknown token succeeds.
    pub async fn revoke(&self, refresh_token_value: &str) -> Result<(), AppError> {
        self.refresh_tokens.revoke(refresh_token_value).await?;
        Ok(())
    }
}
