/// Storage Contracts
///
/// The application talks to persistence through these traits only. The
/// Postgres implementations back the running service; the in-memory ones
/// back hermetic tests. Miss semantics are uniform: a lookup for a record
/// that does not exist fails with `StoreError::NotFound`, and callers
/// decide what a miss means at their boundary.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::StoredRefreshToken;
use crate::error::StoreError;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::{PgCredentialStore, PgMessageStore, PgRefreshTokenStore};

/// A user record
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_premium: bool,
}

/// A message record
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Message {
    pub id: Uuid,
    pub body: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User credential storage
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a new user; fails with `UniqueViolation` if the email is taken
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError>;

    async fn user_by_email(&self, email: &str) -> Result<User, StoreError>;

    async fn user_by_id(&self, id: Uuid) -> Result<User, StoreError>;

    /// Replace a user's email and password hash, bumping `updated_at`
    async fn update_credentials(
        &self,
        id: Uuid,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError>;

    async fn set_premium(&self, id: Uuid, premium: bool) -> Result<(), StoreError>;
}

/// Refresh-token storage, keyed by token value
///
/// Records are never deleted; revocation sets `revoked_at` and keeps the row.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn create(
        &self,
        subject_id: Uuid,
        value: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<StoredRefreshToken, StoreError>;

    async fn lookup(&self, value: &str) -> Result<StoredRefreshToken, StoreError>;

    /// Idempotent: sets `revoked_at` to now if unset; a second call, or a
    /// call for an unknown value, succeeds without effect
    async fn revoke(&self, value: &str) -> Result<(), StoreError>;
}

/// Message storage
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn create_message(&self, user_id: Uuid, body: &str) -> Result<Message, StoreError>;

    /// All messages, oldest first; optionally restricted to one author
    async fn list_messages(&self, author: Option<Uuid>) -> Result<Vec<Message>, StoreError>;

    async fn message_by_id(&self, id: Uuid) -> Result<Message, StoreError>;

    async fn delete_message(&self, id: Uuid) -> Result<(), StoreError>;
}

/// Handle bundle the HTTP layer carries
#[derive(Clone)]
pub struct Stores {
    pub credentials: Arc<dyn CredentialStore>,
    pub refresh_tokens: Arc<dyn RefreshTokenStore>,
    pub messages: Arc<dyn MessageStore>,
}

impl Stores {
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self {
            credentials: Arc::new(PgCredentialStore::new(pool.clone())),
            refresh_tokens: Arc::new(PgRefreshTokenStore::new(pool.clone())),
            messages: Arc::new(PgMessageStore::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            credentials: store.clone(),
            refresh_tokens: store.clone(),
            messages: store,
        }
    }
}
