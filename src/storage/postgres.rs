/// Postgres-backed stores
///
/// Thin sqlx wrappers over the storage contracts. Identifiers and
/// timestamps are generated application-side; the database enforces
/// uniqueness of emails and refresh-token values.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::StoredRefreshToken;
use crate::error::StoreError;
use crate::storage::{CredentialStore, Message, MessageStore, RefreshTokenStore, User};

pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            is_premium: false,
        };

        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, created_at, updated_at, is_premium)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .bind(user.is_premium)
        .execute(&self.pool)
        .await?;

        Ok(user)
    }

    async fn user_by_email(&self, email: &str) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, created_at, updated_at, is_premium
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound("user".to_string()))
    }

    async fn user_by_id(&self, id: Uuid) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, created_at, updated_at, is_premium
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound("user".to_string()))
    }

    async fn update_credentials(
        &self,
        id: Uuid,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = $1, password_hash = $2, updated_at = $3
            WHERE id = $4
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("user".to_string()));
        }

        self.user_by_id(id).await
    }

    async fn set_premium(&self, id: Uuid, premium: bool) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET is_premium = $1, updated_at = $2
            WHERE id = $3
            "#,
        )
        .bind(premium)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("user".to_string()));
        }

        Ok(())
    }
}

pub struct PgRefreshTokenStore {
    pool: PgPool,
}

impl PgRefreshTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenStore for PgRefreshTokenStore {
    async fn create(
        &self,
        subject_id: Uuid,
        value: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<StoredRefreshToken, StoreError> {
        let record = StoredRefreshToken {
            value: value.to_string(),
            subject_id,
            issued_at: Utc::now(),
            expires_at,
            revoked_at: None,
        };

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (value, subject_id, issued_at, expires_at, revoked_at)
            VALUES ($1, $2, $3, $4, NULL)
            "#,
        )
        .bind(&record.value)
        .bind(record.subject_id)
        .bind(record.issued_at)
        .bind(record.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(record)
    }

    async fn lookup(&self, value: &str) -> Result<StoredRefreshToken, StoreError> {
        sqlx::query_as::<_, StoredRefreshToken>(
            r#"
            SELECT value, subject_id, issued_at, expires_at, revoked_at
            FROM refresh_tokens
            WHERE value = $1
            "#,
        )
        .bind(value)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound("refresh token".to_string()))
    }

    async fn revoke(&self, value: &str) -> Result<(), StoreError> {
        // Affected-row count is deliberately ignored: revoking an absent or
        // already-revoked token is a no-op, not an error
        sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = $1
            WHERE value = $2 AND revoked_at IS NULL
            "#,
        )
        .bind(Utc::now())
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

pub struct PgMessageStore {
    pool: PgPool,
}

impl PgMessageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    async fn create_message(&self, user_id: Uuid, body: &str) -> Result<Message, StoreError> {
        let message = Message {
            id: Uuid::new_v4(),
            body: body.to_string(),
            user_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO messages (id, body, user_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(message.id)
        .bind(&message.body)
        .bind(message.user_id)
        .bind(message.created_at)
        .bind(message.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(message)
    }

    async fn list_messages(&self, author: Option<Uuid>) -> Result<Vec<Message>, StoreError> {
        let messages = match author {
            Some(user_id) => {
                sqlx::query_as::<_, Message>(
                    r#"
                    SELECT id, body, user_id, created_at, updated_at
                    FROM messages
                    WHERE user_id = $1
                    ORDER BY created_at ASC
                    "#,
                )
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Message>(
                    r#"
                    SELECT id, body, user_id, created_at, updated_at
                    FROM messages
                    ORDER BY created_at ASC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(messages)
    }

    async fn message_by_id(&self, id: Uuid) -> Result<Message, StoreError> {
        sqlx::query_as::<_, Message>(
            r#"
            SELECT id, body, user_id, created_at, updated_at
            FROM messages
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound("message".to_string()))
    }

    async fn delete_message(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("message".to_string()));
        }

        Ok(())
    }
}
