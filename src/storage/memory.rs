/// In-memory stores
///
/// A single `MemoryStore` implements every storage contract over plain
/// hash maps, so the whole application can run hermetically in tests.
/// Semantics mirror the Postgres stores, including unique-email and
/// unique-token-value enforcement.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::StoredRefreshToken;
use crate::error::StoreError;
use crate::storage::{CredentialStore, Message, MessageStore, RefreshTokenStore, User};

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<Uuid, User>>,
    refresh_tokens: Mutex<HashMap<String, StoredRefreshToken>>,
    messages: Mutex<HashMap<Uuid, Message>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn guard<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Database("store lock poisoned".to_string()))
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        let mut users = guard(&self.users)?;

        if users.values().any(|u| u.email == email) {
            return Err(StoreError::UniqueViolation(
                "email already registered".to_string(),
            ));
        }

        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            is_premium: false,
        };
        users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn user_by_email(&self, email: &str) -> Result<User, StoreError> {
        let users = guard(&self.users)?;

        users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("user".to_string()))
    }

    async fn user_by_id(&self, id: Uuid) -> Result<User, StoreError> {
        let users = guard(&self.users)?;

        users
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("user".to_string()))
    }

    async fn update_credentials(
        &self,
        id: Uuid,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        let mut users = guard(&self.users)?;

        if users.values().any(|u| u.email == email && u.id != id) {
            return Err(StoreError::UniqueViolation(
                "email already registered".to_string(),
            ));
        }

        let user = users
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound("user".to_string()))?;
        user.email = email.to_string();
        user.password_hash = password_hash.to_string();
        user.updated_at = Utc::now();

        Ok(user.clone())
    }

    async fn set_premium(&self, id: Uuid, premium: bool) -> Result<(), StoreError> {
        let mut users = guard(&self.users)?;

        let user = users
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound("user".to_string()))?;
        user.is_premium = premium;
        user.updated_at = Utc::now();

        Ok(())
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryStore {
    async fn create(
        &self,
        subject_id: Uuid,
        value: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<StoredRefreshToken, StoreError> {
        let mut tokens = guard(&self.refresh_tokens)?;

        if tokens.contains_key(value) {
            return Err(StoreError::UniqueViolation(
                "refresh token value already exists".to_string(),
            ));
        }

        let record = StoredRefreshToken {
            value: value.to_string(),
            subject_id,
            issued_at: Utc::now(),
            expires_at,
            revoked_at: None,
        };
        tokens.insert(record.value.clone(), record.clone());

        Ok(record)
    }

    async fn lookup(&self, value: &str) -> Result<StoredRefreshToken, StoreError> {
        let tokens = guard(&self.refresh_tokens)?;

        tokens
            .get(value)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("refresh token".to_string()))
    }

    async fn revoke(&self, value: &str) -> Result<(), StoreError> {
        let mut tokens = guard(&self.refresh_tokens)?;

        if let Some(record) = tokens.get_mut(value) {
            if record.revoked_at.is_none() {
                record.revoked_at = Some(Utc::now());
            }
        }

        Ok(())
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn create_message(&self, user_id: Uuid, body: &str) -> Result<Message, StoreError> {
        let mut messages = guard(&self.messages)?;

        let message = Message {
            id: Uuid::new_v4(),
            body: body.to_string(),
            user_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        messages.insert(message.id, message.clone());

        Ok(message)
    }

    async fn list_messages(&self, author: Option<Uuid>) -> Result<Vec<Message>, StoreError> {
        let messages = guard(&self.messages)?;

        let mut result: Vec<Message> = messages
            .values()
            .filter(|m| author.map_or(true, |a| m.user_id == a))
            .cloned()
            .collect();
        result.sort_by_key(|m| m.created_at);

        Ok(result)
    }

    async fn message_by_id(&self, id: Uuid) -> Result<Message, StoreError> {
        let messages = guard(&self.messages)?;

        messages
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("message".to_string()))
    }

    async fn delete_message(&self, id: Uuid) -> Result<(), StoreError> {
        let mut messages = guard(&self.messages)?;

        messages
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound("message".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();

        store
            .create_user("user@example.com", "hash1")
            .await
            .expect("Failed to create user");
        let result = store.create_user("user@example.com", "hash2").await;

        assert!(matches!(result, Err(StoreError::UniqueViolation(_))));
    }

    #[tokio::test]
    async fn test_update_credentials_bumps_updated_at() {
        let store = MemoryStore::new();

        let user = store
            .create_user("user@example.com", "hash1")
            .await
            .expect("Failed to create user");
        let updated = store
            .update_credentials(user.id, "new@example.com", "hash2")
            .await
            .expect("Failed to update user");

        assert_eq!(updated.email, "new@example.com");
        assert_eq!(updated.password_hash, "hash2");
        assert!(updated.updated_at >= user.updated_at);
    }

    #[tokio::test]
    async fn test_lookup_unknown_token_is_not_found() {
        let store = MemoryStore::new();

        let result = store.lookup("no-such-token").await;

        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_revoke_sets_timestamp_once() {
        let store = MemoryStore::new();
        let subject = Uuid::new_v4();

        store
            .create(subject, "token-value", Utc::now() + Duration::days(60))
            .await
            .expect("Failed to create token");

        store.revoke("token-value").await.expect("Failed to revoke");
        let first = store
            .lookup("token-value")
            .await
            .expect("Failed to look up token")
            .revoked_at
            .expect("revoked_at should be set");

        // Second revocation leaves the original timestamp in place
        store.revoke("token-value").await.expect("Failed to revoke");
        let second = store
            .lookup("token-value")
            .await
            .expect("Failed to look up token")
            .revoked_at
            .expect("revoked_at should be set");

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_revoke_unknown_token_is_a_no_op() {
        let store = MemoryStore::new();

        assert!(store.revoke("no-such-token").await.is_ok());
    }

    #[tokio::test]
    async fn test_messages_listed_oldest_first() {
        let store = MemoryStore::new();
        let author = Uuid::new_v4();

        for body in ["first", "second", "third"] {
            store
                .create_message(author, body)
                .await
                .expect("Failed to create message");
        }

        let messages = store
            .list_messages(None)
            .await
            .expect("Failed to list messages");
        let bodies: Vec<&str> = messages.iter().map(|m| m.body.as_str()).collect();

        assert_eq!(bodies, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_messages_filtered_by_author() {
        let store = MemoryStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        store
            .create_message(alice, "from alice")
            .await
            .expect("Failed to create message");
        store
            .create_message(bob, "from bob")
            .await
            .expect("Failed to create message");

        let messages = store
            .list_messages(Some(alice))
            .await
            .expect("Failed to list messages");

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].body, "from alice");
    }

    #[tokio::test]
    async fn test_delete_missing_message_is_not_found() {
        let store = MemoryStore::new();

        let result = store.delete_message(Uuid::new_v4()).await;

        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }
}
