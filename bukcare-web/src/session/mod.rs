//! Per-browser authentication state.
//!
//! The session cookie maps to three entries: the access token, the refresh
//! token and the user serialised as JSON. [`SessionStore`] is the only code
//! that reads or writes them; handlers receive an immutable [`AuthSession`]
//! snapshot.

use crate::models::{Role, UnknownRole, User};
use crate::services::auth_api::AuthTokens;
use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use thiserror::Error;

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const USER_DATA_KEY: &str = "user_data";

const AUTH_KEYS: [&str; 3] = [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_DATA_KEY];

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session storage failure: {0}")]
    Storage(String),

    #[error("failed to serialise session data: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<tower_sessions::session::Error> for SessionError {
    fn from(err: tower_sessions::session::Error) -> Self {
        SessionError::Storage(err.to_string())
    }
}

impl From<SessionError> for service_core::error::AppError {
    fn from(err: SessionError) -> Self {
        service_core::error::AppError::InternalError(anyhow::Error::new(err))
    }
}

/// String key/value storage behind a session.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn read(&self, key: &str) -> Result<Option<String>, SessionError>;
    async fn write(&self, key: &str, value: String) -> Result<(), SessionError>;
    async fn remove(&self, key: &str) -> Result<(), SessionError>;
}

#[async_trait]
impl SessionStorage for tower_sessions::Session {
    async fn read(&self, key: &str) -> Result<Option<String>, SessionError> {
        // A value of another JSON type under our key counts as absent.
        let value = self.get_value(key).await?;
        Ok(value.and_then(|v| v.as_str().map(str::to_string)))
    }

    async fn write(&self, key: &str, value: String) -> Result<(), SessionError> {
        self.insert_value(key, serde_json::Value::String(value))
            .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.remove_value(key).await?;
        Ok(())
    }
}

/// Immutable snapshot of a signed-in user.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub access_token: Secret<String>,
    pub refresh_token: Option<Secret<String>>,
}

impl AuthSession {
    pub fn role(&self) -> Result<Role, UnknownRole> {
        self.user.role()
    }
}

pub struct SessionStore<S> {
    storage: S,
}

impl<S: SessionStorage> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Rebuilds the signed-in user from storage.
    ///
    /// Missing entries mean "not signed in". A user entry that does not parse
    /// is treated as corruption: every auth key is removed and `None` returned.
    pub async fn restore(&self) -> Result<Option<AuthSession>, SessionError> {
        let access_token = self.storage.read(ACCESS_TOKEN_KEY).await?;
        let user_data = self.storage.read(USER_DATA_KEY).await?;

        let (Some(access_token), Some(user_data)) = (access_token, user_data) else {
            return Ok(None);
        };

        let user: User = match serde_json::from_str(&user_data) {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(error = %e, "Stored user data is corrupted, clearing session");
                self.clear().await?;
                return Ok(None);
            }
        };

        let refresh_token = self.storage.read(REFRESH_TOKEN_KEY).await?;

        Ok(Some(AuthSession {
            user,
            access_token: Secret::new(access_token),
            refresh_token: refresh_token.map(Secret::new),
        }))
    }

    pub async fn save(&self, tokens: &AuthTokens, user: &User) -> Result<(), SessionError> {
        let user_data = serde_json::to_string(user)?;

        self.storage
            .write(ACCESS_TOKEN_KEY, tokens.access.expose_secret().clone())
            .await?;
        self.storage
            .write(REFRESH_TOKEN_KEY, tokens.refresh.expose_secret().clone())
            .await?;
        self.storage.write(USER_DATA_KEY, user_data).await?;

        Ok(())
    }

    pub async fn clear(&self) -> Result<(), SessionError> {
        for key in AUTH_KEYS {
            self.storage.remove(key).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory storage for unit tests.
    #[derive(Default)]
    pub struct MemoryStorage {
        entries: Mutex<HashMap<String, String>>,
    }

    impl MemoryStorage {
        pub fn with(entries: &[(&str, &str)]) -> Self {
            let storage = Self::default();
            {
                let mut map = storage.entries.lock().unwrap();
                for (k, v) in entries {
                    map.insert(k.to_string(), v.to_string());
                }
            }
            storage
        }

        pub fn keys(&self) -> Vec<String> {
            let mut keys: Vec<String> = self.entries.lock().unwrap().keys().cloned().collect();
            keys.sort();
            keys
        }

        pub fn get(&self, key: &str) -> Option<String> {
            self.entries.lock().unwrap().get(key).cloned()
        }
    }

    #[async_trait]
    impl SessionStorage for MemoryStorage {
        async fn read(&self, key: &str) -> Result<Option<String>, SessionError> {
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        async fn write(&self, key: &str, value: String) -> Result<(), SessionError> {
            self.entries.lock().unwrap().insert(key.to_string(), value);
            Ok(())
        }

        async fn remove(&self, key: &str) -> Result<(), SessionError> {
            self.entries.lock().unwrap().remove(key);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::MemoryStorage;
    use super::*;

    fn doctor() -> User {
        User {
            id: "5".into(),
            email: "doc@clinic.ph".into(),
            user_type: "doctor".into(),
            first_name: "Maria".into(),
            last_name: "Santos".into(),
        }
    }

    fn tokens() -> AuthTokens {
        AuthTokens {
            access: Secret::new("access-1".into()),
            refresh: Secret::new("refresh-1".into()),
        }
    }

    #[tokio::test]
    async fn save_then_restore() {
        let store = SessionStore::new(MemoryStorage::default());
        store.save(&tokens(), &doctor()).await.unwrap();

        let session = store.restore().await.unwrap().unwrap();
        assert_eq!(session.user, doctor());
        assert_eq!(session.access_token.expose_secret(), "access-1");
        assert_eq!(session.role(), Ok(Role::Doctor));
        assert_eq!(
            store.storage().keys(),
            vec!["access_token", "refresh_token", "user_data"]
        );
    }

    #[tokio::test]
    async fn empty_storage_is_unauthenticated() {
        let store = SessionStore::new(MemoryStorage::default());
        assert!(store.restore().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn token_without_user_is_unauthenticated() {
        let store = SessionStore::new(MemoryStorage::with(&[(ACCESS_TOKEN_KEY, "a")]));
        assert!(store.restore().await.unwrap().is_none());
        assert_eq!(store.storage().get(ACCESS_TOKEN_KEY).as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn corrupted_user_clears_all_keys() {
        let store = SessionStore::new(MemoryStorage::with(&[
            (ACCESS_TOKEN_KEY, "a"),
            (REFRESH_TOKEN_KEY, "r"),
            (USER_DATA_KEY, "{not json"),
        ]));

        assert!(store.restore().await.unwrap().is_none());
        assert!(store.storage().keys().is_empty());
    }

    #[tokio::test]
    async fn clear_removes_auth_keys_only() {
        let store = SessionStore::new(MemoryStorage::with(&[("signup_draft", "{}")]));
        store.save(&tokens(), &doctor()).await.unwrap();
        store.clear().await.unwrap();

        assert_eq!(store.storage().keys(), vec!["signup_draft"]);
    }
}
