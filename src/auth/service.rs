use tracing::{info, warn};

use crate::auth::password::Hasher;
use crate::auth::store::{CreateUserOutcome, CredentialStore};

/// Per-operation failures. Validation errors abort the operation before any
/// store access; `Internal` wraps store or hasher faults. None of these are
/// fatal to the interactive loop.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("username cannot be empty")]
    EmptyUsername,
    #[error("password cannot be empty")]
    EmptyPassword,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, PartialEq, Eq)]
pub enum RegisterOutcome {
    Registered,
    UsernameTaken,
}

/// Unknown usernames and wrong passwords are reported as distinct outcomes.
/// This leaks whether a username exists; accepted for a local single-user
/// tool.
#[derive(Debug, PartialEq, Eq)]
pub enum LoginOutcome {
    LoggedIn,
    UserNotFound,
    InvalidCredentials,
}

fn validate(username: &str, password: &str) -> Result<(), AuthError> {
    if username.is_empty() {
        return Err(AuthError::EmptyUsername);
    }
    if password.is_empty() {
        return Err(AuthError::EmptyPassword);
    }
    Ok(())
}

/// Hashes the password and inserts the record; a duplicate username is a
/// normal outcome resolved atomically by the store's unique constraint.
pub async fn register(
    store: &dyn CredentialStore,
    hasher: &dyn Hasher,
    username: &str,
    password: &str,
) -> Result<RegisterOutcome, AuthError> {
    validate(username, password)?;

    let digest = hasher.hash(password)?;
    match store.create_user(username, &digest).await? {
        CreateUserOutcome::Created => {
            info!(username = %username, "user registered");
            Ok(RegisterOutcome::Registered)
        }
        CreateUserOutcome::UsernameTaken => {
            warn!(username = %username, "registration with taken username");
            Ok(RegisterOutcome::UsernameTaken)
        }
    }
}

/// Looks up the stored digest and verifies the candidate password against it.
pub async fn login(
    store: &dyn CredentialStore,
    hasher: &dyn Hasher,
    username: &str,
    password: &str,
) -> Result<LoginOutcome, AuthError> {
    validate(username, password)?;

    let Some(user) = store.find_user(username).await? else {
        warn!(username = %username, "login with unknown username");
        return Ok(LoginOutcome::UserNotFound);
    };

    if hasher.verify(password, &user.password_hash) {
        info!(username = %username, "user logged in");
        Ok(LoginOutcome::LoggedIn)
    } else {
        warn!(username = %username, "login with invalid password");
        Ok(LoginOutcome::InvalidCredentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::BcryptHasher;
    use crate::auth::store::UserRecord;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory store mirroring the uniqueness semantics of the users table.
    #[derive(Default)]
    struct MemoryStore {
        users: Mutex<HashMap<String, String>>,
        calls: AtomicUsize,
    }

    impl MemoryStore {
        fn store_calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CredentialStore for MemoryStore {
        async fn create_user(
            &self,
            username: &str,
            password_hash: &str,
        ) -> anyhow::Result<CreateUserOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut users = self.users.lock().unwrap();
            if users.contains_key(username) {
                return Ok(CreateUserOutcome::UsernameTaken);
            }
            users.insert(username.to_string(), password_hash.to_string());
            Ok(CreateUserOutcome::Created)
        }

        async fn find_user(&self, username: &str) -> anyhow::Result<Option<UserRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let users = self.users.lock().unwrap();
            Ok(users.get(username).map(|hash| UserRecord {
                username: username.to_string(),
                password_hash: hash.clone(),
            }))
        }
    }

    fn hasher() -> BcryptHasher {
        BcryptHasher::new(4)
    }

    #[tokio::test]
    async fn register_then_login_succeeds() {
        let store = MemoryStore::default();
        let h = hasher();
        let out = register(&store, &h, "alice", "s3cret").await.unwrap();
        assert_eq!(out, RegisterOutcome::Registered);
        let out = login(&store, &h, "alice", "s3cret").await.unwrap();
        assert_eq!(out, LoginOutcome::LoggedIn);
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_invalid_credentials() {
        let store = MemoryStore::default();
        let h = hasher();
        register(&store, &h, "alice", "s3cret").await.unwrap();
        let out = login(&store, &h, "alice", "wrong").await.unwrap();
        assert_eq!(out, LoginOutcome::InvalidCredentials);
    }

    #[tokio::test]
    async fn duplicate_registration_is_username_taken() {
        let store = MemoryStore::default();
        let h = hasher();
        let first = register(&store, &h, "alice", "s3cret").await.unwrap();
        assert_eq!(first, RegisterOutcome::Registered);
        let second = register(&store, &h, "alice", "anything").await.unwrap();
        assert_eq!(second, RegisterOutcome::UsernameTaken);
    }

    #[tokio::test]
    async fn login_on_unknown_username_is_not_found() {
        let store = MemoryStore::default();
        let out = login(&store, &hasher(), "bob", "x").await.unwrap();
        assert_eq!(out, LoginOutcome::UserNotFound);
    }

    #[tokio::test]
    async fn empty_inputs_are_rejected_before_store_access() {
        let store = MemoryStore::default();
        let h = hasher();

        let err = register(&store, &h, "", "s3cret").await.unwrap_err();
        assert!(matches!(err, AuthError::EmptyUsername));
        let err = register(&store, &h, "alice", "").await.unwrap_err();
        assert!(matches!(err, AuthError::EmptyPassword));
        let err = login(&store, &h, "", "s3cret").await.unwrap_err();
        assert!(matches!(err, AuthError::EmptyUsername));
        let err = login(&store, &h, "alice", "").await.unwrap_err();
        assert!(matches!(err, AuthError::EmptyPassword));

        assert_eq!(store.store_calls(), 0);
    }

    #[tokio::test]
    async fn store_keeps_digest_not_plaintext() {
        let store = MemoryStore::default();
        let h = hasher();
        register(&store, &h, "alice", "s3cret").await.unwrap();
        let record = store.find_user("alice").await.unwrap().unwrap();
        assert_ne!(record.password_hash, "s3cret");
        assert!(record.password_hash.starts_with("$2"));
    }

    #[tokio::test]
    async fn usernames_are_case_sensitive() {
        let store = MemoryStore::default();
        let h = hasher();
        register(&store, &h, "alice", "s3cret").await.unwrap();
        let out = login(&store, &h, "Alice", "s3cret").await.unwrap();
        assert_eq!(out, LoginOutcome::UserNotFound);
    }

    #[tokio::test]
    async fn full_interactive_scenario() {
        let store = MemoryStore::default();
        let h = hasher();

        assert_eq!(
            register(&store, &h, "alice", "s3cret").await.unwrap(),
            RegisterOutcome::Registered
        );
        assert_eq!(
            login(&store, &h, "alice", "s3cret").await.unwrap(),
            LoginOutcome::LoggedIn
        );
        assert_eq!(
            login(&store, &h, "alice", "wrong").await.unwrap(),
            LoginOutcome::InvalidCredentials
        );
        assert_eq!(
            register(&store, &h, "alice", "anything").await.unwrap(),
            RegisterOutcome::UsernameTaken
        );
        assert_eq!(
            login(&store, &h, "bob", "x").await.unwrap(),
            LoginOutcome::UserNotFound
        );
    }
}
