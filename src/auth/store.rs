use async_trait::async_trait;
use sqlx::{FromRow, MySqlPool};
use tracing::debug;

/// A stored credential row. The raw password never appears here; only the
/// digest produced by the hasher is persisted.
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub username: String,
    pub password_hash: String,
}

/// Result of an insert attempt. Duplicates are a normal outcome, not an
/// error: the unique constraint decides atomically, with no prior SELECT.
#[derive(Debug, PartialEq, Eq)]
pub enum CreateUserOutcome {
    Created,
    UsernameTaken,
}

/// Durable persistence of user records with username uniqueness.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> anyhow::Result<CreateUserOutcome>;

    /// Pure read; a missing user is `None`, never an error.
    async fn find_user(&self, username: &str) -> anyhow::Result<Option<UserRecord>>;
}

/// Production store over the MySQL pool opened at startup.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for MySqlStore {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> anyhow::Result<CreateUserOutcome> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES (?, ?)
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(CreateUserOutcome::Created),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                debug!(username = %username, "duplicate username on insert");
                Ok(CreateUserOutcome::UsernameTaken)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user(&self, username: &str) -> anyhow::Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT username, password_hash
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}
