use sqlx::mysql::{MySqlConnectOptions, MySqlDatabaseError, MySqlPoolOptions};
use sqlx::MySqlPool;
use tracing::{debug, info};

use crate::config::DbConfig;

// MySQL server error numbers surfaced on connect.
const ER_ACCESS_DENIED_ERROR: u16 = 1045;
const ER_BAD_DB_ERROR: u16 = 1049;

/// Connection failures, classified for a distinct user-facing diagnostic.
/// All variants are fatal: the tool reports and exits, no retry.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("database '{0}' does not exist; create it and rerun (e.g. CREATE DATABASE {0};)")]
    DatabaseMissing(String),
    #[error("access denied: check your username/password")]
    AccessDenied,
    #[error("database connection error: {0}")]
    Other(#[source] sqlx::Error),
}

/// Opens the connection pool used for the lifetime of the process.
///
/// A single connection is enough: one interactive operation runs at a time.
pub async fn connect(config: &DbConfig) -> Result<MySqlPool, ConnectError> {
    let mut options = MySqlConnectOptions::new()
        .host(&config.host)
        .username(&config.user)
        .database(&config.database);
    if let Some(password) = &config.password {
        options = options.password(password);
    }

    let pool = MySqlPoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(|e| classify(e, &config.database))?;

    info!(host = %config.host, database = %config.database, "connected to database");
    Ok(pool)
}

fn classify(err: sqlx::Error, database: &str) -> ConnectError {
    if let sqlx::Error::Database(db_err) = &err {
        if let Some(mysql_err) = db_err.try_downcast_ref::<MySqlDatabaseError>() {
            return match mysql_err.number() {
                ER_BAD_DB_ERROR => ConnectError::DatabaseMissing(database.to_string()),
                ER_ACCESS_DENIED_ERROR => ConnectError::AccessDenied,
                _ => ConnectError::Other(err),
            };
        }
    }
    ConnectError::Other(err)
}

// Usernames are case-sensitive identifiers, so the key column needs a binary
// collation; MySQL's default collation would fold `Alice` and `alice`
// together in both the uniqueness check and lookups.
const CREATE_USERS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        username VARCHAR(255) CHARACTER SET utf8mb4 COLLATE utf8mb4_bin PRIMARY KEY,
        password_hash VARCHAR(255) NOT NULL
    )
"#;

/// Creates the users table if absent. Safe to call on every startup; leaves
/// existing data untouched.
pub async fn ensure_schema(pool: &MySqlPool) -> anyhow::Result<()> {
    sqlx::query(CREATE_USERS_TABLE).execute(pool).await?;
    debug!("users table ensured");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn users_table_uses_binary_collation_for_usernames() {
        // Case-sensitive usernames depend on a binary collation on the key
        // column rather than the server default.
        assert!(CREATE_USERS_TABLE.contains("COLLATE utf8mb4_bin"));
        assert!(CREATE_USERS_TABLE.contains("PRIMARY KEY"));
    }

    #[test]
    fn connect_error_messages_are_distinct() {
        let missing = ConnectError::DatabaseMissing("login_db".into()).to_string();
        let denied = ConnectError::AccessDenied.to_string();
        assert!(missing.contains("login_db"));
        assert!(missing.contains("does not exist"));
        assert!(denied.contains("access denied"));
        assert_ne!(missing, denied);
    }
}
