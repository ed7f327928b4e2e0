use serde::Deserialize;

/// Connection settings for the backing MySQL database.
///
/// Built once at startup from environment variables and passed by reference
/// into `db::connect`; there is no module-level configuration state.
#[derive(Debug, Clone, Deserialize)]
pub struct DbConfig {
    pub host: String,
    pub user: String,
    /// Left as `None` when `DB_PASSWORD` is unset; the CLI prompts for it
    /// without echo before connecting.
    pub password: Option<String>,
    pub database: String,
}

impl DbConfig {
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("DB_HOST").unwrap_or_else(|_| "localhost".into()),
            user: std::env::var("DB_USER").unwrap_or_else(|_| "root".into()),
            password: std::env::var("DB_PASSWORD").ok(),
            database: std::env::var("DB_NAME").unwrap_or_else(|_| "login_db".into()),
        }
    }
}
