use std::io::{BufRead, Write};

use tracing::error;

mod auth;
mod config;
mod db;

use crate::auth::{
    login, register, AuthError, BcryptHasher, CredentialStore, Hasher, LoginOutcome, MySqlStore,
    RegisterOutcome,
};
use crate::config::DbConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "login_cli=warn,sqlx=warn".to_string());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let mut config = DbConfig::from_env();
    if config.password.is_none() {
        config.password = Some(rpassword::prompt_password("MySQL password: ")?);
    }

    println!("=== Simple Login System ===");

    let pool = match db::connect(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    db::ensure_schema(&pool).await?;

    let store = MySqlStore::new(pool.clone());
    let hasher = BcryptHasher::default();

    loop {
        println!("\n1. Register\n2. Login\n3. Exit");
        let Ok(choice) = prompt_line("Choice: ") else {
            break; // stdin closed
        };
        let result = match choice.as_str() {
            "1" => run_register(&store, &hasher).await,
            "2" => run_login(&store, &hasher).await,
            "3" => break,
            _ => {
                println!("❌ Invalid option.");
                Ok(())
            }
        };
        // Per-operation failures are reported and the loop continues; only
        // the initial connection is fatal.
        if let Err(e) = result {
            error!(error = %e, "operation failed");
            println!("❌ Operation failed: {e:#}");
        }
    }

    pool.close().await;
    println!("Goodbye.");
    Ok(())
}

async fn run_register(store: &dyn CredentialStore, hasher: &dyn Hasher) -> anyhow::Result<()> {
    let username = prompt_line("Enter new username: ")?;
    let password = rpassword::prompt_password("Enter new password: ")?;
    match register(store, hasher, &username, password.trim()).await {
        Ok(RegisterOutcome::Registered) => println!("✅ Registration successful."),
        Ok(RegisterOutcome::UsernameTaken) => println!("❌ Username already exists."),
        Err(AuthError::EmptyUsername) => println!("❌ Username cannot be empty."),
        Err(AuthError::EmptyPassword) => println!("❌ Password cannot be empty."),
        Err(AuthError::Internal(e)) => return Err(e),
    }
    Ok(())
}

async fn run_login(store: &dyn CredentialStore, hasher: &dyn Hasher) -> anyhow::Result<()> {
    let username = prompt_line("Username: ")?;
    let password = rpassword::prompt_password("Password: ")?;
    match login(store, hasher, &username, password.trim()).await {
        Ok(LoginOutcome::LoggedIn) => println!("✅ Login successful! Welcome, {username}."),
        Ok(LoginOutcome::UserNotFound) => println!("❌ User not found."),
        Ok(LoginOutcome::InvalidCredentials) => println!("❌ Invalid credentials."),
        Err(AuthError::EmptyUsername) => println!("❌ Username cannot be empty."),
        Err(AuthError::EmptyPassword) => println!("❌ Password cannot be empty."),
        Err(AuthError::Internal(e)) => return Err(e),
    }
    Ok(())
}

fn prompt_line(prompt: &str) -> anyhow::Result<String> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    if std::io::stdin().lock().read_line(&mut line)? == 0 {
        anyhow::bail!("input stream closed");
    }
    Ok(line.trim().to_string())
}
