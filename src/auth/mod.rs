pub mod password;
pub mod service;
pub mod store;

pub use password::{BcryptHasher, Hasher};
pub use service::{login, register, AuthError, LoginOutcome, RegisterOutcome};
pub use store::{CredentialStore, MySqlStore};
