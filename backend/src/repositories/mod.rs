//! Database repositories
//!
//! Provides the data access layer. Each store is a trait so the auth core
//! can run against Postgres in production and an in-memory store in tests.

pub mod memory;
pub mod reset_token;
pub mod user;

pub use memory::InMemoryStore;
pub use reset_token::{PgResetTokenStore, ResetToken, ResetTokenStore};
pub use user::{CreateUserError, CredentialStore, NewUser, PgCredentialStore, User};
