//! # Crosspost Infrastructure
//!
//! Concrete implementations of the ports defined in `crosspost-core`:
//! SeaORM repositories over Postgres, functional in-memory repositories used
//! as the no-database fallback and as test fixtures, and the JWT/Argon2
//! authentication services.
//!
//! ## Feature Flags
//!
//! - `postgres` (default) - PostgreSQL repositories via SeaORM
//! - `minimal` - in-memory only, no external database

pub mod auth;
pub mod database;
pub mod memory;

pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
pub use database::DatabaseConfig;
pub use memory::{InMemoryPostRepository, InMemoryPublicationLogRepository, InMemoryUserRepository};

#[cfg(feature = "postgres")]
pub use database::{
    PostgresPostRepository, PostgresPublicationLogRepository, PostgresUserRepository, connect,
};
