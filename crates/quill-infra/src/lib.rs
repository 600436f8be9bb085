//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - In-memory stores and local image storage only
//! - `postgres` - PostgreSQL persistence via SeaORM
//! - `auth` - JWT + Argon2 authentication

pub mod memory;
pub mod storage;

#[cfg(feature = "postgres")]
pub mod database;

#[cfg(feature = "auth")]
pub mod auth;

pub use memory::{InMemoryCategoryRepository, InMemoryPostRepository, InMemoryUserRepository};
pub use storage::LocalImageStore;

#[cfg(feature = "postgres")]
pub use database::{
    DatabaseConfig, PostgresCategoryRepository, PostgresPostRepository, PostgresUserRepository,
};

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
