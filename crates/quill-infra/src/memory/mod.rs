//! In-memory repositories - used when no database is configured and in tests.
//!
//! Note: Data is lost on process restart.

mod categories;
mod posts;
mod users;

pub use categories::InMemoryCategoryRepository;
pub use posts::InMemoryPostRepository;
pub use users::InMemoryUserRepository;
