//! Application services - the operations the HTTP layer exposes.

mod accounts;
mod categories;
mod posts;

pub use accounts::{AccountService, Registration, Session, mask_email};
pub use categories::CategoryService;
pub use posts::{ListPostsQuery, PostInput, PostService};
