//! Domain entities - the core business objects.

mod category;
mod post;
mod user;

pub use category::{Category, CategorySummary, DEFAULT_CATEGORIES};
pub use post::{
    Comment, CommentView, DEFAULT_FEATURED_IMAGE, NewPost, Post, PostFilter, PostKey, PostPatch,
    PostView,
};
pub use user::{AuthorSummary, Role, User};
