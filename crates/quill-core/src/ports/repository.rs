use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{AuthorSummary, Category, Comment, Post, PostFilter, User};
use crate::error::RepoError;

/// Generic repository trait shared by every entity store.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity. Unique violations are reported as
    /// [`RepoError::Constraint`].
    async fn insert(&self, entity: T) -> Result<T, RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by email address, password hash included.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Resolve many users to their public summaries. Unknown ids are skipped.
    async fn find_summaries(&self, ids: &[Uuid]) -> Result<Vec<AuthorSummary>, RepoError>;
}

/// Category repository.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    /// All categories, ordered by name.
    async fn list(&self) -> Result<Vec<Category>, RepoError>;

    /// Resolve many categories at once. Unknown ids are skipped.
    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Category>, RepoError>;
}

/// Post repository.
///
/// Every mutation here is a single atomic store operation.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    /// Matching posts, newest first, after skipping `offset` of them.
    async fn list(
        &self,
        filter: &PostFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError>;

    /// Number of posts matching `filter`, ignoring pagination.
    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError>;

    /// Persist the mutable fields of `post` (title, content, excerpt,
    /// category, tags, featured image, updated_at). View count, comments,
    /// author and slug are left as stored.
    async fn update(&self, post: &Post) -> Result<Post, RepoError>;

    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;

    /// Add one to the view counter and return the post as stored afterwards.
    async fn increment_view_count(&self, id: Uuid) -> Result<Post, RepoError>;

    /// Append a comment to the end of the post's comment list.
    async fn push_comment(&self, post_id: Uuid, comment: &Comment) -> Result<(), RepoError>;
}
