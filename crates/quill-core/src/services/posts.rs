//! Post query engine and mutators.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{
    AuthorSummary, CategorySummary, Comment, CommentView, DEFAULT_FEATURED_IMAGE, NewPost, Post,
    PostFilter, PostKey, PostPatch, PostView,
};
use crate::error::{DomainError, RepoError};
use crate::pagination::{Page, PageRequest, Pagination};
use crate::policy::{self, Action, Actor};
use crate::ports::{CategoryRepository, ImageStore, PostRepository, UserRepository};
use crate::slug;
use crate::validation::{self, EXCERPT_MAX_LEN, TITLE_MAX_LEN};

const SLUG_ATTEMPTS: usize = 3;

/// Raw listing parameters as they arrive from a query string.
#[derive(Debug, Clone, Default)]
pub struct ListPostsQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
}

/// Unvalidated post fields. Creation requires title, content and category;
/// updates validate whichever fields are present.
#[derive(Debug, Clone, Default)]
pub struct PostInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub excerpt: Option<String>,
    pub tags: Option<Vec<String>>,
    /// Filename of an image already placed in the image store.
    pub featured_image: Option<String>,
}

pub struct PostService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
    categories: Arc<dyn CategoryRepository>,
    images: Arc<dyn ImageStore>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
        categories: Arc<dyn CategoryRepository>,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            posts,
            users,
            categories,
            images,
        }
    }

    pub async fn list_posts(&self, query: &ListPostsQuery) -> Result<Page<PostView>, DomainError> {
        let page = PageRequest::parse(query.page.as_deref(), query.limit.as_deref());
        let filter = Self::filter_from(query)?;

        let total = self.posts.count(&filter).await?;
        let posts = if page.offset() >= total {
            Vec::new()
        } else {
            self.posts.list(&filter, page.offset(), page.limit).await?
        };

        tracing::debug!(
            page = page.page,
            limit = page.limit,
            total,
            returned = posts.len(),
            "Listed posts"
        );

        Ok(Page {
            items: self.resolve(posts).await?,
            pagination: Pagination::new(page, total),
        })
    }

    /// Fetch one post and count the view.
    pub async fn get_post(&self, key: &PostKey) -> Result<PostView, DomainError> {
        let found = match key {
            PostKey::ById(id) => self.posts.find_by_id(*id).await?,
            PostKey::BySlug(slug) => self.posts.find_by_slug(slug).await?,
        };
        let post = found.ok_or_else(|| DomainError::not_found("Post", key))?;

        let post = self.increment_view_count(post.id).await?;
        self.view_of(post).await
    }

    pub async fn increment_view_count(&self, id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .increment_view_count(id)
            .await
            .map_err(|e| Self::post_error(e, id))
    }

    pub async fn create_post(
        &self,
        actor: &Actor,
        input: PostInput,
    ) -> Result<PostView, DomainError> {
        let upload = input.featured_image.clone();
        let result = self.try_create(actor, input).await;
        if result.is_err() {
            if let Some(filename) = upload {
                self.release_image(&filename).await;
            }
        }
        result
    }

    async fn try_create(&self, actor: &Actor, input: PostInput) -> Result<PostView, DomainError> {
        policy::authorize(actor, Action::CreatePost, None)?;

        let title = validation::required("title", input.title.as_deref().unwrap_or_default())?;
        validation::max_chars("title", title, TITLE_MAX_LEN)?;
        let content =
            validation::required("content", input.content.as_deref().unwrap_or_default())?;
        let category_id = self
            .existing_category(input.category.as_deref().unwrap_or_default())
            .await?;

        let draft = NewPost {
            title: title.to_string(),
            content: content.to_string(),
            category_id,
            excerpt: Self::excerpt(input.excerpt)?.filter(|e| !e.is_empty()),
            tags: validation::normalize_tags(input.tags.unwrap_or_default()),
            featured_image: input.featured_image,
        };

        let mut post = Post::new(actor.id, slug::post_slug(&draft.title), draft);
        let mut attempts = 1;
        let saved = loop {
            match self.posts.insert(post.clone()).await {
                Ok(saved) => break saved,
                Err(RepoError::Constraint(msg)) if attempts < SLUG_ATTEMPTS => {
                    tracing::warn!(slug = %post.slug, %msg, "Slug collision, regenerating");
                    post.slug = slug::post_slug(&post.title);
                    attempts += 1;
                }
                Err(e) => return Err(e.into()),
            }
        };

        tracing::info!(post_id = %saved.id, slug = %saved.slug, author_id = %actor.id, "Post created");
        self.view_of(saved).await
    }

    pub async fn update_post(
        &self,
        actor: &Actor,
        id: Uuid,
        input: PostInput,
    ) -> Result<PostView, DomainError> {
        let upload = input.featured_image.clone();
        let result = self.try_update(actor, id, input).await;
        if result.is_err() {
            if let Some(filename) = upload {
                self.release_image(&filename).await;
            }
        }
        result
    }

    async fn try_update(
        &self,
        actor: &Actor,
        id: Uuid,
        input: PostInput,
    ) -> Result<PostView, DomainError> {
        let mut post = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", id))?;

        policy::authorize(actor, Action::UpdatePost, Some(post.author_id))?;

        let patch = self.validate_patch(input).await?;
        let replaced = patch
            .featured_image
            .as_ref()
            .filter(|new_image| **new_image != post.featured_image)
            .map(|_| post.featured_image.clone());

        post.apply(patch);
        let saved = self
            .posts
            .update(&post)
            .await
            .map_err(|e| Self::post_error(e, id))?;

        // The old file goes only once the post no longer points at it.
        if let Some(old_image) = replaced {
            self.release_image(&old_image).await;
        }

        tracing::info!(post_id = %id, user_id = %actor.id, "Post updated");
        self.view_of(saved).await
    }

    pub async fn delete_post(&self, actor: &Actor, id: Uuid) -> Result<(), DomainError> {
        let post = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", id))?;

        policy::authorize(actor, Action::DeletePost, Some(post.author_id))?;

        self.posts
            .delete(id)
            .await
            .map_err(|e| Self::post_error(e, id))?;
        self.release_image(&post.featured_image).await;

        tracing::info!(post_id = %id, user_id = %actor.id, "Post deleted");
        Ok(())
    }

    pub async fn add_comment(
        &self,
        actor: &Actor,
        post_id: Uuid,
        content: &str,
    ) -> Result<CommentView, DomainError> {
        policy::authorize(actor, Action::AddComment, None)?;

        let content = content.trim();
        if content.is_empty() {
            return Err(DomainError::validation("Comment content is required"));
        }

        let comment = Comment::new(actor.id, content.to_string());
        self.posts
            .push_comment(post_id, &comment)
            .await
            .map_err(|e| Self::post_error(e, post_id))?;

        tracing::info!(%post_id, comment_id = %comment.id, user_id = %actor.id, "Comment added");

        Ok(CommentView {
            id: comment.id,
            user: Some(AuthorSummary {
                id: actor.id,
                username: actor.username.clone(),
            }),
            content: comment.content,
            created_at: comment.created_at,
        })
    }

    fn filter_from(query: &ListPostsQuery) -> Result<PostFilter, DomainError> {
        let category_id = match query.category.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                Uuid::parse_str(raw)
                    .map_err(|_| DomainError::validation(format!("Invalid category id '{}'", raw)))?,
            ),
        };

        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);

        Ok(PostFilter {
            category_id,
            search,
        })
    }

    async fn validate_patch(&self, input: PostInput) -> Result<PostPatch, DomainError> {
        let title = match input.title.as_deref() {
            Some(raw) => {
                let title = validation::required("title", raw)?;
                validation::max_chars("title", title, TITLE_MAX_LEN)?;
                Some(title.to_string())
            }
            None => None,
        };

        let content = match input.content.as_deref() {
            Some(raw) => Some(validation::required("content", raw)?.to_string()),
            None => None,
        };

        let category_id = match input.category.as_deref() {
            Some(raw) => Some(self.existing_category(raw).await?),
            None => None,
        };

        Ok(PostPatch {
            title,
            content,
            excerpt: Self::excerpt(input.excerpt)?,
            category_id,
            tags: input.tags.map(validation::normalize_tags),
            featured_image: input.featured_image,
        })
    }

    fn excerpt(raw: Option<String>) -> Result<Option<String>, DomainError> {
        match raw {
            Some(excerpt) => {
                let excerpt = excerpt.trim();
                validation::max_chars("excerpt", excerpt, EXCERPT_MAX_LEN)?;
                Ok(Some(excerpt.to_string()))
            }
            None => Ok(None),
        }
    }

    async fn existing_category(&self, raw: &str) -> Result<Uuid, DomainError> {
        let raw = validation::required("category", raw)?;
        let id = Uuid::parse_str(raw)
            .map_err(|_| DomainError::validation(format!("Invalid category id '{}'", raw)))?;

        match self.categories.find_by_id(id).await? {
            Some(_) => Ok(id),
            None => Err(DomainError::validation(format!(
                "Category {} does not exist",
                id
            ))),
        }
    }

    /// Release a stored image. Failures are logged, never returned.
    async fn release_image(&self, filename: &str) {
        if filename.is_empty()
            || filename == DEFAULT_FEATURED_IMAGE
            || filename.starts_with("http://")
            || filename.starts_with("https://")
        {
            return;
        }

        match self.images.remove(filename).await {
            Ok(()) => tracing::debug!(%filename, "Released image"),
            Err(e) => tracing::warn!(%filename, error = %e, "Failed to release image"),
        }
    }

    fn post_error(err: RepoError, id: Uuid) -> DomainError {
        match err {
            RepoError::NotFound => DomainError::not_found("Post", id),
            other => other.into(),
        }
    }

    async fn view_of(&self, post: Post) -> Result<PostView, DomainError> {
        let mut views = self.resolve(vec![post]).await?;
        views
            .pop()
            .ok_or_else(|| DomainError::Internal("Post vanished while resolving".to_string()))
    }

    /// Resolve author, category and comment users with one batch lookup
    /// per collection.
    async fn resolve(&self, posts: Vec<Post>) -> Result<Vec<PostView>, DomainError> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let user_ids: Vec<Uuid> = posts
            .iter()
            .flat_map(|p| std::iter::once(p.author_id).chain(p.comments.iter().map(|c| c.user_id)))
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let category_ids: Vec<Uuid> = posts
            .iter()
            .map(|p| p.category_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let users: HashMap<Uuid, AuthorSummary> = self
            .users
            .find_summaries(&user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();
        let categories: HashMap<Uuid, CategorySummary> = self
            .categories
            .find_many(&category_ids)
            .await?
            .into_iter()
            .map(|c| (c.id, c.summary()))
            .collect();

        Ok(posts
            .into_iter()
            .map(|post| PostView {
                author: users.get(&post.author_id).cloned(),
                category: categories.get(&post.category_id).cloned(),
                comments: post
                    .comments
                    .into_iter()
                    .map(|c| CommentView {
                        user: users.get(&c.user_id).cloned(),
                        id: c.id,
                        content: c.content,
                        created_at: c.created_at,
                    })
                    .collect(),
                id: post.id,
                title: post.title,
                content: post.content,
                excerpt: post.excerpt,
                slug: post.slug,
                tags: post.tags,
                featured_image: post.featured_image,
                view_count: post.view_count,
                created_at: post.created_at,
                updated_at: post.updated_at,
            })
            .collect())
    }
}
