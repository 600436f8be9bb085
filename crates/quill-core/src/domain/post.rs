use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AuthorSummary, CategorySummary};

/// Image used when a post is created without an upload.
pub const DEFAULT_FEATURED_IMAGE: &str = "default-post.jpg";

/// Post entity - represents a blog post.
///
/// `author_id` and `slug` are fixed at creation. `view_count` only grows,
/// and `comments` only grows at the end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub slug: String,
    pub category_id: Uuid,
    pub author_id: Uuid,
    pub tags: Vec<String>,
    pub featured_image: String,
    pub view_count: i64,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post owned by `author_id`.
    pub fn new(author_id: Uuid, slug: String, draft: NewPost) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: draft.title,
            content: draft.content,
            excerpt: draft.excerpt,
            slug,
            category_id: draft.category_id,
            author_id,
            tags: draft.tags,
            featured_image: draft
                .featured_image
                .unwrap_or_else(|| DEFAULT_FEATURED_IMAGE.to_string()),
            view_count: 0,
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply the mutable fields of a patch. Author and slug never change.
    pub fn apply(&mut self, patch: PostPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(excerpt) = patch.excerpt {
            self.excerpt = Some(excerpt).filter(|e| !e.is_empty());
        }
        if let Some(category_id) = patch.category_id {
            self.category_id = category_id;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(image) = patch.featured_image {
            self.featured_image = image;
        }
        self.updated_at = Utc::now();
    }

    /// Whether a search term matches title, content or any tag,
    /// case-insensitively, as a plain substring.
    pub fn matches_search(&self, term: &str) -> bool {
        let needle = term.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.content.to_lowercase().contains(&needle)
            || self
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(&needle))
    }
}

/// A comment embedded in a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(user_id: Uuid, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            content,
            created_at: Utc::now(),
        }
    }
}

/// Validated input for a new post. The author always comes from the
/// authenticated identity, never from here.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub category_id: Uuid,
    pub excerpt: Option<String>,
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
}

/// Partial update of a post. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub category_id: Option<Uuid>,
    pub tags: Option<Vec<String>>,
    pub featured_image: Option<String>,
}

/// How a single post is addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostKey {
    ById(Uuid),
    BySlug(String),
}

impl PostKey {
    /// Decide once whether a path segment is an identifier or a slug.
    pub fn parse(raw: &str) -> Self {
        match Uuid::parse_str(raw) {
            Ok(id) => PostKey::ById(id),
            Err(_) => PostKey::BySlug(raw.to_string()),
        }
    }
}

impl std::fmt::Display for PostKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostKey::ById(id) => write!(f, "{}", id),
            PostKey::BySlug(slug) => f.write_str(slug),
        }
    }
}

/// Filter applied by post listings and counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub category_id: Option<Uuid>,
    pub search: Option<String>,
}

impl PostFilter {
    pub fn matches(&self, post: &Post) -> bool {
        self.category_id.is_none_or(|id| post.category_id == id)
            && self
                .search
                .as_deref()
                .is_none_or(|term| post.matches_search(term))
    }
}

/// A post with its references resolved for a response.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub slug: String,
    pub category: Option<CategorySummary>,
    pub author: Option<AuthorSummary>,
    pub tags: Vec<String>,
    pub featured_image: String,
    pub view_count: i64,
    pub comments: Vec<CommentView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A comment with its user resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentView {
    pub id: Uuid,
    pub user: Option<AuthorSummary>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_post() -> Post {
        Post::new(
            Uuid::new_v4(),
            "rust-tips-1".into(),
            NewPost {
                title: "Rust Tips".into(),
                content: "<p>Borrowing explained</p>".into(),
                category_id: Uuid::new_v4(),
                tags: vec!["Systems".into(), "lang".into()],
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_new_post_defaults() {
        let post = sample_post();
        assert_eq!(post.featured_image, DEFAULT_FEATURED_IMAGE);
        assert_eq!(post.view_count, 0);
        assert!(post.comments.is_empty());
    }

    #[test]
    fn test_search_matches_title_content_and_tags() {
        let post = sample_post();
        assert!(post.matches_search("rust"));
        assert!(post.matches_search("BORROW"));
        assert!(post.matches_search("system"));
        assert!(!post.matches_search("python"));
    }

    #[test]
    fn test_search_treats_term_literally() {
        let post = sample_post();
        assert!(!post.matches_search("r.st"));
        assert!(!post.matches_search("%"));
    }

    #[test]
    fn test_filter_combines_category_and_search() {
        let post = sample_post();
        let same_category = PostFilter {
            category_id: Some(post.category_id),
            search: Some("tips".into()),
        };
        let other_category = PostFilter {
            category_id: Some(Uuid::new_v4()),
            search: Some("tips".into()),
        };

        assert!(same_category.matches(&post));
        assert!(!other_category.matches(&post));
        assert!(PostFilter::default().matches(&post));
    }

    #[test]
    fn test_apply_patch_keeps_author_and_slug() {
        let mut post = sample_post();
        let author = post.author_id;
        let slug = post.slug.clone();

        post.apply(PostPatch {
            title: Some("Rust Tricks".into()),
            excerpt: Some(String::new()),
            ..Default::default()
        });

        assert_eq!(post.title, "Rust Tricks");
        assert_eq!(post.excerpt, None);
        assert_eq!(post.author_id, author);
        assert_eq!(post.slug, slug);
    }

    #[test]
    fn test_post_key_parse() {
        let id = Uuid::new_v4();
        assert_eq!(PostKey::parse(&id.to_string()), PostKey::ById(id));
        assert_eq!(
            PostKey::parse("hello-world-1700000000000"),
            PostKey::BySlug("hello-world-1700000000000".into())
        );
    }
}
