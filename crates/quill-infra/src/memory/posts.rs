use std::cmp::Reverse;
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Comment, Post, PostFilter};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostRepository};

/// In-memory post store. Each mutation runs under a single write lock, so
/// view increments and comment appends never lose concurrent updates.
#[derive(Default)]
pub struct InMemoryPostRepository {
    store: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;

        if store.contains_key(&post.id) {
            return Err(RepoError::Constraint("posts_pkey".to_string()));
        }
        if store.values().any(|p| p.slug == post.slug) {
            return Err(RepoError::Constraint("posts_slug_key".to_string()));
        }

        store.insert(post.id, post.clone());
        Ok(post)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let store = self.store.read().await;
        Ok(store.values().find(|p| p.slug == slug).cloned())
    }

    async fn list(
        &self,
        filter: &PostFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError> {
        let store = self.store.read().await;

        let mut matching: Vec<&Post> = store.values().filter(|p| filter.matches(p)).collect();
        matching.sort_by_key(|p| Reverse((p.created_at, p.id)));

        Ok(matching
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError> {
        let store = self.store.read().await;
        Ok(store.values().filter(|p| filter.matches(p)).count() as u64)
    }

    async fn update(&self, post: &Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        let stored = store.get_mut(&post.id).ok_or(RepoError::NotFound)?;

        stored.title = post.title.clone();
        stored.content = post.content.clone();
        stored.excerpt = post.excerpt.clone();
        stored.category_id = post.category_id;
        stored.tags = post.tags.clone();
        stored.featured_image = post.featured_image.clone();
        stored.updated_at = post.updated_at;

        Ok(stored.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.store.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }

    async fn increment_view_count(&self, id: Uuid) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        let post = store.get_mut(&id).ok_or(RepoError::NotFound)?;
        post.view_count += 1;
        Ok(post.clone())
    }

    async fn push_comment(&self, post_id: Uuid, comment: &Comment) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        let post = store.get_mut(&post_id).ok_or(RepoError::NotFound)?;
        post.comments.push(comment.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use chrono::{TimeDelta, Utc};
    use quill_core::domain::NewPost;

    fn post(title: &str, category_id: Uuid, minutes_ago: i64) -> Post {
        let mut post = Post::new(
            Uuid::new_v4(),
            quill_core::slug::post_slug(title),
            NewPost {
                title: title.into(),
                content: format!("Body of {}", title),
                category_id,
                ..Default::default()
            },
        );
        post.created_at = Utc::now() - TimeDelta::minutes(minutes_ago);
        post
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_paginated() {
        let repo = InMemoryPostRepository::new();
        let category = Uuid::new_v4();
        for (i, title) in ["oldest", "middle", "newest"].iter().enumerate() {
            repo.insert(post(title, category, 10 - i as i64)).await.unwrap();
        }

        let filter = PostFilter::default();
        let first: Vec<String> = repo
            .list(&filter, 0, 2)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        let second = repo.list(&filter, 2, 2).await.unwrap();

        assert_eq!(first, vec!["newest", "middle"]);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].title, "oldest");
        assert!(repo.list(&filter, 3, 2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_count_uses_filter() {
        let repo = InMemoryPostRepository::new();
        let tech = Uuid::new_v4();
        repo.insert(post("Rust", tech, 1)).await.unwrap();
        repo.insert(post("Go", tech, 2)).await.unwrap();
        repo.insert(post("Pasta", Uuid::new_v4(), 3)).await.unwrap();

        let filter = PostFilter {
            category_id: Some(tech),
            search: Some("rust".into()),
        };

        assert_eq!(repo.count(&filter).await.unwrap(), 1);
        assert_eq!(repo.count(&PostFilter::default()).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_rejected() {
        let repo = InMemoryPostRepository::new();
        let first = post("Hello", Uuid::new_v4(), 0);
        let mut second = post("Hello", Uuid::new_v4(), 0);
        second.slug = first.slug.clone();

        repo.insert(first).await.unwrap();

        assert!(matches!(
            repo.insert(second).await,
            Err(RepoError::Constraint(_))
        ));
    }

    #[tokio::test]
    async fn test_update_keeps_counters_and_comments() {
        let repo = InMemoryPostRepository::new();
        let saved = repo.insert(post("Hello", Uuid::new_v4(), 0)).await.unwrap();

        let mut stale = saved.clone();
        repo.increment_view_count(saved.id).await.unwrap();
        repo.push_comment(saved.id, &Comment::new(Uuid::new_v4(), "hi".into()))
            .await
            .unwrap();

        stale.title = "Hello again".into();
        let updated = repo.update(&stale).await.unwrap();

        assert_eq!(updated.title, "Hello again");
        assert_eq!(updated.view_count, 1);
        assert_eq!(updated.comments.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_increments_are_not_lost() {
        let repo = Arc::new(InMemoryPostRepository::new());
        let saved = repo.insert(post("Busy", Uuid::new_v4(), 0)).await.unwrap();

        let tasks: Vec<_> = (0..50)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.increment_view_count(saved.id).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let stored = repo.find_by_id(saved.id).await.unwrap().unwrap();
        assert_eq!(stored.view_count, 50);
    }

    #[tokio::test]
    async fn test_missing_post_mutations_report_not_found() {
        let repo = InMemoryPostRepository::new();
        let id = Uuid::new_v4();

        assert!(matches!(repo.delete(id).await, Err(RepoError::NotFound)));
        assert!(matches!(
            repo.increment_view_count(id).await,
            Err(RepoError::NotFound)
        ));
        assert!(matches!(
            repo.push_comment(id, &Comment::new(Uuid::new_v4(), "x".into()))
                .await,
            Err(RepoError::NotFound)
        ));
    }
}
