use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::Category;
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, CategoryRepository};

/// In-memory category store enforcing unique names and slugs.
#[derive(Default)]
pub struct InMemoryCategoryRepository {
    store: RwLock<HashMap<Uuid, Category>>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<Category, Uuid> for InMemoryCategoryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn insert(&self, category: Category) -> Result<Category, RepoError> {
        let mut store = self.store.write().await;

        if store
            .values()
            .any(|c| c.name == category.name || c.slug == category.slug)
        {
            return Err(RepoError::Constraint("categories_name_key".to_string()));
        }

        store.insert(category.id, category.clone());
        Ok(category)
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, RepoError> {
        let mut categories: Vec<Category> = self.store.read().await.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Category>, RepoError> {
        let store = self.store.read().await;
        Ok(ids.iter().filter_map(|id| store.get(id)).cloned().collect())
    }
}
