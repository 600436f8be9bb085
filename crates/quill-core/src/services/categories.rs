//! Category catalogue.

use std::sync::Arc;

use crate::domain::Category;
use crate::error::{DomainError, RepoError};
use crate::ports::CategoryRepository;
use crate::validation;

pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>) -> Self {
        Self { categories }
    }

    /// All categories, alphabetically.
    pub async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        Ok(self.categories.list().await?)
    }

    pub async fn create_category(&self, name: &str) -> Result<Category, DomainError> {
        let name = validation::required("category name", name)?;
        validation::max_chars("category name", name, validation::CATEGORY_NAME_MAX_LEN)?;

        let category = Category::new(name.to_string());
        if category.slug.is_empty() {
            return Err(DomainError::validation(
                "Category name must contain letters or digits",
            ));
        }

        let saved = self.categories.insert(category).await.map_err(|e| match e {
            RepoError::Constraint(_) => {
                DomainError::DuplicateIdentity("Category already exists".to_string())
            }
            other => other.into(),
        })?;

        tracing::info!(category_id = %saved.id, slug = %saved.slug, "Category created");
        Ok(saved)
    }
}
