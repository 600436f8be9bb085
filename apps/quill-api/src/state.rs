//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::DomainError;
use quill_core::domain::DEFAULT_CATEGORIES;
use quill_core::ports::{
    CategoryRepository, ImageStore, PasswordService, PostRepository, TokenService, UserRepository,
};
use quill_core::services::{AccountService, CategoryService, PostService};
use quill_infra::{
    Argon2PasswordService, InMemoryCategoryRepository, InMemoryPostRepository,
    InMemoryUserRepository, JwtTokenService, LocalImageStore,
};

#[cfg(feature = "postgres")]
use quill_infra::database::{self, DatabaseConfig};
#[cfg(feature = "postgres")]
use quill_infra::{PostgresCategoryRepository, PostgresPostRepository, PostgresUserRepository};

use crate::config::AppConfig;

/// The three stores, whichever backend they run on.
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub persistent: bool,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            categories: Arc::new(InMemoryCategoryRepository::new()),
            posts: Arc::new(InMemoryPostRepository::new()),
            persistent: false,
        }
    }

    #[cfg(feature = "postgres")]
    async fn connect(config: Option<&DatabaseConfig>) -> Self {
        let Some(config) = config else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Self::in_memory();
        };

        match database::connect(config).await {
            Ok(conn) => Self {
                users: Arc::new(PostgresUserRepository::new(conn.clone())),
                categories: Arc::new(PostgresCategoryRepository::new(conn.clone())),
                posts: Arc::new(PostgresPostRepository::new(conn)),
                persistent: true,
            },
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "Failed to connect to database. Using in-memory fallback."
                );
                Self::in_memory()
            }
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
    pub categories: Arc<CategoryService>,
    pub posts: Arc<PostService>,
    pub images: Arc<dyn ImageStore>,
    pub max_image_bytes: usize,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> std::io::Result<Self> {
        #[cfg(feature = "postgres")]
        let repos = Repositories::connect(config.database.as_ref()).await;

        #[cfg(not(feature = "postgres"))]
        let repos = {
            tracing::info!("Running without postgres feature - using in-memory repositories");
            Repositories::in_memory()
        };

        let images = LocalImageStore::init(&config.upload_dir, config.max_image_bytes)
            .await
            .map_err(std::io::Error::other)?;

        let persistent = repos.persistent;
        let state = Self::from_parts(
            repos,
            Arc::new(Argon2PasswordService::new()),
            Arc::new(JwtTokenService::new(config.jwt.clone())),
            Arc::new(images),
            config.max_image_bytes,
        );

        // Postgres gets its defaults from the seed migration.
        if !persistent {
            state.seed_default_categories().await;
        }

        tracing::info!(persistent, "Application state initialized");
        Ok(state)
    }

    /// Wire services over already-built adapters.
    pub fn from_parts(
        repos: Repositories,
        passwords: Arc<dyn PasswordService>,
        tokens: Arc<dyn TokenService>,
        images: Arc<dyn ImageStore>,
        max_image_bytes: usize,
    ) -> Self {
        Self {
            accounts: Arc::new(AccountService::new(repos.users.clone(), passwords, tokens)),
            categories: Arc::new(CategoryService::new(repos.categories.clone())),
            posts: Arc::new(PostService::new(
                repos.posts,
                repos.users,
                repos.categories,
                images.clone(),
            )),
            images,
            max_image_bytes,
        }
    }

    async fn seed_default_categories(&self) {
        for name in DEFAULT_CATEGORIES {
            match self.categories.create_category(name).await {
                Ok(_) | Err(DomainError::DuplicateIdentity(_)) => {}
                Err(e) => tracing::warn!(category = name, error = %e, "Failed to seed category"),
            }
        }
    }
}
