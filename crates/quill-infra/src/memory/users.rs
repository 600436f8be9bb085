use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{AuthorSummary, User};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, UserRepository};

/// In-memory user store enforcing unique usernames and emails.
#[derive(Default)]
pub struct InMemoryUserRepository {
    store: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;

        if store.contains_key(&user.id) {
            return Err(RepoError::Constraint("users_pkey".to_string()));
        }
        if store.values().any(|u| u.username == user.username) {
            return Err(RepoError::Constraint("users_username_key".to_string()));
        }
        if store.values().any(|u| u.email == user.email) {
            return Err(RepoError::Constraint("users_email_key".to_string()));
        }

        store.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let store = self.store.read().await;
        Ok(store.values().find(|u| u.email == email).cloned())
    }

    async fn find_summaries(&self, ids: &[Uuid]) -> Result<Vec<AuthorSummary>, RepoError> {
        let store = self.store.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| store.get(id))
            .map(User::summary)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::domain::Role;

    fn user(username: &str, email: &str) -> User {
        User::new(username.into(), email.into(), "hash".into(), Role::User)
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let repo = InMemoryUserRepository::new();
        let saved = repo.insert(user("ann", "ann@example.com")).await.unwrap();

        let by_id = repo.find_by_id(saved.id).await.unwrap().unwrap();
        let by_email = repo.find_by_email("ann@example.com").await.unwrap().unwrap();

        assert_eq!(by_id.username, "ann");
        assert_eq!(by_email.id, saved.id);
    }

    #[tokio::test]
    async fn test_duplicate_username_or_email() {
        let repo = InMemoryUserRepository::new();
        repo.insert(user("ann", "ann@example.com")).await.unwrap();

        let same_name = repo.insert(user("ann", "other@example.com")).await;
        let same_email = repo.insert(user("bob", "ann@example.com")).await;

        assert!(matches!(same_name, Err(RepoError::Constraint(_))));
        assert!(matches!(same_email, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_find_summaries_skips_unknown_ids() {
        let repo = InMemoryUserRepository::new();
        let saved = repo.insert(user("ann", "ann@example.com")).await.unwrap();

        let summaries = repo
            .find_summaries(&[saved.id, Uuid::new_v4()])
            .await
            .unwrap();

        assert_eq!(
            summaries,
            vec![AuthorSummary {
                id: saved.id,
                username: "ann".into()
            }]
        );
    }
}
