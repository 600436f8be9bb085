//! Registration, login and identity recovery.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Role, User};
use crate::error::{DomainError, RepoError};
use crate::ports::{PasswordService, TokenService, UserRepository};
use crate::validation;

/// Input for a new account.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

/// An authenticated user plus the token issued for them.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: String,
}

/// Credential store: owns user records and session issuance.
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
    tokens: Arc<dyn TokenService>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        passwords: Arc<dyn PasswordService>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            users,
            passwords,
            tokens,
        }
    }

    pub async fn register(&self, input: Registration) -> Result<Session, DomainError> {
        let username = validation::username(&input.username)?;
        let email = validation::email(&input.email)?;
        let password = validation::password(&input.password)?;
        let role = match input.role.as_deref().map(str::trim) {
            None | Some("") => Role::default(),
            Some(raw) => raw.parse::<Role>().map_err(DomainError::Validation)?,
        };

        let password_hash = self.passwords.hash(password)?;
        let user = User::new(username, email, password_hash, role);

        let saved = self.users.insert(user).await.map_err(|e| match e {
            RepoError::Constraint(_) => DomainError::DuplicateIdentity(
                "User with this email or username already exists".to_string(),
            ),
            other => other.into(),
        })?;

        tracing::info!(user_id = %saved.id, role = %saved.role, "User registered");

        let token = self.tokens.issue(saved.id)?;
        Ok(Session { user: saved, token })
    }

    /// Check credentials. Unknown email and wrong password fail the same way.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, DomainError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(DomainError::validation(
                "Please provide an email and password",
            ));
        }

        let Some(user) = self.users.find_by_email(email).await? else {
            // Spend the same hashing effort as a real verification.
            let _ = self.passwords.hash(password);
            tracing::debug!(email = %mask_email(email), "Login for unknown email");
            return Err(DomainError::InvalidCredentials);
        };

        if !self.passwords.verify(password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "Login with wrong password");
            return Err(DomainError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id)?;
        tracing::info!(user_id = %user.id, "User logged in");
        Ok(Session { user, token })
    }

    /// Recover the user behind a bearer token.
    pub async fn authenticate(&self, token: &str) -> Result<User, DomainError> {
        let claims = self.tokens.verify(token)?;
        self.current_user(claims.user_id).await
    }

    /// Load the user a verified token points at.
    pub async fn current_user(&self, user_id: Uuid) -> Result<User, DomainError> {
        self.users.find_by_id(user_id).await?.ok_or_else(|| {
            tracing::debug!(%user_id, "Token refers to a missing user");
            DomainError::Unauthenticated
        })
    }
}

/// Mask an email address for logging to avoid PII in logs.
pub fn mask_email(email: &str) -> String {
    match email.find('@') {
        Some(at_pos) => {
            let (local, domain) = email.split_at(at_pos);
            let masked_local = match local.chars().next() {
                Some(first) if local.chars().count() > 1 => format!("{}***", first),
                _ => "***".to_string(),
            };
            format!("{}{}", masked_local, domain)
        }
        None => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("jane@example.com"), "j***@example.com");
        assert_eq!(mask_email("j@example.com"), "***@example.com");
        assert_eq!(mask_email("nonsense"), "***");
    }
}
