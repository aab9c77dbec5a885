//! Credential store: registration and login checks.

use std::sync::{Arc, OnceLock};

use crate::domain::{NewUser, User};
use crate::error::{DomainError, RepoError};
use crate::ports::{PasswordService, UserRepository};
use crate::sanitize::{validate_password, validate_username};

/// Persists usernames with password hashes and checks credentials.
pub struct CredentialStore {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
    /// Checked against on unknown usernames so both login failures cost one
    /// hash verification.
    dummy_hash: OnceLock<String>,
}

impl CredentialStore {
    pub fn new(users: Arc<dyn UserRepository>, passwords: Arc<dyn PasswordService>) -> Self {
        Self {
            users,
            passwords,
            dummy_hash: OnceLock::new(),
        }
    }

    /// Register a new user. Only the password hash is stored.
    pub async fn register(&self, username: &str, password: &str) -> Result<User, DomainError> {
        validate_username(username)?;
        validate_password(password)?;

        if self.users.find_by_username(username).await?.is_some() {
            return Err(duplicate(username));
        }

        let password_hash = self
            .passwords
            .hash(password)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        // A concurrent registration can still win the race; the unique
        // constraint turns that into the same error.
        let user = self
            .users
            .insert(NewUser::new(username.to_string(), password_hash))
            .await
            .map_err(|e| match e {
                RepoError::Constraint(_) => duplicate(username),
                other => other.into(),
            })?;

        tracing::info!(username = %user.username, "User registered");
        Ok(user)
    }

    /// Check a username/password pair.
    pub async fn verify(&self, username: &str, password: &str) -> Result<User, DomainError> {
        let Some(user) = self.users.find_by_username(username).await? else {
            tracing::debug!(username = %username, "Login for unknown user");
            let dummy = self.dummy_hash()?;
            // Same cost as a wrong password.
            let _ = self.passwords.verify(password, dummy);
            return Err(DomainError::InvalidCredentials);
        };

        let valid = self
            .passwords
            .verify(password, &user.password_hash)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        if !valid {
            tracing::debug!(username = %username, "Login with wrong password");
            return Err(DomainError::InvalidCredentials);
        }

        Ok(user)
    }

    fn dummy_hash(&self) -> Result<&str, DomainError> {
        if let Some(hash) = self.dummy_hash.get() {
            return Ok(hash.as_str());
        }
        let hash = self
            .passwords
            .hash("unknown-user-placeholder")
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        Ok(self.dummy_hash.get_or_init(|| hash).as_str())
    }

    /// Look up a registered user.
    pub async fn find(&self, username: &str) -> Result<Option<User>, DomainError> {
        Ok(self.users.find_by_username(username).await?)
    }
}

fn duplicate(username: &str) -> DomainError {
    DomainError::Duplicate(format!("Username '{username}' is already registered"))
}
