//! Account registration, federated first login and credential checks

use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use common::error::DatabaseError;
use tracing::info;

use crate::{
    error::{ProfileError, ProfileResult},
    models::{CreationRecord, NewUser, UserId, UserRecord},
    repositories::ProfileRepository,
    validation::{validate_email, validate_name, validate_password},
};

/// Role given to every self-registered account
pub const DEFAULT_ROLE: &str = "MEMBER";

/// Generated avatar for accounts that sign up with a password
pub fn default_avatar(email: &str) -> String {
    format!("https://api.multiavatar.com/{}.png", email)
}

/// User account operations outside the profile view
#[derive(Clone)]
pub struct AccountService {
    repository: Arc<dyn ProfileRepository>,
}

impl AccountService {
    pub fn new(repository: Arc<dyn ProfileRepository>) -> Self {
        Self { repository }
    }

    /// Register a password account
    pub async fn register(&self, email: &str, password: &str, name: &str) -> ProfileResult<UserRecord> {
        validate_email(email).map_err(ProfileError::Validation)?;
        validate_password(password).map_err(ProfileError::Validation)?;
        validate_name(name).map_err(ProfileError::Validation)?;

        if self.repository.find_by_email(email).await?.is_some() {
            return Err(ProfileError::Conflict("Email already registered".to_string()));
        }

        info!("Registering new user: {}", email);

        let salt = SaltString::generate(&mut rand::thread_rng());
        let hashed_password = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| ProfileError::Internal(format!("Failed to hash password: {}", e)))?
            .to_string();

        self.create(NewUser {
            email: email.to_string(),
            name: Some(name.trim().to_string()),
            hashed_password: Some(hashed_password),
            role: DEFAULT_ROLE.to_string(),
            profile_image: Some(default_avatar(email)),
            picture: None,
        })
        .await
    }

    /// Find the account for a federated login, creating it on first sight.
    ///
    /// The provider's picture becomes the avatar; the generation photo stays
    /// empty until the user uploads one.
    pub async fn find_or_create_federated(
        &self,
        email: &str,
        name: &str,
        picture: Option<&str>,
    ) -> ProfileResult<UserRecord> {
        if let Some(user) = self.repository.find_by_email(email).await? {
            return Ok(user);
        }

        info!("Creating federated user: {}", email);

        self.create(NewUser {
            email: email.to_string(),
            name: Some(name.to_string()),
            hashed_password: None,
            role: DEFAULT_ROLE.to_string(),
            profile_image: picture.map(str::to_string),
            picture: None,
        })
        .await
    }

    /// Check an email and password pair.
    ///
    /// Unknown users, accounts without a password and wrong passwords all
    /// yield `None`.
    pub async fn authenticate(&self, email: &str, password: &str) -> ProfileResult<Option<UserRecord>> {
        let Some(user) = self.repository.find_by_email(email).await? else {
            return Ok(None);
        };

        let Some(hash) = user.hashed_password.as_deref() else {
            return Ok(None);
        };

        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| ProfileError::Internal(format!("Failed to parse password hash: {}", e)))?;

        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
        {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Creations of a user, newest first
    pub async fn creations(&self, user_id: UserId) -> ProfileResult<Vec<CreationRecord>> {
        Ok(self.repository.list_creations_by_user(user_id).await?)
    }

    pub async fn list_users(&self) -> ProfileResult<Vec<UserRecord>> {
        Ok(self.repository.list_users().await?)
    }

    pub async fn get_user(&self, user_id: UserId) -> ProfileResult<UserRecord> {
        self.repository
            .find_by_id(user_id)
            .await?
            .ok_or(ProfileError::NotFound)
    }

    async fn create(&self, new_user: NewUser) -> ProfileResult<UserRecord> {
        self.repository
            .create(&new_user)
            .await
            .map_err(|e| match e {
                DatabaseError::UniqueViolation(_) => {
                    ProfileError::Conflict("Email already registered".to_string())
                }
                other => ProfileError::Storage(other),
            })
    }
}
