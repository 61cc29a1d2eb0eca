//! Account lifecycle: uniqueness checks, password hashing, and the
//! password-free view handed back to callers.
//!
//! Uniqueness is a read-before-write pre-check with no transaction around it.
//! Two concurrent writers can both pass the check; the store's own unique
//! constraint (when it has one) is the last line, and its conflict is mapped
//! to the same error kinds.

use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::auth::password::PasswordHasher;
use crate::error::{ServiceError, ServiceResult};
use crate::users::dto::{CreateUser, UpdateUser};
use crate::users::repo::UserStore;
use crate::users::repo_types::{NewUser, SafeUser, User};

#[derive(Clone)]
pub struct UserAccountService {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
}

impl UserAccountService {
    pub fn new(store: Arc<dyn UserStore>, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }

    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn create(&self, input: CreateUser) -> ServiceResult<SafeUser> {
        self.ensure_unique(&input.username, &input.email, None).await?;

        let password_hash = self.hash(&input.password).await?;
        let user = self
            .store
            .insert(NewUser {
                name: input.name,
                username: input.username,
                email: input.email,
                password_hash,
            })
            .await?;

        info!(user_id = user.id, "user created");
        Ok(user.into())
    }

    #[instrument(skip(self))]
    pub async fn find_all(&self) -> ServiceResult<Vec<SafeUser>> {
        let users = self.store.find_all().await?;
        Ok(users.into_iter().map(SafeUser::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn find_one(&self, id: i64) -> ServiceResult<SafeUser> {
        Ok(self.existing(id).await?.into())
    }

    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: i64, patch: UpdateUser) -> ServiceResult<SafeUser> {
        let mut user = self.existing(id).await?;

        if patch.touches_unique_fields() {
            let username = patch.username.as_deref().unwrap_or(&user.username);
            let email = patch.email.as_deref().unwrap_or(&user.email);
            self.ensure_unique(username, email, Some(id)).await?;
        }

        if let Some(password) = patch.password.as_deref().filter(|p| !p.is_empty()) {
            user.password_hash = self.hash(password).await?;
        }
        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(username) = patch.username {
            user.username = username;
        }
        if let Some(email) = patch.email {
            user.email = email;
        }

        let saved = self.store.save(user).await?;
        info!(user_id = saved.id, "user updated");
        Ok(saved.into())
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, id: i64) -> ServiceResult<SafeUser> {
        let user = self.existing(id).await?;
        self.store.delete(&user).await?;
        info!(user_id = id, "user removed");
        Ok(user.into())
    }

    /// Full record including the password hash; for credential checks only.
    pub(crate) async fn find_by_username(&self, username: &str) -> ServiceResult<Option<User>> {
        Ok(self.store.find_by_username(username).await?)
    }

    async fn existing(&self, id: i64) -> ServiceResult<User> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::UserNotFound(id))
    }

    async fn hash(&self, plain: &str) -> ServiceResult<String> {
        self.hasher.hash(plain).await.map_err(|e| {
            error!(error = %e, "hash_password failed");
            ServiceError::Internal(e)
        })
    }

    /// Username conflicts win over email conflicts. `ignore_id` is the row being updated.
    async fn ensure_unique(
        &self,
        username: &str,
        email: &str,
        ignore_id: Option<i64>,
    ) -> ServiceResult<()> {
        let (by_username, by_email) = tokio::try_join!(
            self.store.find_by_username(username),
            self.store.find_by_email(email),
        )?;
        let conflicts = |u: &Option<User>| u.as_ref().is_some_and(|u| Some(u.id) != ignore_id);

        if conflicts(&by_username) {
            warn!(%username, "username already in use");
            return Err(ServiceError::DuplicateUsername);
        }
        if conflicts(&by_email) {
            warn!(%email, "email already in use");
            return Err(ServiceError::DuplicateEmail);
        }
        Ok(())
    }
}
