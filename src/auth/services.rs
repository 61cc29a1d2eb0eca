use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::auth::claims::TokenPayload;
use crate::auth::dto::LoginResponse;
use crate::auth::jwt::TokenIssuer;
use crate::auth::password::PasswordHasher;
use crate::error::{ServiceError, ServiceResult};
use crate::users::repo_types::User;
use crate::users::services::UserAccountService;

#[derive(Clone)]
pub struct AuthService {
    users: UserAccountService,
    hasher: PasswordHasher,
    issuer: Arc<dyn TokenIssuer>,
}

impl AuthService {
    pub fn new(
        users: UserAccountService,
        hasher: PasswordHasher,
        issuer: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            users,
            hasher,
            issuer,
        }
    }

    /// Returns the full record, hash included; callers must not pass it outward.
    /// Unknown usernames and wrong passwords fail identically.
    #[instrument(skip(self, password))]
    pub async fn validate_credentials(&self, username: &str, password: &str) -> ServiceResult<User> {
        let Some(user) = self.users.find_by_username(username).await? else {
            warn!("login unknown username");
            return Err(ServiceError::InvalidCredentials);
        };

        let ok = self
            .hasher
            .verify(password, &user.password_hash)
            .await
            .map_err(|e| {
                error!(error = %e, user_id = user.id, "verify_password failed");
                ServiceError::Internal(e)
            })?;

        if !ok {
            warn!(user_id = user.id, "login invalid password");
            return Err(ServiceError::InvalidCredentials);
        }
        Ok(user)
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> ServiceResult<LoginResponse> {
        let user = self.validate_credentials(username, password).await?;
        let payload = TokenPayload {
            username: user.username,
            sub: user.id,
        };

        let access_token = self.issuer.sign(&payload).await.map_err(|e| {
            error!(error = %e, "jwt sign access failed");
            ServiceError::Internal(e)
        })?;

        info!(user_id = payload.sub, "user logged in");
        Ok(LoginResponse { access_token })
    }
}
