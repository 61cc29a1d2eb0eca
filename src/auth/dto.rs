use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ServiceResult};

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> ServiceResult<()> {
        if self.username.trim().is_empty() {
            return Err(ServiceError::Validation("username is required".into()));
        }
        if self.password.is_empty() {
            return Err(ServiceError::Validation("password is required".into()));
        }
        Ok(())
    }
}

/// Response returned after a successful login.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct LoginResponse {
    pub access_token: String,
}
