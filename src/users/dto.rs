use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use crate::error::{ServiceError, ServiceResult};

pub const PASSWORD_MIN_LENGTH: usize = 6;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn invalid(msg: &str) -> ServiceError {
    ServiceError::Validation(msg.to_string())
}

fn check_email(email: &str) -> ServiceResult<()> {
    if !is_valid_email(email) {
        return Err(invalid("email must be a valid address"));
    }
    Ok(())
}

fn check_password(password: &str) -> ServiceResult<()> {
    if password.chars().count() < PASSWORD_MIN_LENGTH {
        return Err(invalid("password must be at least 6 characters"));
    }
    Ok(())
}

/// Request body for account creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

impl CreateUser {
    pub fn validate(&self) -> ServiceResult<()> {
        if self.name.trim().is_empty() {
            return Err(invalid("name is required"));
        }
        if self.username.trim().is_empty() {
            return Err(invalid("username is required"));
        }
        if self.email.trim().is_empty() {
            return Err(invalid("email is required"));
        }
        check_email(&self.email)?;
        if self.password.is_empty() {
            return Err(invalid("password is required"));
        }
        check_password(&self.password)
    }
}

/// Partial update; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UpdateUser {
    pub fn validate(&self) -> ServiceResult<()> {
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(invalid("name is required"));
        }
        if self.username.as_deref().is_some_and(|u| u.trim().is_empty()) {
            return Err(invalid("username is required"));
        }
        if let Some(email) = &self.email {
            check_email(email)?;
        }
        if let Some(password) = &self.password {
            check_password(password)?;
        }
        Ok(())
    }

    pub(crate) fn touches_unique_fields(&self) -> bool {
        self.username.is_some() || self.email.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create() -> CreateUser {
        CreateUser {
            name: "Test User".into(),
            username: "testuser".into(),
            email: "test@example.com".into(),
            password: "password123".into(),
        }
    }

    #[test]
    fn email_pattern() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.de"));
        assert!(!is_valid_email("@c.de"));
    }

    #[test]
    fn valid_create_passes() {
        assert!(create().validate().is_ok());
    }

    #[test]
    fn create_rejects_each_bad_field() {
        let cases = [
            CreateUser { name: " ".into(), ..create() },
            CreateUser { username: String::new(), ..create() },
            CreateUser { email: "nope".into(), ..create() },
            CreateUser { password: String::new(), ..create() },
            CreateUser { password: "12345".into(), ..create() },
        ];
        for case in cases {
            assert!(
                matches!(case.validate(), Err(ServiceError::Validation(_))),
                "{case:?} should fail validation"
            );
        }
    }

    #[test]
    fn short_password_message() {
        let err = CreateUser { password: "abc".into(), ..create() }
            .validate()
            .unwrap_err();
        assert_eq!(err.to_string(), "password must be at least 6 characters");
    }

    #[test]
    fn update_checks_only_present_fields() {
        assert!(UpdateUser::default().validate().is_ok());
        assert!(UpdateUser { name: Some("Ana".into()), ..Default::default() }
            .validate()
            .is_ok());
        assert!(UpdateUser { email: Some("bad".into()), ..Default::default() }
            .validate()
            .is_err());
        assert!(UpdateUser { password: Some("123".into()), ..Default::default() }
            .validate()
            .is_err());
    }

    #[test]
    fn update_rejects_blank_name_or_username() {
        let err = UpdateUser { name: Some(String::new()), ..Default::default() }
            .validate()
            .unwrap_err();
        assert_eq!(err.to_string(), "name is required");

        let err = UpdateUser { username: Some("  ".into()), ..Default::default() }
            .validate()
            .unwrap_err();
        assert_eq!(err.to_string(), "username is required");
    }

    #[test]
    fn unique_fields_touched_on_presence() {
        assert!(!UpdateUser { name: Some("x".into()), ..Default::default() }.touches_unique_fields());
        assert!(UpdateUser { username: Some("x".into()), ..Default::default() }.touches_unique_fields());
        assert!(UpdateUser { email: Some("x@y.z".into()), ..Default::default() }.touches_unique_fields());
    }
}
