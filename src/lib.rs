//! User accounts and password login.
//!
//! ```text
//! handlers ──► UserAccountService ──► UserStore (PostgreSQL / in-memory)
//!          │          │
//!          │          └──► PasswordHasher (argon2)
//!          └► AuthService ──► UserAccountService, PasswordHasher, TokenIssuer (JWT)
//! ```

pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod state;
pub mod users;

pub use auth::services::AuthService;
pub use error::{ServiceError, ServiceResult};
pub use users::repo_types::{SafeUser, User};
pub use users::services::UserAccountService;
