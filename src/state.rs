use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::auth::jwt::{JwtKeys, TokenIssuer};
use crate::auth::password::PasswordHasher;
use crate::auth::services::AuthService;
use crate::config::AppConfig;
use crate::users::repo::{PgUserStore, UserStore};
use crate::users::services::UserAccountService;

#[derive(Clone)]
pub struct AppState {
    pub users: UserAccountService,
    pub auth: AuthService,
}

impl AppState {
    /// Production wiring: PostgreSQL store, JWT issuer, fixed-cost hasher.
    pub fn init(config: &AppConfig, db: PgPool) -> anyhow::Result<Self> {
        let store = Arc::new(PgUserStore::new(db)) as Arc<dyn UserStore>;
        let issuer = Arc::new(JwtKeys::from(&config.jwt)) as Arc<dyn TokenIssuer>;
        Ok(Self::from_parts(store, PasswordHasher::new()?, issuer))
    }

    pub fn from_parts(
        store: Arc<dyn UserStore>,
        hasher: PasswordHasher,
        issuer: Arc<dyn TokenIssuer>,
    ) -> Self {
        let users = UserAccountService::new(store, hasher.clone());
        let auth = AuthService::new(users.clone(), hasher, issuer);
        Self { users, auth }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::config::JwtConfig;
        use crate::users::memory::InMemoryUserStore;

        let keys = JwtKeys::from(&JwtConfig {
            secret: "test".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_minutes: 5,
        });
        Self::from_parts(
            Arc::new(InMemoryUserStore::new()),
            PasswordHasher::fast(),
            Arc::new(keys),
        )
    }
}

impl FromRef<AppState> for UserAccountService {
    fn from_ref(state: &AppState) -> Self {
        state.users.clone()
    }
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}
