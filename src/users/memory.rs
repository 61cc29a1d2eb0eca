use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::users::repo::{StoreResult, UserStore};
use crate::users::repo_types::{NewUser, User};

#[derive(Debug, Default)]
struct Rows {
    next_id: i64,
    by_id: BTreeMap<i64, User>,
}

/// In-memory UserStore for tests and local runs.
///
/// Has no unique index: two rows may share a username or email if the caller
/// lets them through.
#[derive(Clone, Debug, Default)]
pub struct InMemoryUserStore {
    rows: Arc<Mutex<Rows>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn rows(&self) -> StoreResult<MutexGuard<'_, Rows>> {
        self.rows
            .lock()
            .map_err(|_| anyhow::anyhow!("user store lock poisoned").into())
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: NewUser) -> StoreResult<User> {
        let mut rows = self.rows()?;
        rows.next_id += 1;
        let now = OffsetDateTime::now_utc();
        let stored = User {
            id: rows.next_id,
            name: user.name,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        rows.by_id.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.rows()?.by_id.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .rows()?
            .by_id
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .rows()?
            .by_id
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_all(&self) -> StoreResult<Vec<User>> {
        Ok(self.rows()?.by_id.values().cloned().collect())
    }

    async fn save(&self, mut user: User) -> StoreResult<User> {
        let mut rows = self.rows()?;
        user.updated_at = OffsetDateTime::now_utc();
        rows.next_id = rows.next_id.max(user.id);
        rows.by_id.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, user: &User) -> StoreResult<()> {
        self.rows()?.by_id.remove(&user.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            name: "Test User".into(),
            username: username.into(),
            email: email.into(),
            password_hash: "hash".into(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids_and_timestamps() {
        let store = InMemoryUserStore::new();
        let a = store.insert(new_user("a", "a@x.io")).await.unwrap();
        let b = store.insert(new_user("b", "b@x.io")).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(a.created_at, a.updated_at);
    }

    #[tokio::test]
    async fn lookups_by_each_key() {
        let store = InMemoryUserStore::new();
        let a = store.insert(new_user("a", "a@x.io")).await.unwrap();

        assert_eq!(store.find_by_id(a.id).await.unwrap(), Some(a.clone()));
        assert_eq!(store.find_by_username("a").await.unwrap(), Some(a.clone()));
        assert_eq!(store.find_by_email("a@x.io").await.unwrap(), Some(a));
        assert!(store.find_by_id(99).await.unwrap().is_none());
        assert!(store.find_by_username("zz").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_replaces_row_and_delete_removes_it() {
        let store = InMemoryUserStore::new();
        let mut a = store.insert(new_user("a", "a@x.io")).await.unwrap();
        a.name = "Renamed".into();
        let saved = store.save(a.clone()).await.unwrap();
        assert_eq!(saved.name, "Renamed");
        assert_eq!(store.find_all().await.unwrap().len(), 1);

        store.delete(&saved).await.unwrap();
        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn does_not_enforce_uniqueness() {
        let store = InMemoryUserStore::new();
        store.insert(new_user("dup", "one@x.io")).await.unwrap();
        store.insert(new_user("dup", "two@x.io")).await.unwrap();
        assert_eq!(store.find_all().await.unwrap().len(), 2);
    }
}
