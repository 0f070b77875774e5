use crate::models::{NewUser, User, UserId};
use crate::services::{StoreError, UserStore};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// In-process user store
///
/// Users are built completely before being pushed under the write lock, and
/// readers clone the whole list under the read lock, so every snapshot is
/// consistent.
pub struct MemoryUserStore {
    state: RwLock<MemoryState>,
}

struct MemoryState {
    users: Vec<User>,
    next_id: UserId,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState {
                users: Vec::new(),
                next_id: 1,
            }),
        }
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryState {
    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.users
            .iter()
            .any(|u| u.email == email && Some(u.user_id) != except)
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut state = self.state.write().await;

        if state.email_taken(&new_user.email, None) {
            return Err(StoreError::DuplicateEmail(new_user.email));
        }

        let user = User::from_new(state.next_id, new_user, chrono::Utc::now());
        state.next_id += 1;
        state.users.push(user.clone());

        tracing::debug!("Stored user {} in memory", user.user_id);
        Ok(user)
    }

    async fn replace_user(&self, user_id: UserId, new_user: NewUser) -> Result<User, StoreError> {
        let mut state = self.state.write().await;

        let index = state
            .users
            .iter()
            .position(|u| u.user_id == user_id)
            .ok_or(StoreError::NotFound(user_id))?;

        if state.email_taken(&new_user.email, Some(user_id)) {
            return Err(StoreError::DuplicateEmail(new_user.email));
        }

        let created_at = state.users[index].created_at;
        let user = User::from_new(user_id, new_user, created_at);
        state.users[index] = user.clone();

        Ok(user)
    }

    async fn get_user(&self, user_id: UserId) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.user_id == user_id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state.users.clone())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str, email: &str, offered: &[&str]) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
            skills_offered: offered.iter().map(|s| s.to_string()).collect(),
            skills_needed: vec![],
            location: None,
            bio: None,
        }
    }

    #[tokio::test]
    async fn test_ids_assigned_in_order() {
        let store = MemoryUserStore::new();

        let first = store.create_user(new_user("Ada", "ada@example.com", &[])).await.unwrap();
        let second = store.create_user(new_user("Bob", "bob@example.com", &[])).await.unwrap();

        assert_eq!(first.user_id, 1);
        assert_eq!(second.user_id, 2);

        let users = store.list_users().await.unwrap();
        let ids: Vec<i64> = users.iter().map(|u| u.user_id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryUserStore::new();
        store.create_user(new_user("Ada", "ada@example.com", &[])).await.unwrap();

        let result = store.create_user(new_user("Other", "ada@example.com", &[])).await;

        assert!(matches!(result, Err(StoreError::DuplicateEmail(_))));
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_replace_keeps_id_and_created_at() {
        let store = MemoryUserStore::new();
        let original = store
            .create_user(new_user("Ada", "ada@example.com", &["go"]))
            .await
            .unwrap();

        let replaced = store
            .replace_user(original.user_id, new_user("Ada L.", "ada@example.com", &["rust"]))
            .await
            .unwrap();

        assert_eq!(replaced.user_id, original.user_id);
        assert_eq!(replaced.created_at, original.created_at);
        assert_eq!(replaced.skills_offered, vec!["rust"]);

        let fetched = store.get_user(original.user_id).await.unwrap().unwrap();
        assert_eq!(fetched, replaced);
    }

    #[tokio::test]
    async fn test_replace_missing_user() {
        let store = MemoryUserStore::new();
        let result = store.replace_user(5, new_user("Ada", "ada@example.com", &[])).await;
        assert!(matches!(result, Err(StoreError::NotFound(5))));
    }

    #[tokio::test]
    async fn test_replace_cannot_steal_email() {
        let store = MemoryUserStore::new();
        store.create_user(new_user("Ada", "ada@example.com", &[])).await.unwrap();
        let bob = store.create_user(new_user("Bob", "bob@example.com", &[])).await.unwrap();

        let result = store
            .replace_user(bob.user_id, new_user("Bob", "ada@example.com", &[]))
            .await;
        assert!(matches!(result, Err(StoreError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_get_unknown_user() {
        let store = MemoryUserStore::new();
        assert!(store.get_user(1).await.unwrap().is_none());
    }
}
