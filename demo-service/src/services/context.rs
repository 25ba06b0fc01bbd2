//! Application context and the in-memory user store

use super::User;
use service_trace::OperationError;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Application context captured by the operations
#[derive(Clone, Default)]
pub struct AppContext {
    /// User store
    pub db: DbService,
}

impl AppContext {
    pub fn new() -> Self {
        Self {
            db: DbService::new(),
        }
    }
}

/// Async-safe user store using tokio::sync::RwLock
///
/// Reads run concurrently; writes take exclusive access.
#[derive(Clone)]
pub struct DbService {
    users: Arc<RwLock<Vec<User>>>,
    next_id: Arc<RwLock<u32>>,
}

impl DbService {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(vec![
                User::new(1, "Alice", "alice@example.com", "wonderland"),
                User::new(2, "Bob", "bob@example.com", "builder"),
            ])),
            next_id: Arc::new(RwLock::new(3)),
        }
    }

    /// Get a user by ID
    pub async fn get_user(&self, id: u32) -> Option<User> {
        let users = self.users.read().await;
        users.iter().find(|u| u.id == id).cloned()
    }

    /// List all users
    pub async fn list_users(&self) -> Vec<User> {
        self.users.read().await.clone()
    }

    /// Create a new user; emails are unique
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, OperationError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email.eq_ignore_ascii_case(email)) {
            return Err(OperationError::conflict(format!(
                "email '{}' is already registered",
                email
            ))
            .with_details(serde_json::json!({ "email": email })));
        }

        let mut next_id = self.next_id.write().await;
        let user = User::new(*next_id, name, email, password);
        *next_id += 1;
        users.push(user.clone());
        Ok(user)
    }

    /// Find the user with matching credentials
    pub async fn authenticate(&self, email: &str, password: &str) -> Option<User> {
        let users = self.users.read().await;
        users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email) && u.password == password)
            .cloned()
    }

    /// Delete a user by ID
    pub async fn delete_user(&self, id: u32) -> bool {
        let mut users = self.users.write().await;
        let len = users.len();
        users.retain(|u| u.id != id);
        users.len() < len
    }

    /// Count total users
    pub async fn count_users(&self) -> u32 {
        self.users.read().await.len() as u32
    }
}

impl Default for DbService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[tokio::test]
    async fn test_seeded_users() {
        let db = DbService::new();
        assert_eq!(db.count_users().await, 2);
        assert_eq!(db.get_user(1).await.map(|u| u.name), Some("Alice".to_string()));
        assert!(db.get_user(99).await.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let db = DbService::new();
        let err = db
            .create_user("Alice2", "ALICE@example.com", "pw")
            .await
            .unwrap_err();
        assert_eq!(err.code, service_trace::ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn test_authenticate() {
        let db = DbService::new();
        assert!(db.authenticate("bob@example.com", "builder").await.is_some());
        assert!(db.authenticate("bob@example.com", "wrong").await.is_none());
    }

    // =============================================================================
    // Property-Based Tests
    // =============================================================================

    proptest! {
        /// Property: concurrent creates hand out unique ids.
        #[test]
        fn prop_concurrent_creates_get_unique_ids(writers in 1usize..10) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let ids = rt.block_on(async {
                let db = DbService::new();
                let handles: Vec<_> = (0..writers)
                    .map(|i| {
                        let db = db.clone();
                        tokio::spawn(async move {
                            db.create_user(&format!("User{}", i), &format!("user{}@test.com", i), "pw")
                                .await
                                .map(|u| u.id)
                        })
                    })
                    .collect();

                let mut ids = Vec::new();
                for handle in handles {
                    ids.push(handle.await.unwrap().unwrap());
                }
                ids
            });

            let unique: HashSet<_> = ids.iter().copied().collect();
            prop_assert_eq!(unique.len(), writers);
            prop_assert!(ids.iter().all(|id| *id >= 3));
        }
    }
}
