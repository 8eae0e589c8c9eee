use super::{admit, UserStore};
use crate::models::User;
use crate::utils::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

/// In-memory fake used by handler and service tests.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every append fails like a full disk.
    pub fn failing() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            fail_writes: true,
        }
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Option<User> {
        self.users.read().await.iter().find(|u| u.email == email).cloned()
    }

    async fn find_by_name(&self, name: &str) -> Option<User> {
        self.users.read().await.iter().find(|u| u.name == name).cloned()
    }

    async fn find_by_id(&self, id: &str) -> Option<User> {
        self.users.read().await.iter().find(|u| u.id == id).cloned()
    }

    async fn append(&self, mut user: User) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        admit(&users, &mut user)?;
        if self.fail_writes {
            return Err(AppError::StorageError("write refused".to_string()));
        }
        users.push(user.clone());
        Ok(user)
    }

    async fn persist(&self) -> Result<(), AppError> {
        if self.fail_writes {
            return Err(AppError::StorageError("write refused".to_string()));
        }
        Ok(())
    }

    async fn touch(&self, id: &str, at: DateTime<Utc>) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(AppError::Unauthenticated)?;
        user.last_access = Some(at);
        Ok(())
    }

    async fn count(&self) -> usize {
        self.users.read().await.len()
    }
}
