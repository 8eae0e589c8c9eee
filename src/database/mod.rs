use crate::models::User;
use crate::utils::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

#[cfg(test)]
pub mod memory;

/// Storage seam for user records. Handlers only see this trait, so the
/// JSON file can be swapped for a real datastore (or a test fake).
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Option<User>;

    async fn find_by_name(&self, name: &str) -> Option<User>;

    async fn find_by_id(&self, id: &str) -> Option<User>;

    /// Appends a record and persists the whole collection.
    ///
    /// Name and email uniqueness is enforced here, under the same lock as the
    /// write, so two racing registrations cannot both land. A colliding id is
    /// bumped; the stored record is returned.
    async fn append(&self, user: User) -> Result<User, AppError>;

    async fn persist(&self) -> Result<(), AppError>;

    /// Records the last authenticated access. In memory only; it reaches
    /// disk with the next append.
    async fn touch(&self, id: &str, at: DateTime<Utc>) -> Result<(), AppError>;

    async fn count(&self) -> usize;
}

/// Rejects a candidate whose name or email is taken and moves its id past
/// any existing one.
pub(crate) fn admit(users: &[User], user: &mut User) -> Result<(), AppError> {
    if users
        .iter()
        .any(|u| u.email == user.email || u.name == user.name)
    {
        return Err(AppError::DuplicateUser);
    }

    while users.iter().any(|u| u.id == user.id) {
        user.id = match user.id.parse::<i64>() {
            Ok(n) => (n + 1).to_string(),
            Err(_) => format!("{}-1", user.id),
        };
    }

    Ok(())
}

/// User table backed by a single pretty-printed JSON array.
pub struct JsonFileStore {
    path: PathBuf,
    users: RwLock<Vec<User>>,
}

impl JsonFileStore {
    /// Reads the whole file into memory. A missing or malformed file is an
    /// error; the caller treats it as fatal.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();

        let raw = tokio::fs::read_to_string(&path).await.map_err(|e| {
            AppError::StorageError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let users: Vec<User> = serde_json::from_str(&raw).map_err(|e| {
            AppError::StorageError(format!("Malformed users file {}: {}", path.display(), e))
        })?;

        log::info!("📂 Loaded {} users from {}", users.len(), path.display());

        Ok(Self {
            path,
            users: RwLock::new(users),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write_file(&self, users: &[User]) -> Result<(), AppError> {
        let json = serde_json::to_string_pretty(users)
            .map_err(|e| AppError::StorageError(format!("Failed to serialize users: {}", e)))?;

        tokio::fs::write(&self.path, json).await.map_err(|e| {
            AppError::StorageError(format!("Failed to write {}: {}", self.path.display(), e))
        })
    }
}

#[async_trait]
impl UserStore for JsonFileStore {
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

        users.push(user.clone());

        if let Err(e) = self.write_file(&users).await {
            // Keep memory in step with disk
            users.pop();
            return Err(e);
        }

        log::debug!("💾 Persisted {} users to {}", users.len(), self.path.display());
        Ok(user)
    }

    async fn persist(&self) -> Result<(), AppError> {
        let users = self.users.read().await;
        self.write_file(&users).await
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
