use crate::{
    database::UserStore,
    models::{RegisterForm, User},
    utils::AppError,
};
use bcrypt::{hash, verify};
use chrono::Utc;

/// Work factor used when nothing else is configured.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

// Verify credentials
pub async fn authenticate(
    store: &dyn UserStore,
    email: &str,
    password: &str,
) -> Result<User, AppError> {
    // Registration stores the trimmed address
    let user = store
        .find_by_email(email.trim())
        .await
        .ok_or(AppError::NoSuchUser)?;

    let password = password.to_string();
    let stored_hash = user.password_hash.clone();

    // bcrypt is CPU-bound; keep it off the async workers
    let valid = tokio::task::spawn_blocking(move || verify(&password, &stored_hash))
        .await
        .map_err(|e| AppError::AuthenticatorError(format!("Verification task failed: {}", e)))?
        .map_err(|e| AppError::AuthenticatorError(format!("Password verification error: {}", e)))?;

    if !valid {
        return Err(AppError::BadPassword);
    }

    Ok(user)
}

fn required(field: &Option<String>, trim: bool) -> Result<String, AppError> {
    let value = field.as_deref().unwrap_or_default();
    let value = if trim { value.trim() } else { value };
    if value.is_empty() {
        return Err(AppError::MissingField);
    }
    Ok(value.to_string())
}

// User registration
pub async fn register(
    store: &dyn UserStore,
    form: &RegisterForm,
    cost: u32,
) -> Result<User, AppError> {
    let name = required(&form.name, true)?;
    let email = required(&form.email, true)?;
    let password = required(&form.password, false)?;

    if store.find_by_email(&email).await.is_some() || store.find_by_name(&name).await.is_some() {
        return Err(AppError::DuplicateUser);
    }

    let password_hash = tokio::task::spawn_blocking(move || hash(password, cost))
        .await
        .map_err(|e| AppError::AuthenticatorError(format!("Hashing task failed: {}", e)))?
        .map_err(|e| AppError::AuthenticatorError(format!("Failed to hash password: {}", e)))?;

    let user = User::new(name, email, password_hash, Utc::now());

    // The store re-checks uniqueness under its write lock
    let stored = store.append(user).await?;

    log::info!("✅ User registered successfully: {} (id: {})", stored.email, stored.id);

    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;

    // bcrypt's lowest accepted cost keeps the tests fast
    const TEST_COST: u32 = 4;

    fn form(name: &str, email: &str, password: &str) -> RegisterForm {
        RegisterForm {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    #[tokio::test]
    async fn test_register_hashes_password() {
        let store = MemoryStore::new();
        let user = register(&store, &form("Ann", "ann@x.com", "secret1"), TEST_COST)
            .await
            .unwrap();

        assert_ne!(user.password_hash, "secret1");
        assert!(user.password_hash.starts_with("$2"));
        assert!(user.last_access.is_none());
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn test_authenticate_accepts_right_password() {
        let store = MemoryStore::new();
        register(&store, &form("Ann", "ann@x.com", "secret1"), TEST_COST)
            .await
            .unwrap();

        let user = authenticate(&store, "ann@x.com", "secret1").await.unwrap();
        assert_eq!(user.name, "Ann");
    }

    #[tokio::test]
    async fn test_authenticate_rejects_wrong_password() {
        let store = MemoryStore::new();
        register(&store, &form("Ann", "ann@x.com", "secret1"), TEST_COST)
            .await
            .unwrap();

        let result = authenticate(&store, "ann@x.com", "wrong").await;
        assert!(matches!(result, Err(AppError::BadPassword)));
    }

    #[tokio::test]
    async fn test_authenticate_trims_email_like_register() {
        let store = MemoryStore::new();
        register(&store, &form("Ann", " ann@x.com ", "secret1"), TEST_COST)
            .await
            .unwrap();
        assert!(store.find_by_email("ann@x.com").await.is_some());

        let user = authenticate(&store, "  ann@x.com", "secret1").await.unwrap();
        assert_eq!(user.email, "ann@x.com");
    }

    #[tokio::test]
    async fn test_authenticate_unknown_email() {
        let store = MemoryStore::new();
        let result = authenticate(&store, "ghost@x.com", "whatever").await;
        assert!(matches!(result, Err(AppError::NoSuchUser)));
    }

    #[tokio::test]
    async fn test_corrupt_hash_is_authenticator_error() {
        let store = MemoryStore::new();
        store
            .append(User::new(
                "Ann".to_string(),
                "ann@x.com".to_string(),
                "not-a-bcrypt-hash".to_string(),
                Utc::now(),
            ))
            .await
            .unwrap();

        let result = authenticate(&store, "ann@x.com", "secret1").await;
        assert!(matches!(result, Err(AppError::AuthenticatorError(_))));
    }

    #[tokio::test]
    async fn test_register_requires_every_field() {
        let store = MemoryStore::new();

        let blank_name = register(&store, &form("  ", "ann@x.com", "secret1"), TEST_COST).await;
        assert!(matches!(blank_name, Err(AppError::MissingField)));

        let no_password = RegisterForm {
            name: Some("Ann".to_string()),
            email: Some("ann@x.com".to_string()),
            password: None,
        };
        let result = register(&store, &no_password, TEST_COST).await;
        assert!(matches!(result, Err(AppError::MissingField)));

        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn test_register_same_email_twice() {
        let store = MemoryStore::new();
        register(&store, &form("Ann", "ann@x.com", "secret1"), TEST_COST)
            .await
            .unwrap();

        let second = register(&store, &form("Annie", "ann@x.com", "secret2"), TEST_COST).await;
        assert!(matches!(second, Err(AppError::DuplicateUser)));
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn test_register_storage_failure() {
        let store = MemoryStore::failing();
        let result = register(&store, &form("Ann", "ann@x.com", "secret1"), TEST_COST).await;
        assert!(matches!(result, Err(AppError::StorageError(_))));
    }
}
