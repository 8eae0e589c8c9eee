use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the users file.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(alias = "password")]  // older files stored the hash under "password"
    pub password_hash: String,
    pub registered_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_access: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(name: String, email: String, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id: now.timestamp_millis().to_string(),
            name,
            email,
            password_hash,
            registered_at: now,
            last_access: None,
        }
    }
}

// Form payloads. Every field is optional so an absent field becomes
// MissingField instead of an extractor rejection.
#[derive(Debug, Deserialize, Default)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_legacy_password_key() {
        let raw = r#"{
            "id": "1700000000000",
            "name": "Ann",
            "email": "ann@x.com",
            "password": "$2b$10$abcdefghijklmnopqrstuv",
            "registeredAt": "2024-01-01T00:00:00Z"
        }"#;

        let user: User = serde_json::from_str(raw).unwrap();
        assert_eq!(user.password_hash, "$2b$10$abcdefghijklmnopqrstuv");
        assert!(user.last_access.is_none());
    }

    #[test]
    fn test_writes_camel_case_keys() {
        let user = User::new(
            "Ann".to_string(),
            "ann@x.com".to_string(),
            "hash".to_string(),
            Utc::now(),
        );
        let json = serde_json::to_value(&user).unwrap();

        assert!(json.get("passwordHash").is_some());
        assert!(json.get("registeredAt").is_some());
        assert!(json.get("lastAccess").is_none());
    }
}
