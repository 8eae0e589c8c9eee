use chrono::{DateTime, Utc};

/// Server-side session payload, keyed by the opaque `sid` cookie.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Option<String>,
    pub last_access: DateTime<Utc>,
    pub flash: Vec<String>,
}

impl Session {
    pub fn anonymous(now: DateTime<Utc>) -> Self {
        Self {
            user_id: None,
            last_access: now,
            flash: Vec::new(),
        }
    }

    pub fn for_user(user_id: String, now: DateTime<Utc>) -> Self {
        Self {
            user_id: Some(user_id),
            last_access: now,
            flash: Vec::new(),
        }
    }
}

/// Inserted into request extensions by the session gate.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub session_id: String,
    pub user_id: String,
}
