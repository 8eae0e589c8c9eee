//! Idle-timeout sessions kept in process memory.
//!
//! The cookie only carries an opaque id; user id, last access and pending
//! flash messages live here.

use crate::models::Session;
use actix_web::cookie::{Cookie, SameSite};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "sid";

/// Sessions idle for longer than this many whole minutes expire.
pub const IDLE_LIMIT_MINUTES: i64 = 30;

/// Expired logins stay in the map this much longer, so the owner's next
/// visit is still told the session expired instead of just bounced.
const EXPIRED_NOTICE_GRACE_MINUTES: i64 = 24 * 60;

#[derive(Debug, Clone, PartialEq)]
pub enum IdleCheck {
    Valid { refreshed: DateTime<Utc> },
    Expired { idle_minutes: i64 },
}

/// Idle-timeout policy, separate from any HTTP concern.
///
/// Elapsed time is counted in whole minutes, so exactly 30 idle minutes (and
/// anything short of 31) is still valid.
pub fn check_idle(now: DateTime<Utc>, last_access: DateTime<Utc>) -> IdleCheck {
    let idle_minutes = (now - last_access).num_minutes();
    if idle_minutes > IDLE_LIMIT_MINUTES {
        IdleCheck::Expired { idle_minutes }
    } else {
        IdleCheck::Valid { refreshed: now }
    }
}

/// Whether the purge may drop a session. Anonymous ones only carry flash
/// messages and go as soon as they are idle; logged-in ones wait out the grace.
fn is_stale(session: &Session, now: DateTime<Utc>) -> bool {
    let idle_minutes = (now - session.last_access).num_minutes();
    match session.user_id {
        None => idle_minutes > IDLE_LIMIT_MINUTES,
        Some(_) => idle_minutes > IDLE_LIMIT_MINUTES + EXPIRED_NOTICE_GRACE_MINUTES,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GateOutcome {
    Unauthenticated,
    Expired,
    Authenticated { user_id: String },
}

pub fn session_cookie(id: &str, secure: bool) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, id.to_string())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .finish()
}

#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic elsewhere must not lock everyone out
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Session>> {
        self.sessions.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Session>> {
        self.sessions.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn insert(&self, session: Session, now: DateTime<Utc>) -> String {
        let id = Uuid::new_v4().to_string();
        let mut sessions = self.write();

        let before = sessions.len();
        sessions.retain(|_, s| !is_stale(s, now));
        if sessions.len() < before {
            log::debug!("🧹 Purged {} idle sessions", before - sessions.len());
        }

        sessions.insert(id.clone(), session);
        id
    }

    #[cfg(test)]
    pub fn get(&self, id: &str) -> Option<Session> {
        self.read().get(id).cloned()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Starts an authenticated session. The previous id, if any, is dropped
    /// so a pre-login id can never become a logged-in one.
    pub fn login(&self, previous: Option<&str>, user_id: &str, now: DateTime<Utc>) -> String {
        if let Some(old) = previous {
            self.destroy(old);
        }
        self.insert(Session::for_user(user_id.to_string(), now), now)
    }

    pub fn destroy(&self, id: &str) {
        self.write().remove(id);
    }

    /// Applies the idle policy to a session and refreshes it on success.
    pub fn gate(&self, id: Option<&str>, now: DateTime<Utc>) -> GateOutcome {
        let Some(id) = id else {
            return GateOutcome::Unauthenticated;
        };

        let mut sessions = self.write();
        let Some(session) = sessions.get_mut(id) else {
            return GateOutcome::Unauthenticated;
        };
        let Some(user_id) = session.user_id.clone() else {
            return GateOutcome::Unauthenticated;
        };

        match check_idle(now, session.last_access) {
            IdleCheck::Valid { refreshed } => {
                session.last_access = refreshed;
                GateOutcome::Authenticated { user_id }
            }
            IdleCheck::Expired { idle_minutes } => {
                sessions.remove(id);
                log::info!("⏰ Session expired for user {} after {} idle minutes", user_id, idle_minutes);
                GateOutcome::Expired
            }
        }
    }

    /// Queues a flash message. Returns the session id holding it, which is a
    /// new anonymous session when `id` is absent or unknown.
    pub fn push_flash(&self, id: Option<&str>, message: &str, now: DateTime<Utc>) -> String {
        if let Some(id) = id {
            if let Some(session) = self.write().get_mut(id) {
                session.flash.push(message.to_string());
                return id.to_string();
            }
        }

        let mut session = Session::anonymous(now);
        session.flash.push(message.to_string());
        self.insert(session, now)
    }

    /// Returns the first pending message and clears the rest.
    pub fn take_flash(&self, id: Option<&str>) -> Option<String> {
        let id = id?;
        let mut sessions = self.write();
        let session = sessions.get_mut(id)?;
        let mut pending = std::mem::take(&mut session.flash).into_iter();
        pending.next()
    }

    #[cfg(test)]
    pub fn set_last_access(&self, id: &str, at: DateTime<Utc>) {
        if let Some(session) = self.write().get_mut(id) {
            session.last_access = at;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(minute: i64, second: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap()
            + Duration::minutes(minute)
            + Duration::seconds(second)
    }

    #[test]
    fn test_exactly_thirty_minutes_is_valid() {
        assert_eq!(check_idle(at(30, 0), at(0, 0)), IdleCheck::Valid { refreshed: at(30, 0) });
        assert_eq!(check_idle(at(30, 59), at(0, 0)), IdleCheck::Valid { refreshed: at(30, 59) });
    }

    #[test]
    fn test_thirty_one_minutes_expires() {
        assert_eq!(check_idle(at(31, 0), at(0, 0)), IdleCheck::Expired { idle_minutes: 31 });
    }

    #[test]
    fn test_gate_without_session() {
        let store = SessionStore::new();
        assert_eq!(store.gate(None, at(0, 0)), GateOutcome::Unauthenticated);
        assert_eq!(store.gate(Some("unknown"), at(0, 0)), GateOutcome::Unauthenticated);
    }

    #[test]
    fn test_gate_anonymous_session() {
        let store = SessionStore::new();
        let id = store.push_flash(None, "hello", at(0, 0));
        assert_eq!(store.gate(Some(&id), at(1, 0)), GateOutcome::Unauthenticated);
    }

    #[test]
    fn test_activity_keeps_session_alive() {
        let store = SessionStore::new();
        let id = store.login(None, "42", at(0, 0));

        // Four hours of visits, 25 minutes apart
        for step in 1..=10 {
            let outcome = store.gate(Some(&id), at(step * 25, 0));
            assert_eq!(outcome, GateOutcome::Authenticated { user_id: "42".to_string() });
        }
        assert_eq!(store.get(&id).unwrap().last_access, at(250, 0));
    }

    #[test]
    fn test_idle_session_expires_and_is_removed() {
        let store = SessionStore::new();
        let id = store.login(None, "42", at(0, 0));

        assert_eq!(store.gate(Some(&id), at(31, 0)), GateOutcome::Expired);
        assert!(store.get(&id).is_none());
        assert_eq!(store.gate(Some(&id), at(31, 1)), GateOutcome::Unauthenticated);
    }

    #[test]
    fn test_login_replaces_previous_session() {
        let store = SessionStore::new();
        let anon = store.push_flash(None, "Invalid email or password", at(0, 0));
        let id = store.login(Some(&anon), "42", at(0, 10));

        assert_ne!(anon, id);
        assert!(store.get(&anon).is_none());
        assert!(store.get(&id).unwrap().user_id.is_some());
    }

    #[test]
    fn test_flash_is_read_once() {
        let store = SessionStore::new();
        let id = store.push_flash(None, "first", at(0, 0));
        assert_eq!(store.push_flash(Some(&id), "second", at(0, 1)), id);

        assert_eq!(store.take_flash(Some(&id)), Some("first".to_string()));
        assert_eq!(store.take_flash(Some(&id)), None);
        assert_eq!(store.take_flash(None), None);
    }

    #[test]
    fn test_new_session_purges_idle_anonymous_ones() {
        let store = SessionStore::new();
        store.push_flash(None, "old", at(0, 0));
        store.push_flash(None, "recent", at(20, 0));
        assert_eq!(store.len(), 2);

        store.push_flash(None, "new", at(45, 0));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_other_traffic_keeps_expired_login_reportable() {
        let store = SessionStore::new();
        let idle = store.login(None, "42", at(0, 0));

        // Someone else's failed login creates a session 45 minutes later
        store.push_flash(None, "Invalid email or password", at(45, 0));

        assert_eq!(store.gate(Some(&idle), at(45, 1)), GateOutcome::Expired);
    }

    #[test]
    fn test_abandoned_login_is_purged_after_grace() {
        let store = SessionStore::new();
        let idle = store.login(None, "42", at(0, 0));

        let later = IDLE_LIMIT_MINUTES + EXPIRED_NOTICE_GRACE_MINUTES + 1;
        store.login(None, "7", at(later, 0));

        assert!(store.get(&idle).is_none());
        assert_eq!(store.len(), 1);
    }
}
