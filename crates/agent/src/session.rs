use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use carta_core::{ChatMessage, Role};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// One customer conversation. Owned exclusively by the [`SessionStore`];
/// callers only ever see snapshot clones.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub conversation_history: Vec<ChatMessage>,
    pub user_preferences: HashMap<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionStats {
    pub total_sessions: usize,
    pub active_sessions: usize,
    pub expired_sessions: usize,
    pub total_messages: usize,
    pub oldest_session: Option<DateTime<Utc>>,
    pub newest_session: Option<DateTime<Utc>>,
    pub session_timeout_minutes: i64,
}

/// In-memory session map with sliding expiration.
///
/// Expiry is always `now - last_activity > timeout`; every successful read
/// refreshes `last_activity`, so an active conversation never ages out.
/// Sessions leave the map only through [`get_session`](Self::get_session)
/// finding them expired, [`cleanup_expired`](Self::cleanup_expired), or
/// [`delete_session`](Self::delete_session).
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, Session>>>,
    timeout: Duration,
}

impl SessionStore {
    pub fn new(timeout_minutes: u64) -> Self {
        info!(timeout_minutes, "session store initialized");
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            timeout: Duration::minutes(timeout_minutes as i64),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        // A panic while holding the lock leaves plain data behind; recover
        // the map rather than poisoning every future request.
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn create_session(&self) -> String {
        let session_id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let session = Session {
            session_id: session_id.clone(),
            created_at: now,
            last_activity: now,
            conversation_history: Vec::new(),
            user_preferences: HashMap::new(),
        };

        self.lock().insert(session_id.clone(), session);
        info!(session_id = %session_id, "created new session");

        session_id
    }

    /// Look up a session, refreshing its activity timestamp. An expired
    /// session is deleted and reported as missing. This is deliberately a
    /// read with a side effect: every successful read extends the session's
    /// life.
    pub fn get_session(&self, session_id: &str) -> Option<Session> {
        let mut sessions = self.lock();
        refresh_live(&mut sessions, session_id, self.timeout).map(|session| session.clone())
    }

    /// Append a message; reports `false` instead of failing when the
    /// session is missing or expired.
    pub fn add_message(&self, session_id: &str, role: Role, content: &str) -> bool {
        let mut sessions = self.lock();
        let Some(session) = refresh_live(&mut sessions, session_id, self.timeout) else {
            warn!(session_id, "cannot add message to missing session");
            return false;
        };

        session.conversation_history.push(ChatMessage::now(role, content));
        debug!(session_id, role = role.as_str(), "recorded message");
        true
    }

    /// Conversation history in arrival order; the last `limit` messages when
    /// a limit is given.
    pub fn conversation_history(&self, session_id: &str, limit: Option<usize>) -> Vec<ChatMessage> {
        let mut sessions = self.lock();
        let Some(session) = refresh_live(&mut sessions, session_id, self.timeout) else {
            return Vec::new();
        };

        let history = &session.conversation_history;
        let start = limit.map_or(0, |limit| history.len().saturating_sub(limit));
        history[start..].to_vec()
    }

    pub fn update_preferences(&self, session_id: &str, preferences: HashMap<String, Value>) -> bool {
        let mut sessions = self.lock();
        let Some(session) = refresh_live(&mut sessions, session_id, self.timeout) else {
            return false;
        };

        session.user_preferences.extend(preferences);
        true
    }

    pub fn preferences(&self, session_id: &str) -> HashMap<String, Value> {
        let mut sessions = self.lock();
        refresh_live(&mut sessions, session_id, self.timeout)
            .map(|session| session.user_preferences.clone())
            .unwrap_or_default()
    }

    pub fn delete_session(&self, session_id: &str) -> bool {
        let removed = self.lock().remove(session_id).is_some();
        if removed {
            info!(session_id, "deleted session");
        }
        removed
    }

    /// The sweep: removes every session whose inactivity exceeds the
    /// timeout and returns how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, session| now - session.last_activity <= self.timeout);
        let removed = before - sessions.len();

        if removed > 0 {
            info!(removed, "cleaned up expired sessions");
        }
        removed
    }

    pub fn active_session_count(&self) -> usize {
        let now = Utc::now();
        self.lock().values().filter(|session| now - session.last_activity < self.timeout).count()
    }

    pub fn total_session_count(&self) -> usize {
        self.lock().len()
    }

    /// Aggregate counters. Unlike `get_session` this never refreshes
    /// activity timestamps.
    pub fn session_stats(&self) -> SessionStats {
        let now = Utc::now();
        let sessions = self.lock();

        let mut active_sessions = 0;
        let mut total_messages = 0;
        let mut oldest_session: Option<DateTime<Utc>> = None;
        let mut newest_session: Option<DateTime<Utc>> = None;

        for session in sessions.values() {
            total_messages += session.conversation_history.len();

            if now - session.last_activity < self.timeout {
                active_sessions += 1;
            }

            if oldest_session.map_or(true, |oldest| session.created_at < oldest) {
                oldest_session = Some(session.created_at);
            }
            if newest_session.map_or(true, |newest| session.created_at > newest) {
                newest_session = Some(session.created_at);
            }
        }

        SessionStats {
            total_sessions: sessions.len(),
            active_sessions,
            expired_sessions: sessions.len() - active_sessions,
            total_messages,
            oldest_session,
            newest_session,
            session_timeout_minutes: self.timeout.num_minutes(),
        }
    }

    #[cfg(test)]
    fn backdate_last_activity(&self, session_id: &str, by: Duration) -> bool {
        let mut sessions = self.lock();
        match sessions.get_mut(session_id) {
            Some(session) => {
                session.last_activity -= by;
                true
            }
            None => false,
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(60)
    }
}

fn refresh_live<'a>(
    sessions: &'a mut HashMap<String, Session>,
    session_id: &str,
    timeout: Duration,
) -> Option<&'a mut Session> {
    let expired = match sessions.get(session_id) {
        Some(session) => Utc::now() - session.last_activity > timeout,
        None => {
            warn!(session_id, "session not found");
            return None;
        }
    };

    if expired {
        sessions.remove(session_id);
        info!(session_id, "session expired");
        return None;
    }

    let session = sessions.get_mut(session_id)?;
    session.last_activity = Utc::now();
    Some(session)
}
