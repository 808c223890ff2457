//! Process-wide session state with an init/clear lifecycle.
//!
//! The session is an explicit dependency: the transport reads the token
//! from it on every protected call and clears it on an unauthorized
//! response. Clearing is idempotent — racing 401s collapse into a single
//! listener notification.

use std::sync::{Mutex, RwLock};

use tracing::info;

use crate::util::lock::{mutex_lock, rw_read, rw_write};

const SOURCE: &str = "session";

/// Role granted by the auth endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        match value {
            "admin" => Role::Admin,
            _ => Role::User,
        }
    }
}

/// Credential and identity of the active session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub token: String,
    pub role: Role,
    pub id: i64,
    pub name: String,
}

/// Lifecycle transitions observable by UI-facing surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Activated,
    Cleared,
}

type SessionListener = Box<dyn Fn(SessionEvent) + Send + Sync>;

/// Session container: absent → active → cleared.
pub struct Session {
    state: RwLock<Option<SessionState>>,
    listeners: Mutex<Vec<SessionListener>>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(None),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Register a listener for session lifecycle events.
    ///
    /// Listeners are invoked on the task that triggered the transition and
    /// must not block.
    pub fn subscribe(&self, listener: impl Fn(SessionEvent) + Send + Sync + 'static) {
        mutex_lock(&self.listeners, SOURCE, "subscribe").push(Box::new(listener));
    }

    /// Install a fresh credential, replacing any previous one.
    pub fn activate(&self, state: SessionState) {
        info!(user = %state.name, role = state.role.as_str(), "Session activated");
        *rw_write(&self.state, SOURCE, "activate") = Some(state);
        self.notify(SessionEvent::Activated);
    }

    pub fn is_active(&self) -> bool {
        rw_read(&self.state, SOURCE, "is_active").is_some()
    }

    /// Current bearer token, if a session is active.
    pub fn token(&self) -> Option<String> {
        rw_read(&self.state, SOURCE, "token")
            .as_ref()
            .map(|state| state.token.clone())
    }

    /// Copy of the full session state, if active.
    pub fn snapshot(&self) -> Option<SessionState> {
        rw_read(&self.state, SOURCE, "snapshot").clone()
    }

    /// Clear the session. Returns true when this call performed the
    /// transition; listeners fire only then, so racing clears (two 401s,
    /// or logout racing a 401) notify exactly once.
    pub fn clear(&self) -> bool {
        let cleared = rw_write(&self.state, SOURCE, "clear").take().is_some();
        if cleared {
            info!("Session cleared");
            self.notify(SessionEvent::Cleared);
        }
        cleared
    }

    fn notify(&self, event: SessionEvent) {
        let listeners = mutex_lock(&self.listeners, SOURCE, "notify");
        for listener in listeners.iter() {
            listener(event);
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn state(token: &str) -> SessionState {
        SessionState {
            token: token.to_string(),
            role: Role::Admin,
            id: 42,
            name: "op".to_string(),
        }
    }

    #[test]
    fn lifecycle_absent_active_cleared() {
        let session = Session::new();
        assert!(!session.is_active());
        assert!(session.token().is_none());

        session.activate(state("t1"));
        assert!(session.is_active());
        assert_eq!(session.token().as_deref(), Some("t1"));

        assert!(session.clear());
        assert!(!session.is_active());
    }

    #[test]
    fn clear_notifies_exactly_once() {
        let session = Session::new();
        let cleared = Arc::new(AtomicUsize::new(0));
        let counter = cleared.clone();
        session.subscribe(move |event| {
            if event == SessionEvent::Cleared {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        session.activate(state("t1"));
        assert!(session.clear());
        assert!(!session.clear());
        assert!(!session.clear());
        assert_eq!(cleared.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn activate_replaces_previous_credential() {
        let session = Session::new();
        session.activate(state("t1"));
        session.activate(state("t2"));
        assert_eq!(session.token().as_deref(), Some("t2"));
    }

    #[test]
    fn role_parsing_defaults_to_user() {
        assert_eq!(Role::from("admin"), Role::Admin);
        assert_eq!(Role::from("user"), Role::User);
        assert_eq!(Role::from("moderator"), Role::User);
    }
}
