//! Console session state.
//!
//! One explicit context value per run of the REPL, passed into every
//! command handler; there is no global mutable session. Created on
//! startup, reset by menu choice 0, never persisted.

use uuid::Uuid;

/// The role a session is currently acting in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Company,
}

/// Per-run session context.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Opaque session token (diagnostics only).
    pub session_id: Uuid,

    /// Selected role, `None` until the user picks one.
    pub role: Option<Role>,

    /// Logged-in user identity, `None` while anonymous.
    pub user: Option<String>,
}

impl SessionContext {
    /// Fresh anonymous session.
    pub fn new() -> Self {
        SessionContext {
            session_id: Uuid::new_v4(),
            role: None,
            user: None,
        }
    }

    /// Resets role and login, keeping the session token.
    pub fn reset(&mut self) {
        self.role = None;
        self.user = None;
    }

    /// True when a user is logged in.
    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        SessionContext::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_role_and_login_but_keeps_the_token() {
        let mut session = SessionContext::new();
        let token = session.session_id;

        session.role = Some(Role::User);
        session.user = Some("alice@example.com".to_string());
        assert!(session.is_logged_in());

        session.reset();
        assert_eq!(session.role, None);
        assert!(!session.is_logged_in());
        assert_eq!(session.session_id, token);
    }
}
