use std::fmt;

use cadence_types::models::UserRecord;

/// User and token only ever exist together.
#[derive(Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    LoggedOut,
    LoggedIn { user: UserRecord, token: String },
}

impl SessionState {
    pub fn is_logged_in(&self) -> bool {
        matches!(self, SessionState::LoggedIn { .. })
    }
}

// Keeps the token out of logs.
impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::LoggedOut => f.write_str("LoggedOut"),
            SessionState::LoggedIn { user, .. } => f
                .debug_struct("LoggedIn")
                .field("user", user)
                .field("token", &"<redacted>")
                .finish(),
        }
    }
}

/// What consumers see: the state plus whether the startup restore is still
/// pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub is_loading: bool,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            state: SessionState::LoggedOut,
            is_loading: true,
        }
    }
}

impl SessionSnapshot {
    pub fn current_user(&self) -> Option<&UserRecord> {
        match &self.state {
            SessionState::LoggedIn { user, .. } => Some(user),
            SessionState::LoggedOut => None,
        }
    }

    pub fn bearer_token(&self) -> Option<&str> {
        match &self.state {
            SessionState::LoggedIn { token, .. } => Some(token),
            SessionState::LoggedOut => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_logged_in()
    }

    pub fn is_admin(&self) -> bool {
        self.current_user().is_some_and(UserRecord::is_admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_types::models::Role;

    fn logged_in(role: Role) -> SessionSnapshot {
        SessionSnapshot {
            state: SessionState::LoggedIn {
                user: UserRecord::new("u1", "ana", role),
                token: "tok123".into(),
            },
            is_loading: false,
        }
    }

    #[test]
    fn starts_loading_and_logged_out() {
        let snap = SessionSnapshot::default();
        assert!(snap.is_loading);
        assert!(!snap.is_authenticated());
        assert!(!snap.is_admin());
        assert!(snap.current_user().is_none());
        assert!(snap.bearer_token().is_none());
    }

    #[test]
    fn admin_requires_exact_role() {
        assert!(logged_in(Role::Admin).is_admin());
        assert!(!logged_in(Role::User).is_admin());
        assert!(!logged_in(Role::Other("admin".into())).is_admin());
        assert!(!logged_in(Role::Other("Admin".into())).is_admin());
    }

    #[test]
    fn debug_hides_token() {
        let rendered = format!("{:?}", logged_in(Role::User));
        assert!(rendered.contains("ana"));
        assert!(!rendered.contains("tok123"));
    }
}
