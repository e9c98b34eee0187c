//! Authentication store, persisted to the data directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::persist::{read_json, write_json, StoreError};
use crate::models::{Role, SessionUser};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct AuthState {
    is_authenticated: bool,
    user: Option<SessionUser>,
    token: Option<String>,
}

/// Session state backed by `session.json`.
#[derive(Debug, Clone, Default)]
pub struct AuthStore {
    path: Option<PathBuf>,
    state: AuthState,
}

impl AuthStore {
    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the session file at `path`. A missing file is signed out.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let state: AuthState = read_json(path)?.unwrap_or_default();
        // a token without a user is not a session
        let state = if state.token.is_some() && state.user.is_some() {
            AuthState {
                is_authenticated: true,
                ..state
            }
        } else {
            AuthState::default()
        };
        Ok(Self {
            path: Some(path.to_path_buf()),
            state,
        })
    }

    pub fn login(&mut self, user: SessionUser, token: String) -> Result<(), StoreError> {
        debug!("Session opened for {}", user.email);
        self.state = AuthState {
            is_authenticated: true,
            user: Some(user),
            token: Some(token),
        };
        self.persist()
    }

    pub fn logout(&mut self) -> Result<(), StoreError> {
        self.state = AuthState::default();
        self.persist()
    }

    fn persist(&self) -> Result<(), StoreError> {
        match self.path {
            Some(ref path) => write_json(path, &self.state),
            None => Ok(()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.state.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.state.token.as_deref()
    }

    pub fn role(&self) -> Option<Role> {
        self.state.user.as_ref().map(|u| u.role)
    }

    /// Whether the signed-in user holds any of `roles`.
    pub fn has_role(&self, roles: &[Role]) -> bool {
        self.role().is_some_and(|r| roles.contains(&r))
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> SessionUser {
        SessionUser {
            id: "7".into(),
            name: "Asha".into(),
            email: "asha@acme.in".into(),
            role,
            avatar: None,
        }
    }

    #[test]
    fn test_login_persists_and_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let mut store = AuthStore::open(&path).unwrap();
        assert!(!store.is_authenticated());
        store.login(user(Role::Admin), "server-session".into()).unwrap();

        let reopened = AuthStore::open(&path).unwrap();
        assert!(reopened.is_authenticated());
        assert_eq!(reopened.token(), Some("server-session"));
        assert!(reopened.is_admin());
    }

    #[test]
    fn test_logout_clears_file_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let mut store = AuthStore::open(&path).unwrap();
        store.login(user(Role::User), "t".into()).unwrap();
        store.logout().unwrap();

        let reopened = AuthStore::open(&path).unwrap();
        assert!(!reopened.is_authenticated());
        assert!(reopened.user().is_none());
    }

    #[test]
    fn test_has_role() {
        let mut store = AuthStore::in_memory();
        assert!(!store.has_role(&[Role::Admin, Role::User]));
        store.login(user(Role::Viewer), "t".into()).unwrap();
        assert!(store.has_role(&[Role::Viewer]));
        assert!(!store.has_role(&[Role::Admin]));
        assert!(!store.is_admin());
    }
}
