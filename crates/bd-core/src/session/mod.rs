//! Client session state containers.
//!
//! One [`Session`] handle holds the auth token, current user, active
//! company/branch and the permission set. It is passed explicitly to the
//! code that needs it; there is no process-wide singleton. Only the auth
//! flow (login/logout) writes; everything else reads.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::RwLock;

use crate::ports::CredentialsPort;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveCompany {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveBranch {
    pub id: String,
    pub name: String,
}

/// Permission names granted to the current user, replaced wholesale on
/// login.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet(HashSet<String>);

impl PermissionSet {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn can(&self, permission: &str) -> bool {
        self.0.contains(permission)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Default)]
struct SessionState {
    token: Option<String>,
    user: Option<CurrentUser>,
    company: Option<ActiveCompany>,
    branch: Option<ActiveBranch>,
    permissions: PermissionSet,
}

/// Shared client session. Cheap to clone behind an `Arc`; all accessors
/// take snapshots so no lock is held across an await.
#[derive(Debug, Default)]
pub struct Session {
    state: RwLock<SessionState>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login(&self, token: String, user: CurrentUser, permissions: PermissionSet) {
        let mut state = self.write();
        state.token = Some(token);
        state.user = Some(user);
        state.permissions = permissions;
    }

    /// Clears everything, including the active company/branch selection.
    pub fn logout(&self) {
        *self.write() = SessionState::default();
    }

    pub fn set_active_company(&self, company: Option<ActiveCompany>) {
        self.write().company = company;
    }

    pub fn set_active_branch(&self, branch: Option<ActiveBranch>) {
        self.write().branch = branch;
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().token.is_some()
    }

    pub fn current_user(&self) -> Option<CurrentUser> {
        self.read().user.clone()
    }

    pub fn active_company(&self) -> Option<ActiveCompany> {
        self.read().company.clone()
    }

    pub fn active_branch(&self) -> Option<ActiveBranch> {
        self.read().branch.clone()
    }

    pub fn can(&self, permission: &str) -> bool {
        self.read().permissions.can(permission)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl CredentialsPort for Session {
    /// Read at call time so a token refresh is seen by the next request.
    fn bearer_token(&self) -> Option<String> {
        self.read().token.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> CurrentUser {
        CurrentUser {
            id: "u1".to_string(),
            name: "Alex".to_string(),
            email: None,
        }
    }

    #[test]
    fn login_sets_token_and_permissions() {
        let session = Session::new();
        assert!(!session.is_authenticated());

        session.login(
            "tok-1".to_string(),
            user(),
            PermissionSet::from_names(["branch.edit"]),
        );

        assert!(session.is_authenticated());
        assert_eq!(session.bearer_token().as_deref(), Some("tok-1"));
        assert!(session.can("branch.edit"));
        assert!(!session.can("invoice.delete"));
    }

    #[test]
    fn logout_clears_all_state() {
        let session = Session::new();
        session.login("tok".to_string(), user(), PermissionSet::default());
        session.set_active_branch(Some(ActiveBranch {
            id: "b1".to_string(),
            name: "Main".to_string(),
        }));

        session.logout();

        assert!(!session.is_authenticated());
        assert!(session.bearer_token().is_none());
        assert!(session.active_branch().is_none());
    }

    #[test]
    fn token_is_read_per_call_not_cached() {
        let session = Session::new();
        session.login("old".to_string(), user(), PermissionSet::default());
        assert_eq!(session.bearer_token().as_deref(), Some("old"));

        session.login("new".to_string(), user(), PermissionSet::default());
        assert_eq!(session.bearer_token().as_deref(), Some("new"));
    }
}
