use super::session::Session;
use super::user::UserRole;

/// Role/permission requirement of a route or an in-page action.
///
/// Every non-empty list must intersect the session's set; an empty gate
/// lets any signed-in operator through. This only decides what the UI
/// offers; the backend enforces authorization on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gate {
    pub roles: &'static [UserRole],
    pub permissions: &'static [&'static str],
}

impl Gate {
    pub const OPEN: Gate = Gate {
        roles: &[],
        permissions: &[],
    };
    pub const ADMIN: Gate = Gate::roles(&[UserRole::Admin]);
    pub const ADMIN_OR_STAFF: Gate = Gate::roles(&[UserRole::Admin, UserRole::Staff]);

    pub const fn roles(roles: &'static [UserRole]) -> Self {
        Gate {
            roles,
            permissions: &[],
        }
    }

    pub const fn with_permissions(self, permissions: &'static [&'static str]) -> Self {
        Gate {
            roles: self.roles,
            permissions,
        }
    }

    pub fn allows(&self, session: &Session) -> bool {
        let role_ok = self.roles.is_empty() || self.roles.iter().any(|r| session.has_role(*r));
        let permission_ok = self.permissions.is_empty()
            || self.permissions.iter().any(|p| session.has_permission(p));
        role_ok && permission_ok
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrudAction {
    Create,
    Edit,
    Delete,
}

impl CrudAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrudAction::Create => "create",
            CrudAction::Edit => "edit",
            CrudAction::Delete => "delete",
        }
    }
}

/// Gates for the buttons a list page exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionGates {
    pub create: Gate,
    pub edit: Gate,
    pub delete: Gate,
}

impl ActionGates {
    pub const fn uniform(gate: Gate) -> Self {
        Self {
            create: gate,
            edit: gate,
            delete: gate,
        }
    }

    pub fn for_action(&self, action: CrudAction) -> &Gate {
        match action {
            CrudAction::Create => &self.create,
            CrudAction::Edit => &self.edit,
            CrudAction::Delete => &self.delete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(roles: Vec<UserRole>, permissions: &[&str]) -> Session {
        Session {
            token: "t".into(),
            user_id: "u-1".into(),
            email: "ops@example.com".into(),
            display_name: "Ops".into(),
            roles,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn open_gate_allows_everyone() {
        assert!(Gate::OPEN.allows(&session(vec![], &[])));
    }

    #[test]
    fn role_must_intersect() {
        let staff = session(vec![UserRole::Staff], &[]);
        assert!(Gate::ADMIN_OR_STAFF.allows(&staff));
        assert!(!Gate::ADMIN.allows(&staff));
    }

    #[test]
    fn permissions_must_intersect_as_well() {
        let gate = Gate::ADMIN.with_permissions(&["roles.view", "users.view"]);
        assert!(gate.allows(&session(vec![UserRole::Admin], &["users.view"])));
        assert!(!gate.allows(&session(vec![UserRole::Admin], &["brand.view"])));
        assert!(!gate.allows(&session(vec![UserRole::Staff], &["users.view"])));
    }
}
