use super::user::UserRole;

/// The signed-in operator.
///
/// Passed explicitly to the transport (bearer token) and to route/action
/// gates instead of living in global state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    pub roles: Vec<UserRole>,
    pub permissions: Vec<String>,
}

impl Session {
    pub fn has_role(&self, role: UserRole) -> bool {
        self.roles.contains(&role)
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}
