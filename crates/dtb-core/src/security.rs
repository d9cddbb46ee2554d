use crate::domain::Actor;

/// Commands anyone may run, regardless of roles.
pub const ALWAYS_ALLOWED: &[&str] = &["ping", "help"];

/// Anything that can answer "does this user hold role X?".
pub trait RoleSet {
    fn has_role(&self, role_name: &str) -> bool;
}

impl RoleSet for Actor {
    fn has_role(&self, role_name: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role_name))
    }
}

impl RoleSet for [String] {
    fn has_role(&self, role_name: &str) -> bool {
        self.iter().any(|r| r.eq_ignore_ascii_case(role_name))
    }
}

// ============== Authorization ==============

/// Role-based command gate. Pure: it never sends messages, the dispatcher
/// owns the denial reply.
#[derive(Clone, Debug)]
pub struct PermissionGuard {
    privileged_role: String,
}

impl PermissionGuard {
    pub fn new(privileged_role: impl Into<String>) -> Self {
        Self {
            privileged_role: privileged_role.into(),
        }
    }

    pub fn privileged_role(&self) -> &str {
        &self.privileged_role
    }

    pub fn authorize<R: RoleSet + ?Sized>(&self, actor: &R, command_name: &str) -> bool {
        if ALWAYS_ALLOWED.contains(&command_name) {
            return true;
        }
        actor.has_role(&self.privileged_role)
    }
}
