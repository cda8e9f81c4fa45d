use atelier_domain::access::Permission;
use atelier_domain::user::Role;

use crate::domain::repository::AccessRepository;
use crate::domain::types::User;

/// Answers role and permission questions from the store on every call.
///
/// Fails closed: a lookup error is logged and answered with `false`.
pub struct PermissionResolver<A: AccessRepository> {
    pub access: A,
}

impl<A: AccessRepository> PermissionResolver<A> {
    pub async fn has_role(&self, user: &User, role: Role) -> bool {
        match self.access.role_of(user.id).await {
            Ok(current) => current == Some(role),
            Err(e) => {
                tracing::warn!(user_id = %user.id, role = %role, error = %e, "role lookup failed");
                false
            }
        }
    }

    pub async fn has_permission(&self, user: &User, permission: &Permission) -> bool {
        let role = match self.access.role_of(user.id).await {
            Ok(Some(role)) => role,
            Ok(None) => return false,
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "role lookup failed");
                return false;
            }
        };
        match self.access.permissions_for_role(role).await {
            Ok(granted) => granted.contains(permission),
            Err(e) => {
                tracing::warn!(
                    user_id = %user.id,
                    permission = %permission,
                    error = %e,
                    "permission lookup failed"
                );
                false
            }
        }
    }
}
