/// Authorization helpers for role-gated operations
///
/// tickdesk has a flat two-role model: `admin` and `user`. A gated operation
/// names the role it requires and the check is plain equality against the
/// authenticated context — there is no hierarchy and no resource-level
/// permission table.
///
/// # Example
///
/// ```
/// use tickdesk_shared::auth::authorization::require_role;
/// use tickdesk_shared::auth::middleware::AuthContext;
/// use tickdesk_shared::models::user::UserRole;
///
/// # fn example(auth: &AuthContext) -> Result<(), Box<dyn std::error::Error>> {
/// require_role(auth, UserRole::Admin)?;
/// # Ok(())
/// # }
/// ```

use uuid::Uuid;

use super::middleware::AuthContext;
use crate::models::user::UserRole;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Authenticated identity does not carry the required role
    #[error("Insufficient permissions: requires {required:?}, has {actual:?}")]
    InsufficientRole {
        required: UserRole,
        actual: UserRole,
    },

    /// Authenticated identity does not own the resource
    #[error("Not authorized to access this resource")]
    NotAuthorized,
}

/// Checks whether an identity carries a role
pub fn has_role(auth: &AuthContext, required: UserRole) -> bool {
    auth.role == required
}

/// Requires an exact role on the authenticated identity
///
/// # Errors
///
/// Returns `AuthzError::InsufficientRole` on a mismatch
pub fn require_role(auth: &AuthContext, required: UserRole) -> Result<(), AuthzError> {
    if !has_role(auth, required) {
        return Err(AuthzError::InsufficientRole {
            required,
            actual: auth.role,
        });
    }

    Ok(())
}

/// Requires the admin role; shorthand for the user-management surface
pub fn require_admin(auth: &AuthContext) -> Result<(), AuthzError> {
    require_role(auth, UserRole::Admin)
}

/// Requires that the identity owns a resource
///
/// Used by the ticket endpoints so one user cannot edit another's tickets.
pub fn require_ownership(auth: &AuthContext, resource_owner_id: Uuid) -> Result<(), AuthzError> {
    if auth.user_id != resource_owner_id {
        return Err(AuthzError::NotAuthorized);
    }

    Ok(())
}
