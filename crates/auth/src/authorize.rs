use std::collections::HashSet;

use thiserror::Error;

use crate::{Permission, PrincipalId, Role};

/// A fully resolved principal for authorization decisions.
///
/// Construction of this object is decoupled from storage and transport: the
/// request layer derives roles/permissions from its session and hands the
/// result to the sync layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub principal_id: PrincipalId,
    pub roles: Vec<Role>,
    /// Permissions granted directly, on top of those implied by `roles`.
    pub permissions: Vec<Permission>,
}

impl Principal {
    pub fn new(principal_id: PrincipalId) -> Self {
        Self {
            principal_id,
            roles: Vec::new(),
            permissions: Vec::new(),
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.push(role);
        self
    }

    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permissions.push(permission);
        self
    }

    /// Direct permissions plus everything implied by roles.
    pub fn effective_permissions(&self) -> HashSet<Permission> {
        self.roles
            .iter()
            .flat_map(Role::permissions)
            .chain(self.permissions.iter().cloned())
            .collect()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("unauthenticated")]
    Unauthenticated,

    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Authorize a principal for a single permission.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    let perms = principal.effective_permissions();

    if perms.contains(&Permission::WILDCARD) || perms.contains(required) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

/// Precondition checked before any remote call of a catalog operation.
pub trait PermissionGuard: Send + Sync {
    fn require(&self, permission: &Permission) -> Result<(), AuthzError>;
}

impl PermissionGuard for Principal {
    fn require(&self, permission: &Permission) -> Result<(), AuthzError> {
        authorize(self, permission).inspect_err(|e| {
            tracing::debug!(principal = %self.principal_id, error = %e, "permission denied");
        })
    }
}

/// `None` models a request without an authenticated session.
impl PermissionGuard for Option<Principal> {
    fn require(&self, permission: &Permission) -> Result<(), AuthzError> {
        match self {
            Some(principal) => principal.require(permission),
            None => Err(AuthzError::Unauthenticated),
        }
    }
}
