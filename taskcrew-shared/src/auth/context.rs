/// Verified identity attached to every operation
///
/// An `AuthContext` exists only after the caller's signed assertion has been
/// verified; every engine operation takes one. It carries the principal's id
/// and role, and nothing an operation could use without having authenticated.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::token::Claims;
use crate::models::principal::{PrincipalRef, Role};

/// Authentication context for a single request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated principal ID
    pub principal_id: Uuid,

    /// Principal role, as asserted at authentication time
    pub role: Role,
}

impl AuthContext {
    /// Builds a context directly from a principal id and role
    ///
    /// Used by tests and by in-process callers that already hold a verified
    /// identity.
    pub fn new(principal_id: Uuid, role: Role) -> Self {
        Self { principal_id, role }
    }

    /// Builds a context from verified assertion claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            principal_id: claims.sub,
            role: claims.role,
        }
    }

    /// Whether the actor is an admin
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether the actor is a manager
    pub fn is_manager(&self) -> bool {
        self.role == Role::Manager
    }

    /// Whether the actor is an employee
    pub fn is_employee(&self) -> bool {
        self.role == Role::Employee
    }

    /// Typed reference to the acting principal
    pub fn actor_ref(&self) -> PrincipalRef {
        match self.role {
            Role::Admin => PrincipalRef::Admin(self.principal_id),
            Role::Manager => PrincipalRef::Manager(self.principal_id),
            Role::Employee => PrincipalRef::Employee(self.principal_id),
        }
    }
}
