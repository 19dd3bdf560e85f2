/// Principal model: the three actor kinds and their typed references
///
/// A principal is an Admin, a Manager, or an Employee. The kind is chosen at
/// registration and is immutable for the life of the record; there is no
/// migration path between kinds. Only `Active` principals may authenticate or
/// be selected as task assignees.
///
/// # Lifecycle
///
/// ```text
/// register (admin)             -> active
/// register (manager, employee) -> pending
/// pending  --admin approval--> active
/// active   --admin action----> inactive
/// ```
///
/// # Example
///
/// ```
/// use taskcrew_shared::models::principal::{Principal, RegisterInput, Role};
///
/// let input = RegisterInput {
///     name: "Dana Reyes".to_string(),
///     email: "dana@example.com".to_string(),
///     phone: None,
///     password: "ignored-here".to_string(),
/// };
///
/// let principal = Principal::new(Role::Employee, &input, "$argon2id$...".to_string());
/// assert_eq!(principal.role, Role::Employee);
/// assert!(!principal.is_active()); // employees start pending
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Principal kind
///
/// Immutable once a principal exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full control: accounts, groups, all tasks, system reports
    Admin,

    /// Creates tasks for supervised employees, sees their team's tasks
    Manager,

    /// Works tasks assigned to them; sees nothing else
    Employee,
}

impl Role {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Employee => "employee",
        }
    }

    /// Status a freshly registered principal of this role starts in
    ///
    /// Admins are trusted at registration; managers and employees wait for
    /// admin approval.
    pub fn initial_status(&self) -> PrincipalStatus {
        match self {
            Role::Admin => PrincipalStatus::Active,
            Role::Manager | Role::Employee => PrincipalStatus::Pending,
        }
    }

    /// Can create tasks
    pub fn can_create_tasks(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }

    /// Can manage groups and approve accounts
    pub fn can_administer(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Can view every task in the system
    pub fn can_view_all_tasks(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalStatus {
    /// May authenticate and be assigned work
    Active,

    /// Registered, awaiting admin approval
    Pending,

    /// Deactivated by an admin
    Inactive,
}

impl PrincipalStatus {
    /// Converts status to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            PrincipalStatus::Active => "active",
            PrincipalStatus::Pending => "pending",
            PrincipalStatus::Inactive => "inactive",
        }
    }
}

/// A typed reference to a principal of any kind
///
/// Serialized as a `kind`/`id` pair, so the external form keeps the companion
/// type-tag shape while the in-memory form makes a tag/record mismatch
/// unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum PrincipalRef {
    /// Reference to an admin
    Admin(Uuid),

    /// Reference to a manager
    Manager(Uuid),

    /// Reference to an employee
    Employee(Uuid),
}

impl PrincipalRef {
    /// Builds a reference to the given principal record
    pub fn to(principal: &Principal) -> Self {
        match principal.role {
            Role::Admin => PrincipalRef::Admin(principal.id),
            Role::Manager => PrincipalRef::Manager(principal.id),
            Role::Employee => PrincipalRef::Employee(principal.id),
        }
    }

    /// Referenced principal id
    pub fn id(&self) -> Uuid {
        match self {
            PrincipalRef::Admin(id) | PrincipalRef::Manager(id) | PrincipalRef::Employee(id) => *id,
        }
    }

    /// Referenced principal kind
    pub fn role(&self) -> Role {
        match self {
            PrincipalRef::Admin(_) => Role::Admin,
            PrincipalRef::Manager(_) => Role::Manager,
            PrincipalRef::Employee(_) => Role::Employee,
        }
    }

    /// Checks that the reference agrees with the actual record
    pub fn matches(&self, principal: &Principal) -> bool {
        self.id() == principal.id && self.role() == principal.role
    }
}

/// Principal model
///
/// Passwords are stored as Argon2id hashes, never in plaintext.
/// `completed_tasks` is a best-effort denormalized counter; aggregates are
/// always recomputed from the task set and never read it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    /// Unique principal ID (UUID v4)
    pub id: Uuid,

    /// Principal kind, immutable after registration
    pub role: Role,

    /// Display name
    pub name: String,

    /// Email address, unique across all principals (case-insensitive)
    pub email: String,

    /// Optional contact phone
    pub phone: Option<String>,

    /// Account status
    pub status: PrincipalStatus,

    /// Argon2id password hash
    pub password_hash: String,

    /// Denormalized count of tasks this principal has completed
    ///
    /// Best-effort cache; recomputable via `Lifecycle::reconcile_counters`.
    pub completed_tasks: u32,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,

    /// When the principal last authenticated (None if never)
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Input for registering a new principal
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterInput {
    /// Display name
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,

    /// Email address
    #[validate(email(message = "invalid email format"))]
    pub email: String,

    /// Optional contact phone
    #[validate(length(max = 30, message = "phone must be at most 30 characters"))]
    pub phone: Option<String>,

    /// Plaintext password, hashed before storage and never persisted
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
}

impl Principal {
    /// Builds a new principal record from validated registration input
    ///
    /// The caller supplies the already-computed password hash; this
    /// constructor never sees plaintext handling beyond the input struct.
    pub fn new(role: Role, input: &RegisterInput, password_hash: String) -> Self {
        let now = Utc::now();
        Principal {
            id: Uuid::new_v4(),
            role,
            name: input.name.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
            status: role.initial_status(),
            password_hash,
            completed_tasks: 0,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    /// Whether the principal may authenticate or be assigned work
    pub fn is_active(&self) -> bool {
        self.status == PrincipalStatus::Active
    }

    /// Typed reference to this record
    pub fn reference(&self) -> PrincipalRef {
        PrincipalRef::to(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(email: &str) -> RegisterInput {
        RegisterInput {
            name: "Test Person".to_string(),
            email: email.to_string(),
            phone: None,
            password: "long-enough-password".to_string(),
        }
    }

    #[test]
    fn test_role_as_str() {
        assert_eq!(Role::Admin.as_str(), "admin");
        assert_eq!(Role::Manager.as_str(), "manager");
        assert_eq!(Role::Employee.as_str(), "employee");
    }

    #[test]
    fn test_initial_status_by_role() {
        assert_eq!(Role::Admin.initial_status(), PrincipalStatus::Active);
        assert_eq!(Role::Manager.initial_status(), PrincipalStatus::Pending);
        assert_eq!(Role::Employee.initial_status(), PrincipalStatus::Pending);
    }

    #[test]
    fn test_role_capabilities() {
        assert!(Role::Admin.can_create_tasks());
        assert!(Role::Manager.can_create_tasks());
        assert!(!Role::Employee.can_create_tasks());

        assert!(Role::Admin.can_administer());
        assert!(!Role::Manager.can_administer());
        assert!(!Role::Employee.can_administer());

        assert!(Role::Admin.can_view_all_tasks());
        assert!(!Role::Manager.can_view_all_tasks());
    }

    #[test]
    fn test_new_principal_defaults() {
        let admin = Principal::new(Role::Admin, &input("a@example.com"), "hash".to_string());
        assert!(admin.is_active());
        assert_eq!(admin.completed_tasks, 0);
        assert!(admin.last_login_at.is_none());

        let employee = Principal::new(Role::Employee, &input("e@example.com"), "hash".to_string());
        assert_eq!(employee.status, PrincipalStatus::Pending);
        assert!(!employee.is_active());
    }

    #[test]
    fn test_reference_matches_record() {
        let manager = Principal::new(Role::Manager, &input("m@example.com"), "hash".to_string());
        let reference = manager.reference();

        assert_eq!(reference.id(), manager.id);
        assert_eq!(reference.role(), Role::Manager);
        assert!(reference.matches(&manager));

        // A reference with the right id but wrong kind does not match
        let wrong_kind = PrincipalRef::Employee(manager.id);
        assert!(!wrong_kind.matches(&manager));
    }

    #[test]
    fn test_register_input_validation() {
        assert!(input("valid@example.com").validate().is_ok());

        let mut bad = input("not-an-email");
        assert!(bad.validate().is_err());

        bad = input("valid@example.com");
        bad.password = "short".to_string();
        assert!(bad.validate().is_err());

        bad = input("valid@example.com");
        bad.name = String::new();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_principal_ref_serialization() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(PrincipalRef::Employee(id)).unwrap();
        assert_eq!(json["kind"], "employee");
        assert_eq!(json["id"], id.to_string());

        let back: PrincipalRef = serde_json::from_value(json).unwrap();
        assert_eq!(back, PrincipalRef::Employee(id));
    }
}
