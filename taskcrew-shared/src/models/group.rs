/// Group model: named manager/employee collections
///
/// A group is the sole mechanism by which an employee acquires a supervising
/// manager; there is no direct employee→manager link anywhere else. Group
/// names are unique across the system. Groups are created, edited, and
/// deleted only by admins.
///
/// `total_members` is derived on read and never stored.
///
/// # Example
///
/// ```
/// use taskcrew_shared::models::group::{CreateGroupInput, Group};
/// use uuid::Uuid;
///
/// let admin = Uuid::new_v4();
/// let manager = Uuid::new_v4();
/// let employee = Uuid::new_v4();
///
/// let group = Group::new(
///     &CreateGroupInput {
///         name: "Night shift".to_string(),
///         description: String::new(),
///         managers: vec![manager],
///         employees: vec![employee],
///     },
///     admin,
/// );
///
/// assert_eq!(group.total_members(), 2);
/// assert_eq!(group.first_manager(), Some(manager));
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Group model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    /// Unique group ID (UUID v4)
    pub id: Uuid,

    /// Group name, unique across all groups
    pub name: String,

    /// Free-text description
    pub description: String,

    /// Supervising managers, in insertion order
    ///
    /// The first entry is the supervising manager resolved for the group's
    /// employees.
    pub managers: Vec<Uuid>,

    /// Member employees, in insertion order
    pub employees: Vec<Uuid>,

    /// Admin who created the group
    pub created_by: Uuid,

    /// When the group was created
    pub created_at: DateTime<Utc>,

    /// When the group was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new group
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateGroupInput {
    /// Group name
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,

    /// Free-text description
    #[serde(default)]
    #[validate(length(max = 500, message = "description must be at most 500 characters"))]
    pub description: String,

    /// Initial managers
    #[serde(default)]
    pub managers: Vec<Uuid>,

    /// Initial employees
    #[serde(default)]
    pub employees: Vec<Uuid>,
}

/// Input for editing a group's name or description
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateGroupInput {
    /// New name
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: Option<String>,

    /// New description
    #[validate(length(max = 500, message = "description must be at most 500 characters"))]
    pub description: Option<String>,
}

impl Group {
    /// Builds a new group from validated input
    pub fn new(input: &CreateGroupInput, created_by: Uuid) -> Self {
        let now = Utc::now();
        Group {
            id: Uuid::new_v4(),
            name: input.name.clone(),
            description: input.description.clone(),
            managers: input.managers.clone(),
            employees: input.employees.clone(),
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// Derived member count: managers plus employees
    pub fn total_members(&self) -> usize {
        self.managers.len() + self.employees.len()
    }

    /// Checks whether the given employee belongs to this group
    pub fn has_employee(&self, employee_id: Uuid) -> bool {
        self.employees.contains(&employee_id)
    }

    /// Checks whether the given manager supervises this group
    pub fn has_manager(&self, manager_id: Uuid) -> bool {
        self.managers.contains(&manager_id)
    }

    /// The group's supervising manager, if it has one
    pub fn first_manager(&self) -> Option<Uuid> {
        self.managers.first().copied()
    }

    /// Adds members, skipping ids already present
    pub fn add_members(&mut self, managers: &[Uuid], employees: &[Uuid]) {
        for id in managers {
            if !self.managers.contains(id) {
                self.managers.push(*id);
            }
        }
        for id in employees {
            if !self.employees.contains(id) {
                self.employees.push(*id);
            }
        }
        self.updated_at = Utc::now();
    }

    /// Removes members; absent ids are ignored
    pub fn remove_members(&mut self, managers: &[Uuid], employees: &[Uuid]) {
        self.managers.retain(|id| !managers.contains(id));
        self.employees.retain(|id| !employees.contains(id));
        self.updated_at = Utc::now();
    }
}
