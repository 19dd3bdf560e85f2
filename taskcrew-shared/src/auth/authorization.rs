/// Authorization gate
///
/// A single composable rule set: `authorize(ctx, action, supervision)`
/// returns `Allow` or `Deny` and is evaluated before every operation. The
/// function is pure: facts that live in the store (which employees the
/// actor supervises) are computed once per request by the roster and passed
/// in as a `Supervision` snapshot, so one snapshot serves a whole logical
/// operation and the rules stay independently testable.
///
/// # Rule Summary
///
/// | action            | admin | manager                           | employee       |
/// |-------------------|-------|-----------------------------------|----------------|
/// | create task       | → manager assignee only | → supervised employee, or self | never |
/// | transition task   | yes   | assignee or creator               | assignee       |
/// | edit task         | yes   | creator                           | never          |
/// | view task         | all   | created, self-assigned, or team   | own assigned   |
/// | comment           | read access to the task                            ||
/// | manage groups     | yes   | no                                | no             |
/// | approve accounts  | yes   | no                                | no             |
/// | view workload     | any   | self or supervised                | self           |
/// | system overview   | yes   | no                                | no             |
///
/// # Example
///
/// ```
/// use taskcrew_shared::auth::authorization::{authorize, Action, Supervision};
/// use taskcrew_shared::auth::context::AuthContext;
/// use taskcrew_shared::models::principal::Role;
/// use taskcrew_shared::models::task::Assignee;
/// use uuid::Uuid;
///
/// let admin = AuthContext::new(Uuid::new_v4(), Role::Admin);
/// let assignee = Assignee::Employee(Uuid::new_v4());
///
/// // Admins assign work to managers, never directly to employees
/// let decision = authorize(&admin, &Action::CreateTask { assignee: &assignee }, &Supervision::none());
/// assert!(!decision.is_allow());
/// ```
use std::collections::HashSet;
use uuid::Uuid;

use super::context::AuthContext;
use crate::error::{CoreResult, Error};
use crate::models::task::{Assignee, Task};

/// Membership snapshot for the acting principal
///
/// The set of employee ids the actor supervises through group membership.
/// Empty for admins and employees. Built once per request; callers must not
/// assume two snapshots taken at different times agree.
#[derive(Debug, Clone, Default)]
pub struct Supervision {
    employees: HashSet<Uuid>,
}

impl Supervision {
    /// Empty snapshot, for actors that supervise nobody
    pub fn none() -> Self {
        Self::default()
    }

    /// Snapshot over the given employee ids
    pub fn over(employees: HashSet<Uuid>) -> Self {
        Self { employees }
    }

    /// Checks whether the actor supervises the given employee
    pub fn supervises(&self, employee_id: Uuid) -> bool {
        self.employees.contains(&employee_id)
    }

    /// Number of supervised employees
    pub fn len(&self) -> usize {
        self.employees.len()
    }

    /// Whether the actor supervises nobody
    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }
}

/// Authorization outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The action may proceed
    Allow,

    /// The action is denied, with the rule that denied it
    Deny(String),
}

impl Decision {
    /// Whether the action was allowed
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    fn deny(reason: &str) -> Self {
        Decision::Deny(reason.to_string())
    }
}

/// Action under authorization
#[derive(Debug)]
pub enum Action<'a> {
    /// Create a task with the given assignee
    CreateTask {
        /// Proposed assignee
        assignee: &'a Assignee,
    },

    /// Change a task's status
    TransitionTask {
        /// Task being transitioned
        task: &'a Task,
    },

    /// Edit a task's fields
    EditTask {
        /// Task being edited
        task: &'a Task,
    },

    /// Read a single task
    ViewTask {
        /// Task being read
        task: &'a Task,
    },

    /// Comment on a task (requires read access)
    Comment {
        /// Task being commented on
        task: &'a Task,
    },

    /// Create, edit, or delete groups and their member sets
    ManageGroups,

    /// Promote pending principals or deactivate accounts
    ApproveAccounts,

    /// Read workload/performance metrics for a principal
    ViewWorkload {
        /// Principal whose metrics are requested
        subject: Uuid,
    },

    /// Read the system-wide task report
    SystemOverview,

    /// Recompute denormalized counters from authoritative records
    ReconcileCounters,
}

/// Evaluates the rule set for one action
pub fn authorize(ctx: &AuthContext, action: &Action<'_>, supervision: &Supervision) -> Decision {
    match action {
        Action::CreateTask { assignee } => authorize_create(ctx, assignee, supervision),

        Action::TransitionTask { task } => {
            if ctx.is_admin()
                || task.assignee.id() == ctx.principal_id
                || task.created_by.id() == ctx.principal_id
            {
                Decision::Allow
            } else {
                Decision::deny("only the assignee, the creator, or an admin may change status")
            }
        }

        Action::EditTask { task } => {
            if ctx.is_admin() || task.created_by.id() == ctx.principal_id {
                Decision::Allow
            } else {
                Decision::deny("only the creator or an admin may edit a task")
            }
        }

        Action::ViewTask { task } | Action::Comment { task } => {
            if can_view(ctx, task, supervision) {
                Decision::Allow
            } else {
                Decision::deny("task is outside the actor's visibility scope")
            }
        }

        Action::ManageGroups => {
            if ctx.is_admin() {
                Decision::Allow
            } else {
                Decision::deny("only admins manage groups")
            }
        }

        Action::ApproveAccounts => {
            if ctx.is_admin() {
                Decision::Allow
            } else {
                Decision::deny("only admins approve or deactivate accounts")
            }
        }

        Action::ViewWorkload { subject } => {
            if ctx.is_admin() || *subject == ctx.principal_id {
                Decision::Allow
            } else if ctx.is_manager() && supervision.supervises(*subject) {
                Decision::Allow
            } else {
                Decision::deny("workload is visible to the principal, their manager, and admins")
            }
        }

        Action::SystemOverview => {
            if ctx.is_admin() {
                Decision::Allow
            } else {
                Decision::deny("only admins read the system overview")
            }
        }

        Action::ReconcileCounters => {
            if ctx.is_admin() {
                Decision::Allow
            } else {
                Decision::deny("only admins reconcile counters")
            }
        }
    }
}

/// Evaluates the gate and converts a denial into `Error::Forbidden`
pub fn require(ctx: &AuthContext, action: &Action<'_>, supervision: &Supervision) -> CoreResult<()> {
    match authorize(ctx, action, supervision) {
        Decision::Allow => Ok(()),
        Decision::Deny(reason) => {
            tracing::debug!(
                principal_id = %ctx.principal_id,
                role = %ctx.role,
                action = ?action,
                %reason,
                "authorization denied"
            );
            Err(Error::Forbidden(reason))
        }
    }
}

fn authorize_create(ctx: &AuthContext, assignee: &Assignee, supervision: &Supervision) -> Decision {
    if ctx.is_admin() {
        return match assignee {
            Assignee::Manager(_) => Decision::Allow,
            Assignee::Employee(_) => {
                Decision::deny("admins assign work to managers, not directly to employees")
            }
        };
    }

    if ctx.is_manager() {
        return match assignee {
            Assignee::Employee(employee_id) => {
                if supervision.supervises(*employee_id) {
                    Decision::Allow
                } else {
                    Decision::deny("assignee is not in any group this manager supervises")
                }
            }
            Assignee::Manager(manager_id) => {
                if *manager_id == ctx.principal_id {
                    Decision::Allow
                } else {
                    Decision::deny("managers may only self-assign manager tasks")
                }
            }
        };
    }

    Decision::deny("employees may not create tasks")
}

/// Visibility scope shared by `ViewTask`, `Comment`, and task listing
///
/// Admin sees everything; a manager sees tasks they created, tasks assigned
/// to themself, and tasks assigned to employees they supervise; an employee
/// sees only their own assigned tasks.
pub fn can_view(ctx: &AuthContext, task: &Task, supervision: &Supervision) -> bool {
    if ctx.is_admin() {
        return true;
    }

    if ctx.is_manager() {
        if task.created_by.id() == ctx.principal_id {
            return true;
        }
        return match task.assignee {
            Assignee::Manager(id) => id == ctx.principal_id,
            Assignee::Employee(id) => supervision.supervises(id),
        };
    }

    matches!(task.assignee, Assignee::Employee(id) if id == ctx.principal_id)
}
