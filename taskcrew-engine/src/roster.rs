/// Group roster: group administration and manager resolution
///
/// Groups are the sole mechanism by which an employee acquires a supervising
/// manager. All mutation is admin-only. Resolution is read-only, side-effect
/// free, and safe under concurrent group edits; a call may observe a
/// membership snapshot that changes immediately after, so anything that needs
/// consistent facts across one logical operation takes a single
/// [`Supervision`] snapshot and passes it forward.
///
/// Two membership notions exist and they are not the same:
///
/// - **Supervision** (authorization): manager M supervises employee E when E
///   belongs to *any* group that lists M among its managers. Used for task
///   visibility and assignment rights.
/// - **Resolution** (reporting): E's single supervising manager is the first
///   manager of the first group containing E, in the store's stable
///   `(created_at, id)` enumeration order. If that group has no manager, E
///   resolves to nobody; later groups are not consulted. Used to build a
///   manager's team for workload aggregation.
///
/// [`Supervision`]: taskcrew_shared::auth::authorization::Supervision
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use chrono::Utc;
use taskcrew_shared::auth::authorization::{require, Action, Supervision};
use taskcrew_shared::auth::context::AuthContext;
use taskcrew_shared::error::{CoreResult, Error};
use taskcrew_shared::models::group::{CreateGroupInput, Group, UpdateGroupInput};
use taskcrew_shared::models::principal::Role;
use taskcrew_shared::store::Store;

/// Group roster service
#[derive(Clone)]
pub struct Roster {
    store: Arc<dyn Store>,
}

impl Roster {
    /// Creates a roster over the given store
    pub fn new(store: Arc<dyn Store>) -> Self {
        Roster { store }
    }

    /// Creates a group (admin only)
    ///
    /// # Errors
    ///
    /// - `Validation` for bad fields or member ids of the wrong kind
    /// - `Conflict` if the name is already taken; the existing group is
    ///   untouched
    pub async fn create_group(
        &self,
        actor: &AuthContext,
        input: CreateGroupInput,
    ) -> CoreResult<Group> {
        require(actor, &Action::ManageGroups, &Supervision::none())?;
        input.validate()?;
        self.check_members(&input.managers, &input.employees).await?;

        let group = Group::new(&input, actor.principal_id);
        let group = self.store.insert_group(group).await?;

        tracing::info!(
            group_id = %group.id,
            name = %group.name,
            members = group.total_members(),
            "group created"
        );

        Ok(group)
    }

    /// Renames or re-describes a group (admin only)
    pub async fn update_group(
        &self,
        actor: &AuthContext,
        group_id: Uuid,
        input: UpdateGroupInput,
    ) -> CoreResult<Group> {
        require(actor, &Action::ManageGroups, &Supervision::none())?;
        input.validate()?;

        let mut group = self.get(group_id).await?;
        if let Some(name) = input.name {
            group.name = name;
        }
        if let Some(description) = input.description {
            group.description = description;
        }
        group.updated_at = Utc::now();

        let group = self.store.update_group(group).await?;
        tracing::info!(group_id = %group.id, name = %group.name, "group updated");
        Ok(group)
    }

    /// Deletes a group (admin only)
    pub async fn delete_group(&self, actor: &AuthContext, group_id: Uuid) -> CoreResult<()> {
        require(actor, &Action::ManageGroups, &Supervision::none())?;

        if !self.store.delete_group(group_id).await? {
            return Err(Error::not_found("group", group_id));
        }

        tracing::info!(group_id = %group_id, "group deleted");
        Ok(())
    }

    /// Adds managers and employees to a group (admin only)
    ///
    /// Ids already present are skipped; every id must reference an existing
    /// principal of the matching kind.
    pub async fn add_members(
        &self,
        actor: &AuthContext,
        group_id: Uuid,
        managers: &[Uuid],
        employees: &[Uuid],
    ) -> CoreResult<Group> {
        require(actor, &Action::ManageGroups, &Supervision::none())?;
        self.check_members(managers, employees).await?;

        let mut group = self.get(group_id).await?;
        group.add_members(managers, employees);
        let group = self.store.update_group(group).await?;

        tracing::info!(group_id = %group.id, members = group.total_members(), "members added");
        Ok(group)
    }

    /// Removes managers and employees from a group (admin only)
    ///
    /// Absent ids are ignored.
    pub async fn remove_members(
        &self,
        actor: &AuthContext,
        group_id: Uuid,
        managers: &[Uuid],
        employees: &[Uuid],
    ) -> CoreResult<Group> {
        require(actor, &Action::ManageGroups, &Supervision::none())?;

        let mut group = self.get(group_id).await?;
        group.remove_members(managers, employees);
        let group = self.store.update_group(group).await?;

        tracing::info!(group_id = %group.id, members = group.total_members(), "members removed");
        Ok(group)
    }

    /// Fetches a group by id
    pub async fn get(&self, group_id: Uuid) -> CoreResult<Group> {
        self.store
            .find_group(group_id)
            .await?
            .ok_or_else(|| Error::not_found("group", group_id))
    }

    /// Lists every group in stable enumeration order
    pub async fn list(&self) -> CoreResult<Vec<Group>> {
        Ok(self.store.list_groups().await?)
    }

    /// Resolves an employee's supervising manager
    ///
    /// The first group (stable enumeration order) whose employee set contains
    /// the id wins; the result is that group's first-listed manager, or None
    /// when the employee belongs to no group or the winning group has no
    /// manager.
    pub async fn resolve_manager(&self, employee_id: Uuid) -> CoreResult<Option<Uuid>> {
        let groups = self.store.list_groups().await?;
        Ok(groups
            .iter()
            .find(|g| g.has_employee(employee_id))
            .and_then(|g| g.first_manager()))
    }

    /// All employees that resolve to the given manager
    ///
    /// This is the manager's team for workload aggregation: exactly those
    /// employees whose winning group has the manager listed first.
    pub async fn team_of(&self, manager_id: Uuid) -> CoreResult<Vec<Uuid>> {
        let groups = self.store.list_groups().await?;
        let mut seen: HashSet<Uuid> = HashSet::new();
        let mut team = Vec::new();

        for group in &groups {
            for employee_id in &group.employees {
                // First group containing the employee wins
                if !seen.insert(*employee_id) {
                    continue;
                }
                if group.first_manager() == Some(manager_id) {
                    team.push(*employee_id);
                }
            }
        }

        Ok(team)
    }

    /// All employees the given manager supervises through any group
    ///
    /// This is the authorization notion: membership in any group that lists
    /// the manager, regardless of position in the managers list.
    pub async fn supervised_employees(&self, manager_id: Uuid) -> CoreResult<HashSet<Uuid>> {
        let groups = self.store.list_groups().await?;
        let mut employees = HashSet::new();
        for group in groups.iter().filter(|g| g.has_manager(manager_id)) {
            employees.extend(group.employees.iter().copied());
        }
        Ok(employees)
    }

    /// Builds the actor's supervision snapshot for one logical operation
    ///
    /// Empty for everyone but managers. Callers pass the same snapshot
    /// through authorization and filtering rather than re-reading memberships
    /// mid-operation.
    pub async fn supervision_for(&self, actor: &AuthContext) -> CoreResult<Supervision> {
        if actor.role != Role::Manager {
            return Ok(Supervision::none());
        }
        let employees = self.supervised_employees(actor.principal_id).await?;
        Ok(Supervision::over(employees))
    }

    async fn check_members(&self, managers: &[Uuid], employees: &[Uuid]) -> CoreResult<()> {
        for id in managers {
            let principal = self
                .store
                .find_principal(*id)
                .await?
                .ok_or_else(|| Error::validation("managers", &format!("principal {} does not exist", id)))?;
            if principal.role != Role::Manager {
                return Err(Error::validation(
                    "managers",
                    &format!("principal {} is not a manager", id),
                ));
            }
        }
        for id in employees {
            let principal = self
                .store
                .find_principal(*id)
                .await?
                .ok_or_else(|| Error::validation("employees", &format!("principal {} does not exist", id)))?;
            if principal.role != Role::Employee {
                return Err(Error::validation(
                    "employees",
                    &format!("principal {} is not an employee", id),
                ));
            }
        }
        Ok(())
    }
}
