/// Task lifecycle engine
///
/// Owns task creation, status transitions, visibility-scoped listing, and
/// comments. The authorization gate runs before every operation; the
/// transition table in `TaskStatus::can_transition_to` runs before any status
/// write.
///
/// # Denormalized counters
///
/// Transitioning into `completed` bumps the assignee's `completed_tasks`
/// counter and reopening decrements it; adding a comment bumps the task's
/// `comments_count`. Both are best-effort caches: the counter write is a
/// separate store call from the task write, with no cross-record atomicity,
/// and may transiently drift under concurrent writers. `reconcile_counters`
/// recomputes them from the authoritative records; aggregates never read
/// them.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskcrew_engine::lifecycle::{Lifecycle, TaskFilter};
/// use taskcrew_engine::roster::Roster;
/// use taskcrew_shared::auth::context::AuthContext;
/// use taskcrew_shared::models::principal::Role;
/// use taskcrew_shared::models::task::TaskStatus;
/// use taskcrew_shared::store::MemoryStore;
/// use uuid::Uuid;
///
/// # async fn example(task_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let store = Arc::new(MemoryStore::new());
/// let lifecycle = Lifecycle::new(store.clone(), Roster::new(store));
///
/// let manager = AuthContext::new(Uuid::new_v4(), Role::Manager);
/// let task = lifecycle.update_status(&manager, task_id, TaskStatus::InProgress).await?;
/// let mine = lifecycle.list_tasks(&manager, &TaskFilter::default()).await?;
/// # Ok(())
/// # }
/// ```
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use taskcrew_shared::auth::authorization::{can_view, require, Action, Supervision};
use taskcrew_shared::auth::context::AuthContext;
use taskcrew_shared::error::{CoreResult, Error};
use taskcrew_shared::models::comment::{Comment, CommentInput};
use taskcrew_shared::models::principal::Principal;
use taskcrew_shared::models::task::{
    Assignee, CreateTaskInput, Creator, Task, TaskPriority, TaskStatus, UpdateTaskInput,
};
use taskcrew_shared::store::Store;

use crate::roster::Roster;

/// Listing filters; all criteria are conjunctive
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskFilter {
    /// Only tasks in this status
    pub status: Option<TaskStatus>,

    /// Only tasks at this priority
    pub priority: Option<TaskPriority>,

    /// Only tasks assigned to this principal
    pub assignee: Option<Uuid>,

    /// Only tasks carrying this tag
    pub tag: Option<String>,
}

impl TaskFilter {
    fn matches(&self, task: &Task) -> bool {
        if let Some(status) = self.status {
            if task.status != status {
                return false;
            }
        }
        if let Some(priority) = self.priority {
            if task.priority != priority {
                return false;
            }
        }
        if let Some(assignee) = self.assignee {
            if task.assignee.id() != assignee {
                return false;
            }
        }
        if let Some(ref tag) = self.tag {
            if !task.tags.iter().any(|t| t == tag) {
                return false;
            }
        }
        true
    }
}

/// Outcome of a counter reconciliation pass
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    /// Principals whose completed-task counter was corrected
    pub principals_adjusted: u32,

    /// Tasks whose comment counter was corrected
    pub tasks_adjusted: u32,
}

/// Task lifecycle service
#[derive(Clone)]
pub struct Lifecycle {
    store: Arc<dyn Store>,
    roster: Roster,
}

impl Lifecycle {
    /// Creates a lifecycle engine over the given store
    pub fn new(store: Arc<dyn Store>, roster: Roster) -> Self {
        Lifecycle { store, roster }
    }

    /// Creates a task
    ///
    /// Admins assign to managers only; managers assign to employees in groups
    /// they supervise, or to themself. The assignee must exist, be of the
    /// kind the reference claims, and be active.
    ///
    /// # Errors
    ///
    /// - `Forbidden` when the creator/assignee pairing breaks the role rules
    /// - `Validation` for bad fields or an unusable assignee
    pub async fn create_task(
        &self,
        actor: &AuthContext,
        input: CreateTaskInput,
    ) -> CoreResult<Task> {
        input.validate()?;

        let supervision = self.roster.supervision_for(actor).await?;
        require(
            actor,
            &Action::CreateTask {
                assignee: &input.assignee,
            },
            &supervision,
        )?;

        self.check_assignee(&input.assignee).await?;

        let created_by = if actor.role.can_administer() {
            Creator::Admin(actor.principal_id)
        } else {
            Creator::Manager(actor.principal_id)
        };

        let task = Task::new(&input, created_by);
        let task = self.store.insert_task(task).await?;

        tracing::info!(
            task_id = %task.id,
            assignee = %task.assignee.id(),
            priority = task.priority.as_str(),
            created_by = %actor.principal_id,
            "task created"
        );

        Ok(task)
    }

    /// Changes a task's status
    ///
    /// Only the assignee, the creator, or an admin may transition a task, and
    /// only along the transition table. Entering `completed` stamps
    /// `completed_at` and bumps the assignee's completed-task counter;
    /// reopening clears the stamp and decrements the counter.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the task does not exist
    /// - `Forbidden` for actors outside assignee/creator/admin
    /// - `InvalidTransition` for edges outside the table
    pub async fn update_status(
        &self,
        actor: &AuthContext,
        task_id: Uuid,
        new_status: TaskStatus,
    ) -> CoreResult<Task> {
        let mut task = self.get_unchecked(task_id).await?;

        require(
            actor,
            &Action::TransitionTask { task: &task },
            &Supervision::none(),
        )?;

        let old_status = task.status;
        if !old_status.can_transition_to(new_status) {
            return Err(Error::InvalidTransition {
                from: old_status,
                to: new_status,
            });
        }

        task.status = new_status;
        task.updated_at = Utc::now();

        if new_status == TaskStatus::Completed {
            task.completed_at = Some(task.updated_at);
        } else if old_status == TaskStatus::Completed {
            // Reopened
            task.completed_at = None;
        }

        let task = self.store.update_task(task).await?;

        // Counter cache moves are best-effort and never fail the transition
        if new_status == TaskStatus::Completed {
            self.shift_completed_counter(&task, 1).await;
        } else if old_status == TaskStatus::Completed {
            self.shift_completed_counter(&task, -1).await;
        }

        tracing::info!(
            task_id = %task.id,
            from = old_status.as_str(),
            to = new_status.as_str(),
            actor = %actor.principal_id,
            "task status changed"
        );

        Ok(task)
    }

    /// Edits a task's fields (creator or admin)
    pub async fn update_task(
        &self,
        actor: &AuthContext,
        task_id: Uuid,
        input: UpdateTaskInput,
    ) -> CoreResult<Task> {
        input.validate()?;

        let mut task = self.get_unchecked(task_id).await?;
        require(actor, &Action::EditTask { task: &task }, &Supervision::none())?;

        if let Some(title) = input.title {
            task.title = title;
        }
        if let Some(description) = input.description {
            task.description = description;
        }
        if let Some(priority) = input.priority {
            task.priority = priority;
        }
        if let Some(due_date) = input.due_date {
            task.due_date = due_date;
        }
        if let Some(estimated_hours) = input.estimated_hours {
            task.estimated_hours = Some(estimated_hours);
        }
        if let Some(actual_hours) = input.actual_hours {
            task.actual_hours = Some(actual_hours);
        }
        if let Some(tags) = input.tags {
            task.tags = tags;
        }
        task.updated_at = Utc::now();

        let task = self.store.update_task(task).await?;
        tracing::info!(task_id = %task.id, actor = %actor.principal_id, "task updated");
        Ok(task)
    }

    /// Fetches a single task within the actor's visibility scope
    pub async fn get_task(&self, actor: &AuthContext, task_id: Uuid) -> CoreResult<Task> {
        let task = self.get_unchecked(task_id).await?;
        let supervision = self.roster.supervision_for(actor).await?;
        require(actor, &Action::ViewTask { task: &task }, &supervision)?;
        Ok(task)
    }

    /// Lists tasks within the actor's visibility scope
    ///
    /// Admin sees all tasks; a manager sees tasks they created plus tasks
    /// assigned to themself or to employees they supervise; an employee sees
    /// only tasks assigned to them. One supervision snapshot covers the whole
    /// listing.
    pub async fn list_tasks(
        &self,
        actor: &AuthContext,
        filter: &TaskFilter,
    ) -> CoreResult<Vec<Task>> {
        let supervision = self.roster.supervision_for(actor).await?;
        let tasks = self.store.list_tasks().await?;

        Ok(tasks
            .into_iter()
            .filter(|task| can_view(actor, task, &supervision))
            .filter(|task| filter.matches(task))
            .collect())
    }

    /// Adds a comment to a task the actor can read
    pub async fn add_comment(
        &self,
        actor: &AuthContext,
        task_id: Uuid,
        input: CommentInput,
    ) -> CoreResult<Comment> {
        input.validate()?;

        let mut task = self.get_unchecked(task_id).await?;
        let supervision = self.roster.supervision_for(actor).await?;
        require(actor, &Action::Comment { task: &task }, &supervision)?;

        let comment = Comment::new(task_id, actor.actor_ref(), &input);
        let comment = self.store.insert_comment(comment).await?;

        // Best-effort comment counter bump
        task.comments_count = task.comments_count.saturating_add(1);
        task.updated_at = Utc::now();
        if let Err(e) = self.store.update_task(task).await {
            tracing::warn!(task_id = %task_id, error = %e, "failed to bump comment counter");
        }

        tracing::info!(task_id = %task_id, comment_id = %comment.id, "comment added");
        Ok(comment)
    }

    /// Edits a comment's body (author only); marks it edited
    pub async fn edit_comment(
        &self,
        actor: &AuthContext,
        comment_id: Uuid,
        input: CommentInput,
    ) -> CoreResult<Comment> {
        input.validate()?;

        let mut comment = self
            .store
            .find_comment(comment_id)
            .await?
            .ok_or_else(|| Error::not_found("comment", comment_id))?;
        if comment.author.id() != actor.principal_id {
            return Err(Error::Forbidden(
                "only the author may edit a comment".to_string(),
            ));
        }

        comment.edit(input.body);
        let comment = self.store.update_comment(comment).await?;
        Ok(comment)
    }

    /// Lists a task's comments, oldest first, within visibility scope
    pub async fn comments(&self, actor: &AuthContext, task_id: Uuid) -> CoreResult<Vec<Comment>> {
        let task = self.get_unchecked(task_id).await?;
        let supervision = self.roster.supervision_for(actor).await?;
        require(actor, &Action::ViewTask { task: &task }, &supervision)?;

        Ok(self.store.list_comments(task_id).await?)
    }

    /// Recomputes every denormalized counter from authoritative records
    ///
    /// Admin only. Corrects `completed_tasks` on each principal and
    /// `comments_count` on each task; reports how many records moved.
    pub async fn reconcile_counters(&self, actor: &AuthContext) -> CoreResult<ReconcileReport> {
        require(actor, &Action::ReconcileCounters, &Supervision::none())?;

        let tasks = self.store.list_tasks().await?;
        let principals = self.store.list_principals().await?;

        let mut principals_adjusted = 0u32;
        for principal in principals {
            let actual = tasks
                .iter()
                .filter(|t| t.status == TaskStatus::Completed && t.assignee.id() == principal.id)
                .count() as u32;
            if principal.completed_tasks != actual {
                let mut corrected = principal;
                corrected.completed_tasks = actual;
                corrected.updated_at = Utc::now();
                self.store.update_principal(corrected).await?;
                principals_adjusted += 1;
            }
        }

        let mut tasks_adjusted = 0u32;
        for task in tasks {
            let actual = self.store.list_comments(task.id).await?.len() as u32;
            if task.comments_count != actual {
                let mut corrected = task;
                corrected.comments_count = actual;
                corrected.updated_at = Utc::now();
                self.store.update_task(corrected).await?;
                tasks_adjusted += 1;
            }
        }

        tracing::info!(principals_adjusted, tasks_adjusted, "counters reconciled");
        Ok(ReconcileReport {
            principals_adjusted,
            tasks_adjusted,
        })
    }

    async fn get_unchecked(&self, task_id: Uuid) -> CoreResult<Task> {
        self.store
            .find_task(task_id)
            .await?
            .ok_or_else(|| Error::not_found("task", task_id))
    }

    async fn check_assignee(&self, assignee: &Assignee) -> CoreResult<()> {
        let principal: Option<Principal> = self.store.find_principal(assignee.id()).await?;
        let principal = principal
            .ok_or_else(|| Error::validation("assignee", "assignee does not exist"))?;

        if !assignee.matches(&principal) {
            return Err(Error::validation(
                "assignee",
                &format!(
                    "assignee reference says {} but the record is a {}",
                    assignee.role(),
                    principal.role
                ),
            ));
        }

        if !principal.is_active() {
            return Err(Error::validation("assignee", "assignee is not active"));
        }

        Ok(())
    }

    async fn shift_completed_counter(&self, task: &Task, delta: i32) {
        let result = async {
            let principal = self.store.find_principal(task.assignee.id()).await?;
            if let Some(mut principal) = principal {
                principal.completed_tasks = if delta >= 0 {
                    principal.completed_tasks.saturating_add(delta as u32)
                } else {
                    principal.completed_tasks.saturating_sub((-delta) as u32)
                };
                principal.updated_at = Utc::now();
                self.store.update_principal(principal).await?;
            }
            Ok::<(), Error>(())
        }
        .await;

        if let Err(e) = result {
            tracing::warn!(
                task_id = %task.id,
                assignee = %task.assignee.id(),
                error = %e,
                "failed to move completed-task counter"
            );
        }
    }
}
