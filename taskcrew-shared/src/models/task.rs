/// Task model: the central work unit and its state machine
///
/// # State Machine
///
/// ```text
/// pending ──> in-progress ──> review ──> completed
///                 ^  │  ^        │           │
///                 │  └──┼────────┘           │ (reopen)
///                 └─────┴────────────────────┘
/// pending | in-progress | review ──> cancelled
/// ```
///
/// `cancelled` is the only hard-terminal state. `completed` may be reopened
/// to `in-progress`, which clears `completed_at`. Every other pair is an
/// invalid transition and is rejected before any write happens.
///
/// `is_overdue` and `days_until_due` are derived on every read against a
/// caller-supplied clock; they are never persisted.
///
/// # Example
///
/// ```
/// use taskcrew_shared::models::task::TaskStatus;
///
/// assert!(TaskStatus::Pending.can_transition_to(TaskStatus::InProgress));
/// assert!(TaskStatus::Completed.can_transition_to(TaskStatus::InProgress));
/// assert!(!TaskStatus::Cancelled.can_transition_to(TaskStatus::Pending));
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::principal::{Principal, Role};

/// Task urgency
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    /// Can wait
    Low,

    /// Normal priority
    #[default]
    Medium,

    /// Should be picked up soon
    High,

    /// Drop everything
    Urgent,
}

impl TaskPriority {
    /// Converts priority to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Urgent => "urgent",
        }
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task lifecycle state
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Created, nobody has started it
    #[default]
    Pending,

    /// Being worked
    InProgress,

    /// Work done, awaiting sign-off
    Review,

    /// Signed off; may be reopened
    Completed,

    /// Abandoned; terminal
    Cancelled,
}

impl TaskStatus {
    /// Converts status to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Review => "review",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    /// Checks if the task is closed (completed or cancelled)
    pub fn is_closed(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Cancelled)
    }

    /// Checks if the task still counts toward someone's workload
    pub fn is_active(&self) -> bool {
        !self.is_closed()
    }

    /// Checks if transition to the target state is valid
    pub fn can_transition_to(&self, target: TaskStatus) -> bool {
        match (self, target) {
            (TaskStatus::Pending, TaskStatus::InProgress) => true,
            (TaskStatus::Pending, TaskStatus::Cancelled) => true,

            (TaskStatus::InProgress, TaskStatus::Review) => true,
            (TaskStatus::InProgress, TaskStatus::Completed) => true,
            (TaskStatus::InProgress, TaskStatus::Cancelled) => true,

            // Review can send work back or sign it off
            (TaskStatus::Review, TaskStatus::InProgress) => true,
            (TaskStatus::Review, TaskStatus::Completed) => true,
            (TaskStatus::Review, TaskStatus::Cancelled) => true,

            // Reopen clears completed_at
            (TaskStatus::Completed, TaskStatus::InProgress) => true,

            // Cancelled is terminal
            _ => false,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who a task is assigned to
///
/// A task can point at either an employee or a manager; the variant carries
/// the kind, so the tag can never disagree with the referenced record once
/// creation has verified it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Assignee {
    /// Assigned to an employee
    Employee(Uuid),

    /// Assigned to a manager
    Manager(Uuid),
}

impl Assignee {
    /// Referenced principal id
    pub fn id(&self) -> Uuid {
        match self {
            Assignee::Employee(id) | Assignee::Manager(id) => *id,
        }
    }

    /// Referenced principal kind
    pub fn role(&self) -> Role {
        match self {
            Assignee::Employee(_) => Role::Employee,
            Assignee::Manager(_) => Role::Manager,
        }
    }

    /// Checks that the reference agrees with the actual record
    pub fn matches(&self, principal: &Principal) -> bool {
        self.id() == principal.id && self.role() == principal.role
    }
}

/// Who created a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Creator {
    /// Created by an admin
    Admin(Uuid),

    /// Created by a manager
    Manager(Uuid),
}

impl Creator {
    /// Referenced principal id
    pub fn id(&self) -> Uuid {
        match self {
            Creator::Admin(id) | Creator::Manager(id) => *id,
        }
    }

    /// Referenced principal kind
    pub fn role(&self) -> Role {
        match self {
            Creator::Admin(_) => Role::Admin,
            Creator::Manager(_) => Role::Manager,
        }
    }
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique task ID (UUID v4)
    pub id: Uuid,

    /// Short summary, required, at most 200 characters
    pub title: String,

    /// Longer description, at most 2000 characters
    pub description: String,

    /// Urgency
    pub priority: TaskPriority,

    /// Current lifecycle state
    pub status: TaskStatus,

    /// Who the work is assigned to
    pub assignee: Assignee,

    /// Who created the task
    pub created_by: Creator,

    /// When the work is due (None = no deadline)
    pub due_date: Option<DateTime<Utc>>,

    /// When work is planned to start
    pub start_date: Option<DateTime<Utc>>,

    /// When the task last entered `completed` (cleared on reopen)
    pub completed_at: Option<DateTime<Utc>>,

    /// Estimated effort in hours
    pub estimated_hours: Option<f32>,

    /// Actual effort in hours
    pub actual_hours: Option<f32>,

    /// Free-form labels
    pub tags: Vec<String>,

    /// Denormalized count of comments on this task
    ///
    /// Best-effort cache; recomputable via `Lifecycle::reconcile_counters`.
    pub comments_count: u32,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTaskInput {
    /// Short summary
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,

    /// Longer description
    #[serde(default)]
    #[validate(length(max = 2000, message = "description must be at most 2000 characters"))]
    pub description: String,

    /// Urgency (defaults to medium)
    #[serde(default)]
    pub priority: TaskPriority,

    /// Who the work is assigned to
    pub assignee: Assignee,

    /// When the work is due
    pub due_date: Option<DateTime<Utc>>,

    /// When work is planned to start
    pub start_date: Option<DateTime<Utc>>,

    /// Estimated effort in hours
    pub estimated_hours: Option<f32>,

    /// Free-form labels
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Input for editing an existing task
///
/// Only non-None fields are applied. `due_date` uses `Some(None)` to clear.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTaskInput {
    /// New title
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: Option<String>,

    /// New description
    #[validate(length(max = 2000, message = "description must be at most 2000 characters"))]
    pub description: Option<String>,

    /// New priority
    pub priority: Option<TaskPriority>,

    /// New due date (use Some(None) to clear)
    pub due_date: Option<Option<DateTime<Utc>>>,

    /// New estimate
    pub estimated_hours: Option<f32>,

    /// Hours actually spent
    pub actual_hours: Option<f32>,

    /// Replacement tag list
    pub tags: Option<Vec<String>>,
}

impl Task {
    /// Builds a new pending task from validated input
    pub fn new(input: &CreateTaskInput, created_by: Creator) -> Self {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            title: input.title.clone(),
            description: input.description.clone(),
            priority: input.priority,
            status: TaskStatus::Pending,
            assignee: input.assignee,
            created_by,
            due_date: input.due_date,
            start_date: input.start_date,
            completed_at: None,
            estimated_hours: input.estimated_hours,
            actual_hours: None,
            tags: input.tags.clone(),
            comments_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Derived overdue predicate, recomputed on every read
    ///
    /// A task is overdue when it has a due date, is not closed, and the due
    /// date has passed.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        match self.due_date {
            Some(due) => self.status.is_active() && now > due,
            None => false,
        }
    }

    /// Whole days until the due date (negative when past), None without one
    pub fn days_until_due(&self, now: DateTime<Utc>) -> Option<i64> {
        self.due_date.map(|due| (due - now).num_days())
    }

    /// Whether a completed task met its deadline
    ///
    /// Tasks without a due date count as on time. Only meaningful when
    /// `status == Completed`; callers filter first.
    pub fn completed_on_time(&self) -> bool {
        match (self.due_date, self.completed_at) {
            (None, _) => true,
            (Some(due), Some(done)) => done <= due,
            (Some(_), None) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_input(assignee: Assignee) -> CreateTaskInput {
        CreateTaskInput {
            title: "Quarterly stock count".to_string(),
            description: String::new(),
            priority: TaskPriority::default(),
            assignee,
            due_date: None,
            start_date: None,
            estimated_hours: Some(4.0),
            tags: vec!["inventory".to_string()],
        }
    }

    #[test]
    fn test_status_as_str() {
        assert_eq!(TaskStatus::Pending.as_str(), "pending");
        assert_eq!(TaskStatus::InProgress.as_str(), "in-progress");
        assert_eq!(TaskStatus::Review.as_str(), "review");
        assert_eq!(TaskStatus::Completed.as_str(), "completed");
        assert_eq!(TaskStatus::Cancelled.as_str(), "cancelled");
    }

    #[test]
    fn test_status_is_closed() {
        assert!(!TaskStatus::Pending.is_closed());
        assert!(!TaskStatus::InProgress.is_closed());
        assert!(!TaskStatus::Review.is_closed());
        assert!(TaskStatus::Completed.is_closed());
        assert!(TaskStatus::Cancelled.is_closed());
    }

    #[test]
    fn test_transition_table() {
        use TaskStatus::*;

        // Forward chain
        assert!(Pending.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Review));
        assert!(Review.can_transition_to(Completed));

        // Direct completion and review send-back
        assert!(InProgress.can_transition_to(Completed));
        assert!(Review.can_transition_to(InProgress));

        // Cancel from any open state
        assert!(Pending.can_transition_to(Cancelled));
        assert!(InProgress.can_transition_to(Cancelled));
        assert!(Review.can_transition_to(Cancelled));

        // Reopen
        assert!(Completed.can_transition_to(InProgress));

        // Rejected edges
        assert!(!Pending.can_transition_to(Review));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Review));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(InProgress));
        assert!(!InProgress.can_transition_to(Pending));
    }

    #[test]
    fn test_status_serializes_kebab_case() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");

        let back: TaskStatus = serde_json::from_str("\"in-progress\"").unwrap();
        assert_eq!(back, TaskStatus::InProgress);
    }

    #[test]
    fn test_is_overdue() {
        let now = Utc::now();
        let mut task = Task::new(
            &sample_input(Assignee::Employee(Uuid::new_v4())),
            Creator::Manager(Uuid::new_v4()),
        );

        // No due date: never overdue
        assert!(!task.is_overdue(now));

        // Past due and still open: overdue
        task.due_date = Some(now - Duration::hours(1));
        assert!(task.is_overdue(now));

        // Past due but completed: not overdue
        task.status = TaskStatus::Completed;
        assert!(!task.is_overdue(now));

        // Past due but cancelled: not overdue
        task.status = TaskStatus::Cancelled;
        assert!(!task.is_overdue(now));

        // Future due date: not overdue
        task.status = TaskStatus::InProgress;
        task.due_date = Some(now + Duration::hours(1));
        assert!(!task.is_overdue(now));
    }

    #[test]
    fn test_days_until_due() {
        let now = Utc::now();
        let mut task = Task::new(
            &sample_input(Assignee::Manager(Uuid::new_v4())),
            Creator::Admin(Uuid::new_v4()),
        );

        assert_eq!(task.days_until_due(now), None);

        task.due_date = Some(now + Duration::days(3));
        assert_eq!(task.days_until_due(now), Some(3));

        task.due_date = Some(now - Duration::days(2));
        assert_eq!(task.days_until_due(now), Some(-2));
    }

    #[test]
    fn test_completed_on_time() {
        let now = Utc::now();
        let mut task = Task::new(
            &sample_input(Assignee::Employee(Uuid::new_v4())),
            Creator::Manager(Uuid::new_v4()),
        );
        task.status = TaskStatus::Completed;

        // No deadline counts as on time
        task.completed_at = Some(now);
        assert!(task.completed_on_time());

        // Finished before the deadline
        task.due_date = Some(now + Duration::hours(1));
        assert!(task.completed_on_time());

        // Finished after the deadline
        task.due_date = Some(now - Duration::hours(1));
        assert!(!task.completed_on_time());
    }

    #[test]
    fn test_assignee_reference() {
        let id = Uuid::new_v4();
        let assignee = Assignee::Employee(id);
        assert_eq!(assignee.id(), id);
        assert_eq!(assignee.role(), Role::Employee);

        let json = serde_json::to_value(assignee).unwrap();
        assert_eq!(json["kind"], "employee");
    }

    #[test]
    fn test_create_input_validation() {
        let mut input = sample_input(Assignee::Employee(Uuid::new_v4()));
        assert!(input.validate().is_ok());

        input.title = String::new();
        assert!(input.validate().is_err());

        input.title = "x".repeat(201);
        assert!(input.validate().is_err());

        input.title = "ok".to_string();
        input.description = "y".repeat(2001);
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_new_task_defaults() {
        let task = Task::new(
            &sample_input(Assignee::Employee(Uuid::new_v4())),
            Creator::Manager(Uuid::new_v4()),
        );
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert!(task.completed_at.is_none());
        assert_eq!(task.comments_count, 0);
    }
}
