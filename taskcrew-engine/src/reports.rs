/// System-wide report aggregator
///
/// One full scan over the task set, grouped along the two enum dimensions.
/// Admin only, deadline-bounded, whole-call semantics: the report is either
/// complete or the call fails. An empty task store yields all-zero counts
/// and empty maps; consumers dividing by `total_tasks` must treat 0 as 0%,
/// never NaN.
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use taskcrew_shared::auth::authorization::{require, Action, Supervision};
use taskcrew_shared::auth::context::AuthContext;
use taskcrew_shared::config::Policy;
use taskcrew_shared::error::{CoreResult, Error};
use taskcrew_shared::models::task::{TaskPriority, TaskStatus};
use taskcrew_shared::store::Store;

/// System-wide task distribution
#[derive(Debug, Clone, Serialize)]
pub struct SystemOverview {
    /// Total tasks in the system
    pub total_tasks: u32,

    /// Task counts by status; statuses with no tasks are absent
    pub tasks_by_status: BTreeMap<TaskStatus, u32>,

    /// Task counts by priority; priorities with no tasks are absent
    pub tasks_by_priority: BTreeMap<TaskPriority, u32>,

    /// Open tasks past their due date, derived at scan time
    pub overdue_tasks: u32,
}

/// Report aggregation service
#[derive(Clone)]
pub struct Reports {
    store: Arc<dyn Store>,
    policy: Policy,
}

impl Reports {
    /// Creates a report service over the given store
    pub fn new(store: Arc<dyn Store>, policy: Policy) -> Self {
        Reports { store, policy }
    }

    /// Builds the system overview (admin only)
    ///
    /// # Errors
    ///
    /// - `Forbidden` for non-admins
    /// - `DeadlineExceeded` when the scan overruns the policy deadline
    pub async fn system_overview(&self, actor: &AuthContext) -> CoreResult<SystemOverview> {
        require(actor, &Action::SystemOverview, &Supervision::none())?;

        let store = self.store.clone();
        let scan = async move {
            let now = Utc::now();
            let tasks = store.list_tasks().await?;

            let mut tasks_by_status: BTreeMap<TaskStatus, u32> = BTreeMap::new();
            let mut tasks_by_priority: BTreeMap<TaskPriority, u32> = BTreeMap::new();
            let mut overdue_tasks = 0u32;

            for task in &tasks {
                *tasks_by_status.entry(task.status).or_insert(0) += 1;
                *tasks_by_priority.entry(task.priority).or_insert(0) += 1;
                if task.is_overdue(now) {
                    overdue_tasks += 1;
                }
            }

            Ok(SystemOverview {
                total_tasks: tasks.len() as u32,
                tasks_by_status,
                tasks_by_priority,
                overdue_tasks,
            })
        };

        match tokio::time::timeout(self.policy.scan_deadline, scan).await {
            Ok(result) => result,
            Err(_) => Err(Error::DeadlineExceeded(self.policy.scan_deadline)),
        }
    }
}
