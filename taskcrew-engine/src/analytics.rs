/// Workload and performance aggregator
///
/// Every metric is recomputed from the authoritative task set on each call;
/// none of the denormalized counters are consulted. Scans run under the
/// configured deadline and fail whole: a partially populated snapshot is
/// never returned.
///
/// # Metrics
///
/// Over a principal's task set `T`:
///
/// - `active`: tasks not completed and not cancelled
/// - `workload`: `min(round(active / capacity * 100), 100)`; capacity is the
///   policy knob for how many concurrent tasks equal 100% load
/// - `completion_rate`: `round(completed / total * 100)`, 0 when empty
/// - `overdue`: open tasks whose due date has passed, derived at read time
/// - `efficiency`: `round(on_time / completed * 100)`; with zero completed
///   tasks the policy's idle-efficiency default applies
///
/// A manager's workload aggregates over their team (the mean of each
/// resolved employee's workload), not the manager's personal task count. The
/// other metrics stay personal.
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use uuid::Uuid;

use taskcrew_shared::auth::authorization::{require, Action};
use taskcrew_shared::auth::context::AuthContext;
use taskcrew_shared::config::Policy;
use taskcrew_shared::error::{CoreResult, Error};
use taskcrew_shared::models::principal::Role;
use taskcrew_shared::models::task::{Task, TaskStatus};
use taskcrew_shared::store::Store;

use crate::roster::Roster;

/// Derived workload/performance metrics for one principal
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceSnapshot {
    /// Principal the snapshot describes
    pub principal_id: Uuid,

    /// Total tasks assigned to the principal
    pub total_tasks: u32,

    /// Tasks currently completed
    pub completed_tasks: u32,

    /// Open tasks (neither completed nor cancelled)
    pub active_tasks: u32,

    /// Open tasks past their due date
    pub overdue_tasks: u32,

    /// Completed tasks finished by their due date (or without one)
    pub on_time_completions: u32,

    /// Capacity-normalized load, clamped to 0-100
    pub workload: u8,

    /// Completed share of all assigned tasks, 0-100
    pub completion_rate: u8,

    /// On-time share of completed tasks, 0-100
    pub efficiency: u8,
}

/// Workload and performance service
#[derive(Clone)]
pub struct Analytics {
    store: Arc<dyn Store>,
    roster: Roster,
    policy: Policy,
}

impl Analytics {
    /// Creates an analytics service over the given store
    pub fn new(store: Arc<dyn Store>, roster: Roster, policy: Policy) -> Self {
        Analytics {
            store,
            roster,
            policy,
        }
    }

    /// Computes the snapshot for one principal
    ///
    /// Visible to the principal themself, their supervising manager, and
    /// admins. For a manager subject, `workload` is the mean of their team's
    /// workloads (0 with an empty team); everything else is computed from
    /// the manager's personally assigned tasks.
    ///
    /// # Errors
    ///
    /// - `Forbidden` outside the visibility rule
    /// - `NotFound` for an unknown principal
    /// - `DeadlineExceeded` when the scan overruns the policy deadline
    pub async fn workload_for(
        &self,
        actor: &AuthContext,
        principal_id: Uuid,
    ) -> CoreResult<PerformanceSnapshot> {
        let supervision = self.roster.supervision_for(actor).await?;
        require(
            actor,
            &Action::ViewWorkload {
                subject: principal_id,
            },
            &supervision,
        )?;

        let subject = self
            .store
            .find_principal(principal_id)
            .await?
            .ok_or_else(|| Error::not_found("principal", principal_id))?;

        let policy = self.policy.clone();
        let store = self.store.clone();
        let roster = self.roster.clone();

        self.bounded(async move {
            let now = Utc::now();
            let tasks = store.list_tasks().await?;
            let mut snapshot = snapshot_for(principal_id, &tasks, now, &policy);

            if subject.role == Role::Manager {
                let team = roster.team_of(principal_id).await?;
                snapshot.workload = team_workload(&team, &tasks, now, &policy);
            }

            Ok(snapshot)
        })
        .await
    }

    async fn bounded<T>(
        &self,
        scan: impl Future<Output = CoreResult<T>>,
    ) -> CoreResult<T> {
        match tokio::time::timeout(self.policy.scan_deadline, scan).await {
            Ok(result) => result,
            Err(_) => Err(Error::DeadlineExceeded(self.policy.scan_deadline)),
        }
    }
}

/// Computes the personal snapshot for a principal from the full task set
pub fn snapshot_for(
    principal_id: Uuid,
    all_tasks: &[Task],
    now: DateTime<Utc>,
    policy: &Policy,
) -> PerformanceSnapshot {
    let tasks: Vec<&Task> = all_tasks
        .iter()
        .filter(|t| t.assignee.id() == principal_id)
        .collect();

    let total = tasks.len() as u32;
    let completed = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Completed)
        .count() as u32;
    let active = tasks.iter().filter(|t| t.status.is_active()).count() as u32;
    let overdue = tasks.iter().filter(|t| t.is_overdue(now)).count() as u32;
    let on_time = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Completed && t.completed_on_time())
        .count() as u32;

    PerformanceSnapshot {
        principal_id,
        total_tasks: total,
        completed_tasks: completed,
        active_tasks: active,
        overdue_tasks: overdue,
        on_time_completions: on_time,
        workload: workload(active, policy.workload_capacity),
        completion_rate: ratio(completed, total),
        efficiency: if completed > 0 {
            ratio(on_time, completed)
        } else {
            policy.idle_efficiency
        },
    }
}

/// Capacity-normalized workload, clamped to 0-100
pub fn workload(active: u32, capacity: u32) -> u8 {
    if capacity == 0 {
        return 0;
    }
    let raw = ((active as f64 / capacity as f64) * 100.0).round() as u32;
    raw.min(100) as u8
}

/// Mean of each team member's workload, rounded, 0 for an empty team
fn team_workload(team: &[Uuid], all_tasks: &[Task], now: DateTime<Utc>, policy: &Policy) -> u8 {
    if team.is_empty() {
        return 0;
    }
    let sum: u32 = team
        .iter()
        .map(|employee_id| {
            let active = all_tasks
                .iter()
                .filter(|t| t.assignee.id() == *employee_id && t.status.is_active())
                .count() as u32;
            workload(active, policy.workload_capacity) as u32
        })
        .sum();
    ((sum as f64 / team.len() as f64).round() as u32).min(100) as u8
}

/// Rounded percentage, 0 when the denominator is 0, never NaN
fn ratio(numerator: u32, denominator: u32) -> u8 {
    if denominator == 0 {
        return 0;
    }
    (((numerator as f64 / denominator as f64) * 100.0).round() as u32).min(100) as u8
}
