/// Integration tests for workload and performance metrics
mod common;

use common::{task_input, TestContext};
use taskcrew_shared::config::Policy;
use taskcrew_shared::error::Error;
use taskcrew_shared::models::task::{Assignee, TaskStatus, UpdateTaskInput};

#[tokio::test]
async fn workload_scales_and_clamps() {
    let ctx = TestContext::new().await.unwrap();

    // No tasks: zero load
    let snapshot = ctx
        .engine
        .analytics
        .workload_for(&ctx.admin_ctx(), ctx.employee.id)
        .await
        .unwrap();
    assert_eq!(snapshot.workload, 0);

    // Five active tasks with capacity five: exactly 100
    for _ in 0..5 {
        ctx.assign_to(ctx.employee.id).await.unwrap();
    }
    let snapshot = ctx
        .engine
        .analytics
        .workload_for(&ctx.admin_ctx(), ctx.employee.id)
        .await
        .unwrap();
    assert_eq!(snapshot.active_tasks, 5);
    assert_eq!(snapshot.workload, 100);

    // Twelve active tasks: clamped to 100, not 240
    for _ in 0..7 {
        ctx.assign_to(ctx.employee.id).await.unwrap();
    }
    let snapshot = ctx
        .engine
        .analytics
        .workload_for(&ctx.admin_ctx(), ctx.employee.id)
        .await
        .unwrap();
    assert_eq!(snapshot.active_tasks, 12);
    assert_eq!(snapshot.workload, 100);
}

#[tokio::test]
async fn workload_capacity_is_a_policy_knob() {
    let mut policy = Policy::default();
    policy.workload_capacity = 10;
    let ctx = TestContext::with_policy(policy).await.unwrap();

    for _ in 0..5 {
        ctx.assign_to(ctx.employee.id).await.unwrap();
    }
    let snapshot = ctx
        .engine
        .analytics
        .workload_for(&ctx.admin_ctx(), ctx.employee.id)
        .await
        .unwrap();
    assert_eq!(snapshot.workload, 50);
}

#[tokio::test]
async fn efficiency_and_completion_rate() {
    let ctx = TestContext::new().await.unwrap();
    let actor = ctx.employee_ctx();
    let lifecycle = &ctx.engine.lifecycle;

    // Four tasks, complete all; one of them late
    let mut ids = Vec::new();
    for _ in 0..4 {
        ids.push(ctx.assign_to(ctx.employee.id).await.unwrap().id);
    }

    // Give the last task a due date already in the past, so completing it
    // now is late
    let late_due = chrono::Utc::now() - chrono::Duration::days(1);
    ctx.engine
        .lifecycle
        .update_task(
            &ctx.manager_ctx(),
            ids[3],
            UpdateTaskInput {
                due_date: Some(Some(late_due)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    for id in &ids {
        lifecycle.update_status(&actor, *id, TaskStatus::InProgress).await.unwrap();
        lifecycle.update_status(&actor, *id, TaskStatus::Completed).await.unwrap();
    }

    let snapshot = ctx
        .engine
        .analytics
        .workload_for(&ctx.admin_ctx(), ctx.employee.id)
        .await
        .unwrap();
    assert_eq!(snapshot.completed_tasks, 4);
    assert_eq!(snapshot.on_time_completions, 3);
    assert_eq!(snapshot.efficiency, 75);
    assert_eq!(snapshot.completion_rate, 100);
    assert_eq!(snapshot.workload, 0);
}

#[tokio::test]
async fn overdue_is_derived_at_read_time() {
    let ctx = TestContext::new().await.unwrap();
    let task = ctx.assign_to(ctx.employee.id).await.unwrap();

    ctx.engine
        .lifecycle
        .update_task(
            &ctx.manager_ctx(),
            task.id,
            UpdateTaskInput {
                due_date: Some(Some(chrono::Utc::now() - chrono::Duration::hours(1))),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let snapshot = ctx
        .engine
        .analytics
        .workload_for(&ctx.admin_ctx(), ctx.employee.id)
        .await
        .unwrap();
    assert_eq!(snapshot.overdue_tasks, 1);

    // Completing the task clears the overdue state on the next read
    ctx.engine
        .lifecycle
        .update_status(&ctx.employee_ctx(), task.id, TaskStatus::InProgress)
        .await
        .unwrap();
    ctx.engine
        .lifecycle
        .update_status(&ctx.employee_ctx(), task.id, TaskStatus::Completed)
        .await
        .unwrap();

    let snapshot = ctx
        .engine
        .analytics
        .workload_for(&ctx.admin_ctx(), ctx.employee.id)
        .await
        .unwrap();
    assert_eq!(snapshot.overdue_tasks, 0);
}

#[tokio::test]
async fn manager_workload_is_team_mean() {
    let ctx = TestContext::new().await.unwrap();

    // employee: 5 active (100%), coworker: 1 active (20%) → mean 60
    for _ in 0..5 {
        ctx.assign_to(ctx.employee.id).await.unwrap();
    }
    ctx.assign_to(ctx.coworker.id).await.unwrap();

    // The manager also has a personal task; it must not affect the mean
    ctx.engine
        .lifecycle
        .create_task(&ctx.manager_ctx(), task_input(Assignee::Manager(ctx.manager.id)))
        .await
        .unwrap();

    let snapshot = ctx
        .engine
        .analytics
        .workload_for(&ctx.admin_ctx(), ctx.manager.id)
        .await
        .unwrap();
    assert_eq!(snapshot.workload, 60);

    // Personal counts still describe the manager's own assignments
    assert_eq!(snapshot.total_tasks, 1);
    assert_eq!(snapshot.active_tasks, 1);
}

#[tokio::test]
async fn manager_with_empty_team_has_zero_workload() {
    let ctx = TestContext::new().await.unwrap();

    ctx.engine
        .roster
        .remove_members(
            &ctx.admin_ctx(),
            ctx.crew.id,
            &[],
            &[ctx.employee.id, ctx.coworker.id],
        )
        .await
        .unwrap();

    let snapshot = ctx
        .engine
        .analytics
        .workload_for(&ctx.admin_ctx(), ctx.manager.id)
        .await
        .unwrap();
    assert_eq!(snapshot.workload, 0);
}

#[tokio::test]
async fn groupless_employee_still_computes() {
    let ctx = TestContext::new().await.unwrap();

    // The loner belongs to no group; resolution yields nobody but their
    // own metrics still work over their direct task set
    let resolved = ctx.engine.roster.resolve_manager(ctx.loner.id).await.unwrap();
    assert_eq!(resolved, None);

    let snapshot = ctx
        .engine
        .analytics
        .workload_for(&ctx.loner_ctx(), ctx.loner.id)
        .await
        .unwrap();
    assert_eq!(snapshot.total_tasks, 0);
    assert_eq!(snapshot.workload, 0);
    assert_eq!(snapshot.completion_rate, 0);
    assert_eq!(snapshot.efficiency, 100); // idle-efficiency policy default
}

#[tokio::test]
async fn workload_visibility_rules() {
    let ctx = TestContext::new().await.unwrap();

    // Self: allowed
    assert!(ctx
        .engine
        .analytics
        .workload_for(&ctx.employee_ctx(), ctx.employee.id)
        .await
        .is_ok());

    // Supervising manager: allowed
    assert!(ctx
        .engine
        .analytics
        .workload_for(&ctx.manager_ctx(), ctx.employee.id)
        .await
        .is_ok());

    // Unrelated manager: denied
    let result = ctx
        .engine
        .analytics
        .workload_for(&ctx.other_manager_ctx(), ctx.employee.id)
        .await;
    assert!(matches!(result, Err(Error::Forbidden(_))));

    // Employee peeking at a coworker: denied
    let result = ctx
        .engine
        .analytics
        .workload_for(&ctx.employee_ctx(), ctx.coworker.id)
        .await;
    assert!(matches!(result, Err(Error::Forbidden(_))));

    // Unknown subject for an admin: not found
    let result = ctx
        .engine
        .analytics
        .workload_for(&ctx.admin_ctx(), uuid::Uuid::new_v4())
        .await;
    assert!(matches!(result, Err(Error::NotFound(_))));
}
