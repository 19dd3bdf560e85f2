/// Common test utilities for engine integration tests
///
/// Provides a seeded context: an in-memory store wrapped by a full `Engine`,
/// one admin, two managers with one group each, two employees on the first
/// manager's crew, one employee on the second manager's crew, and one
/// employee who belongs to no group at all.
use std::sync::Arc;
use uuid::Uuid;

use taskcrew_engine::Engine;
use taskcrew_shared::auth::context::AuthContext;
use taskcrew_shared::config::{Config, Policy, TokenConfig};
use taskcrew_shared::error::CoreResult;
use taskcrew_shared::models::group::{CreateGroupInput, Group};
use taskcrew_shared::models::principal::{Principal, PrincipalStatus, RegisterInput, Role};
use taskcrew_shared::models::task::{Assignee, CreateTaskInput, Task, TaskPriority};
use taskcrew_shared::store::MemoryStore;

pub const TEST_SECRET: &str = "integration-test-secret-32-bytes!!";

/// Test context containing a seeded engine and principals
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub engine: Engine,

    pub admin: Principal,
    pub manager: Principal,
    pub other_manager: Principal,

    /// First employee on `manager`'s crew
    pub employee: Principal,

    /// Second employee on `manager`'s crew
    pub coworker: Principal,

    /// Employee on `other_manager`'s crew
    pub foreign_employee: Principal,

    /// Active employee who belongs to no group
    pub loner: Principal,

    /// The crew supervised by `manager`
    pub crew: Group,

    /// The crew supervised by `other_manager`
    pub other_crew: Group,
}

impl TestContext {
    /// Creates a fresh seeded context
    pub async fn new() -> anyhow::Result<Self> {
        Self::with_policy(Policy::default()).await
    }

    /// Creates a fresh seeded context with a custom metric policy
    pub async fn with_policy(policy: Policy) -> anyhow::Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let store = Arc::new(MemoryStore::new());
        let engine = Engine::new(
            store.clone(),
            Config::new(policy, TokenConfig::new(TEST_SECRET)),
        );

        let admin = engine
            .directory
            .register(Role::Admin, register_input("admin@example.com"))
            .await?;
        let admin_ctx = ctx(&admin);

        let manager = Self::activated(&engine, &admin_ctx, Role::Manager, "mgr@example.com").await?;
        let other_manager =
            Self::activated(&engine, &admin_ctx, Role::Manager, "mgr2@example.com").await?;
        let employee = Self::activated(&engine, &admin_ctx, Role::Employee, "emp1@example.com").await?;
        let coworker = Self::activated(&engine, &admin_ctx, Role::Employee, "emp2@example.com").await?;
        let foreign_employee =
            Self::activated(&engine, &admin_ctx, Role::Employee, "emp3@example.com").await?;
        let loner = Self::activated(&engine, &admin_ctx, Role::Employee, "emp4@example.com").await?;

        let crew = engine
            .roster
            .create_group(
                &admin_ctx,
                CreateGroupInput {
                    name: "Floor crew".to_string(),
                    description: "Front-of-house".to_string(),
                    managers: vec![manager.id],
                    employees: vec![employee.id, coworker.id],
                },
            )
            .await?;

        // Keep the two groups' creation times distinct so enumeration-order
        // assertions are deterministic
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;

        let other_crew = engine
            .roster
            .create_group(
                &admin_ctx,
                CreateGroupInput {
                    name: "Back office".to_string(),
                    description: String::new(),
                    managers: vec![other_manager.id],
                    employees: vec![foreign_employee.id],
                },
            )
            .await?;

        Ok(TestContext {
            store,
            engine,
            admin,
            manager,
            other_manager,
            employee,
            coworker,
            foreign_employee,
            loner,
            crew,
            other_crew,
        })
    }

    async fn activated(
        engine: &Engine,
        admin_ctx: &AuthContext,
        role: Role,
        email: &str,
    ) -> anyhow::Result<Principal> {
        let principal = engine.directory.register(role, register_input(email)).await?;
        let principal = engine
            .directory
            .set_status(admin_ctx, principal.id, PrincipalStatus::Active)
            .await?;
        Ok(principal)
    }

    pub fn admin_ctx(&self) -> AuthContext {
        ctx(&self.admin)
    }

    pub fn manager_ctx(&self) -> AuthContext {
        ctx(&self.manager)
    }

    pub fn other_manager_ctx(&self) -> AuthContext {
        ctx(&self.other_manager)
    }

    pub fn employee_ctx(&self) -> AuthContext {
        ctx(&self.employee)
    }

    pub fn coworker_ctx(&self) -> AuthContext {
        ctx(&self.coworker)
    }

    pub fn foreign_employee_ctx(&self) -> AuthContext {
        ctx(&self.foreign_employee)
    }

    pub fn loner_ctx(&self) -> AuthContext {
        ctx(&self.loner)
    }

    /// Creates a task from `manager` to the given employee
    pub async fn assign_to(&self, employee_id: Uuid) -> CoreResult<Task> {
        self.engine
            .lifecycle
            .create_task(&self.manager_ctx(), task_input(Assignee::Employee(employee_id)))
            .await
    }
}

/// Builds an auth context for a principal, as the boundary layer would after
/// verifying an assertion
pub fn ctx(principal: &Principal) -> AuthContext {
    AuthContext::new(principal.id, principal.role)
}

/// Registration input with a password that passes the strength check
pub fn register_input(email: &str) -> RegisterInput {
    RegisterInput {
        name: "Test Person".to_string(),
        email: email.to_string(),
        phone: None,
        password: "C0rrect-horse!".to_string(),
    }
}

/// Minimal valid task input for the given assignee
pub fn task_input(assignee: Assignee) -> CreateTaskInput {
    CreateTaskInput {
        title: "Restock shelves".to_string(),
        description: String::new(),
        priority: TaskPriority::Medium,
        assignee,
        due_date: None,
        start_date: None,
        estimated_hours: None,
        tags: vec![],
    }
}
