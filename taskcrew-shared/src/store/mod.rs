/// Persistence seam
///
/// The persistence technology is an external collaborator: the core talks to
/// a simple save/find/update interface and never assumes a particular engine
/// or any multi-record transactional guarantee. Concurrent requests may
/// interleave between any two calls; the store's own concurrency control is
/// the sole serialization point.
///
/// # Contract
///
/// - `insert_*` fails with `StoreError::Conflict` on a uniqueness violation
///   (principal email, group name) and never clobbers the existing record.
/// - `update_*` fails with `StoreError::NotFound` when the record is absent.
/// - `list_groups` returns groups in ascending `(created_at, id)` order; this
///   is the stable enumeration order membership resolution ties break on.
/// - `list_tasks` returns newest first.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use taskcrew_shared::store::{MemoryStore, Store};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
/// assert!(store.list_tasks().await?.is_empty());
/// # Ok(())
/// # }
/// ```
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::comment::Comment;
use crate::models::group::Group;
use crate::models::principal::Principal;
use crate::models::task::Task;

pub mod memory;

pub use memory::MemoryStore;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Record does not exist
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Uniqueness violation
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The backend could not serve the request
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence contract the core operates against
#[async_trait]
pub trait Store: Send + Sync {
    /// Inserts a principal; `Conflict` if the email is already registered
    async fn insert_principal(&self, principal: Principal) -> StoreResult<Principal>;

    /// Finds a principal by ID
    async fn find_principal(&self, id: Uuid) -> StoreResult<Option<Principal>>;

    /// Finds a principal by email (case-insensitive)
    async fn find_principal_by_email(&self, email: &str) -> StoreResult<Option<Principal>>;

    /// Replaces a principal record; `NotFound` if absent
    async fn update_principal(&self, principal: Principal) -> StoreResult<Principal>;

    /// Lists every principal
    async fn list_principals(&self) -> StoreResult<Vec<Principal>>;

    /// Inserts a group; `Conflict` if the name is taken
    async fn insert_group(&self, group: Group) -> StoreResult<Group>;

    /// Finds a group by ID
    async fn find_group(&self, id: Uuid) -> StoreResult<Option<Group>>;

    /// Finds a group by exact name
    async fn find_group_by_name(&self, name: &str) -> StoreResult<Option<Group>>;

    /// Replaces a group record; `NotFound` if absent, `Conflict` if renamed
    /// to a name another group holds
    async fn update_group(&self, group: Group) -> StoreResult<Group>;

    /// Deletes a group; returns whether it existed
    async fn delete_group(&self, id: Uuid) -> StoreResult<bool>;

    /// Lists groups in ascending `(created_at, id)` order
    async fn list_groups(&self) -> StoreResult<Vec<Group>>;

    /// Inserts a task
    async fn insert_task(&self, task: Task) -> StoreResult<Task>;

    /// Finds a task by ID
    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>>;

    /// Replaces a task record; `NotFound` if absent
    async fn update_task(&self, task: Task) -> StoreResult<Task>;

    /// Lists every task, newest first
    async fn list_tasks(&self) -> StoreResult<Vec<Task>>;

    /// Inserts a comment
    async fn insert_comment(&self, comment: Comment) -> StoreResult<Comment>;

    /// Finds a comment by ID
    async fn find_comment(&self, id: Uuid) -> StoreResult<Option<Comment>>;

    /// Replaces a comment record; `NotFound` if absent
    async fn update_comment(&self, comment: Comment) -> StoreResult<Comment>;

    /// Lists a task's comments, oldest first
    async fn list_comments(&self, task_id: Uuid) -> StoreResult<Vec<Comment>>;
}
