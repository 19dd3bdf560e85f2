/// In-memory store
///
/// The reference `Store` implementation: four maps behind a tokio `RwLock`.
/// Used by every test and suitable for embedding; a relational or document
/// backend implements the same trait out of tree.
///
/// Uniqueness rules mirror what a backing database would enforce: principal
/// emails are unique case-insensitively, group names exactly.
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::models::comment::Comment;
use crate::models::group::Group;
use crate::models::principal::Principal;
use crate::models::task::Task;

#[derive(Debug, Default)]
struct Inner {
    principals: HashMap<Uuid, Principal>,
    groups: HashMap<Uuid, Group>,
    tasks: HashMap<Uuid, Task>,
    comments: HashMap<Uuid, Comment>,
}

/// In-memory `Store` implementation
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_principal(&self, principal: Principal) -> StoreResult<Principal> {
        let mut inner = self.inner.write().await;
        let duplicate = inner
            .principals
            .values()
            .any(|p| p.email.eq_ignore_ascii_case(&principal.email));
        if duplicate {
            return Err(StoreError::Conflict(format!(
                "email {} is already registered",
                principal.email
            )));
        }
        inner.principals.insert(principal.id, principal.clone());
        Ok(principal)
    }

    async fn find_principal(&self, id: Uuid) -> StoreResult<Option<Principal>> {
        let inner = self.inner.read().await;
        Ok(inner.principals.get(&id).cloned())
    }

    async fn find_principal_by_email(&self, email: &str) -> StoreResult<Option<Principal>> {
        let inner = self.inner.read().await;
        Ok(inner
            .principals
            .values()
            .find(|p| p.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn update_principal(&self, principal: Principal) -> StoreResult<Principal> {
        let mut inner = self.inner.write().await;
        if !inner.principals.contains_key(&principal.id) {
            return Err(StoreError::NotFound(format!("principal {}", principal.id)));
        }
        inner.principals.insert(principal.id, principal.clone());
        Ok(principal)
    }

    async fn list_principals(&self) -> StoreResult<Vec<Principal>> {
        let inner = self.inner.read().await;
        let mut principals: Vec<Principal> = inner.principals.values().cloned().collect();
        principals.sort_by_key(|p| (p.created_at, p.id));
        Ok(principals)
    }

    async fn insert_group(&self, group: Group) -> StoreResult<Group> {
        let mut inner = self.inner.write().await;
        if inner.groups.values().any(|g| g.name == group.name) {
            return Err(StoreError::Conflict(format!(
                "group name {:?} is already taken",
                group.name
            )));
        }
        inner.groups.insert(group.id, group.clone());
        Ok(group)
    }

    async fn find_group(&self, id: Uuid) -> StoreResult<Option<Group>> {
        let inner = self.inner.read().await;
        Ok(inner.groups.get(&id).cloned())
    }

    async fn find_group_by_name(&self, name: &str) -> StoreResult<Option<Group>> {
        let inner = self.inner.read().await;
        Ok(inner.groups.values().find(|g| g.name == name).cloned())
    }

    async fn update_group(&self, group: Group) -> StoreResult<Group> {
        let mut inner = self.inner.write().await;
        if !inner.groups.contains_key(&group.id) {
            return Err(StoreError::NotFound(format!("group {}", group.id)));
        }
        let renamed_onto_taken = inner
            .groups
            .values()
            .any(|g| g.id != group.id && g.name == group.name);
        if renamed_onto_taken {
            return Err(StoreError::Conflict(format!(
                "group name {:?} is already taken",
                group.name
            )));
        }
        inner.groups.insert(group.id, group.clone());
        Ok(group)
    }

    async fn delete_group(&self, id: Uuid) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        Ok(inner.groups.remove(&id).is_some())
    }

    async fn list_groups(&self) -> StoreResult<Vec<Group>> {
        let inner = self.inner.read().await;
        let mut groups: Vec<Group> = inner.groups.values().cloned().collect();
        // Stable enumeration order; membership resolution ties break on it
        groups.sort_by_key(|g| (g.created_at, g.id));
        Ok(groups)
    }

    async fn insert_task(&self, task: Task) -> StoreResult<Task> {
        let mut inner = self.inner.write().await;
        inner.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        let inner = self.inner.read().await;
        Ok(inner.tasks.get(&id).cloned())
    }

    async fn update_task(&self, task: Task) -> StoreResult<Task> {
        let mut inner = self.inner.write().await;
        if !inner.tasks.contains_key(&task.id) {
            return Err(StoreError::NotFound(format!("task {}", task.id)));
        }
        inner.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn list_tasks(&self) -> StoreResult<Vec<Task>> {
        let inner = self.inner.read().await;
        let mut tasks: Vec<Task> = inner.tasks.values().cloned().collect();
        tasks.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(tasks)
    }

    async fn insert_comment(&self, comment: Comment) -> StoreResult<Comment> {
        let mut inner = self.inner.write().await;
        inner.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn find_comment(&self, id: Uuid) -> StoreResult<Option<Comment>> {
        let inner = self.inner.read().await;
        Ok(inner.comments.get(&id).cloned())
    }

    async fn update_comment(&self, comment: Comment) -> StoreResult<Comment> {
        let mut inner = self.inner.write().await;
        if !inner.comments.contains_key(&comment.id) {
            return Err(StoreError::NotFound(format!("comment {}", comment.id)));
        }
        inner.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn list_comments(&self, task_id: Uuid) -> StoreResult<Vec<Comment>> {
        let inner = self.inner.read().await;
        let mut comments: Vec<Comment> = inner
            .comments
            .values()
            .filter(|c| c.task_id == task_id)
            .cloned()
            .collect();
        comments.sort_by_key(|c| (c.created_at, c.id));
        Ok(comments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::group::CreateGroupInput;
    use crate::models::principal::{Principal, RegisterInput, Role};

    fn principal(email: &str) -> Principal {
        Principal::new(
            Role::Employee,
            &RegisterInput {
                name: "Test".to_string(),
                email: email.to_string(),
                phone: None,
                password: "unused-password".to_string(),
            },
            "hash".to_string(),
        )
    }

    fn group(name: &str) -> Group {
        Group::new(
            &CreateGroupInput {
                name: name.to_string(),
                description: String::new(),
                managers: vec![],
                employees: vec![],
            },
            Uuid::new_v4(),
        )
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store.insert_principal(principal("a@example.com")).await.unwrap();

        let result = store.insert_principal(principal("A@Example.com")).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_insensitive() {
        let store = MemoryStore::new();
        let created = store.insert_principal(principal("a@example.com")).await.unwrap();

        let found = store
            .find_principal_by_email("A@EXAMPLE.COM")
            .await
            .unwrap()
            .expect("should find principal");
        assert_eq!(found.id, created.id);
    }

    #[tokio::test]
    async fn test_duplicate_group_name_leaves_original() {
        let store = MemoryStore::new();
        let original = store.insert_group(group("Night shift")).await.unwrap();

        let result = store.insert_group(group("Night shift")).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));

        let kept = store.find_group(original.id).await.unwrap();
        assert!(kept.is_some());
        assert_eq!(store.list_groups().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_group_rename_conflict() {
        let store = MemoryStore::new();
        store.insert_group(group("First")).await.unwrap();
        let mut second = store.insert_group(group("Second")).await.unwrap();

        second.name = "First".to_string();
        let result = store.update_group(second).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_missing_records() {
        let store = MemoryStore::new();

        let ghost = principal("ghost@example.com");
        assert!(matches!(
            store.update_principal(ghost).await,
            Err(StoreError::NotFound(_))
        ));

        assert!(matches!(
            store.update_group(group("Ghost")).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_group_enumeration_order_is_stable() {
        let store = MemoryStore::new();
        let first = store.insert_group(group("Alpha")).await.unwrap();
        let second = store.insert_group(group("Beta")).await.unwrap();
        let third = store.insert_group(group("Gamma")).await.unwrap();

        let listed = store.list_groups().await.unwrap();
        let ids: Vec<Uuid> = listed.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![first.id, second.id, third.id]);
    }

    #[tokio::test]
    async fn test_delete_group() {
        let store = MemoryStore::new();
        let created = store.insert_group(group("Doomed")).await.unwrap();

        assert!(store.delete_group(created.id).await.unwrap());
        assert!(!store.delete_group(created.id).await.unwrap());
    }
}
