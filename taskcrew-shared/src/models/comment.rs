/// Comment model: free-text notes attached to tasks
///
/// A comment belongs to exactly one task and may be authored by a principal
/// of any kind; the author is a typed reference, same pattern as a task's
/// assignee. `author_role` is a redundant display copy derived from the
/// reference at construction; it can never disagree with it. Comments are
/// never deleted; edits mark the record as edited.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::principal::{PrincipalRef, Role};

/// Comment model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// Unique comment ID (UUID v4)
    pub id: Uuid,

    /// Task this comment is attached to
    pub task_id: Uuid,

    /// Author reference (any principal kind)
    pub author: PrincipalRef,

    /// Author kind, for display
    pub author_role: Role,

    /// Comment text
    pub body: String,

    /// Whether the comment has been edited since creation
    pub edited: bool,

    /// When the comment was created
    pub created_at: DateTime<Utc>,

    /// When the comment was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for adding or editing a comment
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CommentInput {
    /// Comment text
    #[validate(length(min = 1, max = 2000, message = "body must be 1-2000 characters"))]
    pub body: String,
}

impl Comment {
    /// Builds a new comment on the given task
    pub fn new(task_id: Uuid, author: PrincipalRef, input: &CommentInput) -> Self {
        let now = Utc::now();
        Comment {
            id: Uuid::new_v4(),
            task_id,
            author,
            author_role: author.role(),
            body: input.body.clone(),
            edited: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the body and marks the comment edited
    pub fn edit(&mut self, body: String) {
        self.body = body;
        self.edited = true;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_role_derived_from_reference() {
        let author = PrincipalRef::Manager(Uuid::new_v4());
        let comment = Comment::new(
            Uuid::new_v4(),
            author,
            &CommentInput {
                body: "Looks done to me".to_string(),
            },
        );
        assert_eq!(comment.author_role, Role::Manager);
        assert!(!comment.edited);
    }

    #[test]
    fn test_edit_marks_comment() {
        let mut comment = Comment::new(
            Uuid::new_v4(),
            PrincipalRef::Employee(Uuid::new_v4()),
            &CommentInput {
                body: "First pass".to_string(),
            },
        );
        comment.edit("Second pass".to_string());
        assert!(comment.edited);
        assert_eq!(comment.body, "Second pass");
    }

    #[test]
    fn test_input_validation() {
        let empty = CommentInput { body: String::new() };
        assert!(empty.validate().is_err());

        let long = CommentInput {
            body: "c".repeat(2001),
        };
        assert!(long.validate().is_err());

        let ok = CommentInput {
            body: "fine".to_string(),
        };
        assert!(ok.validate().is_ok());
    }
}
