use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A to-do item as stored in the database and returned by the API.
///
/// `position` defines the task's rank within its owner's list; `user_id` is
/// set at creation and never changes afterwards.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub done: bool,
    pub position: i32,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input structure for creating a task.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 1000))]
    pub description: String,

    /// Defaults to false when omitted.
    pub done: Option<bool>,

    /// When omitted, the task is appended after the owner's current maximum
    /// position.
    pub position: Option<i32>,
}

/// Partial update payload. Only fields present in the request are applied;
/// see [`Task::apply_patch`].
#[derive(Debug, Serialize, Deserialize, Validate, Default)]
pub struct TaskPatch {
    #[validate(length(max = 200))]
    pub title: Option<String>,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    pub done: Option<bool>,

    pub position: Option<i32>,
}

/// Payload for the reorder endpoint: the owner's complete task list in the
/// desired order.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReorderInput {
    #[serde(rename = "taskIds")]
    pub task_ids: Vec<Uuid>,
}

impl Task {
    /// Applies a partial update in place.
    ///
    /// Absent fields leave the stored value untouched. An empty-string title
    /// or description is also treated as absent rather than clearing the
    /// field; clients depend on this, so it is kept for wire compatibility.
    pub fn apply_patch(&mut self, patch: &TaskPatch) {
        if let Some(title) = patch.title.as_deref() {
            if !title.is_empty() {
                self.title = title.to_string();
            }
        }
        if let Some(description) = patch.description.as_deref() {
            if !description.is_empty() {
                self.description = description.to_string();
            }
        }
        if let Some(done) = patch.done {
            self.done = done;
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
    }
}
