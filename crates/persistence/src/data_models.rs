// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use enrolsync::{Changes, Task};
use enrolsync_domain::{ItemRef, PresetScope};
use enrolsync_events::{InboundEvent, PresetEvent};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryData {
    pub category_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseData {
    pub course_id: i64,
    pub fullname: String,
    pub category_id: i64,
    pub tag_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagData {
    pub tag_id: i64,
    pub name: String,
}

/// A stored preset with its audit columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetRecord {
    pub preset_id: i64,
    pub name: String,
    pub scope: PresetScope,
    pub user_modified: String,
    pub time_created: String,
    pub time_modified: String,
}

/// Lifecycle of a queued task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Done,
    Failed,
}

impl TaskStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Parses a stored status.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown status string.
    pub fn parse(value: &str) -> Result<Self, crate::PersistenceError> {
        match value {
            "pending" => Ok(Self::Pending),
            "done" => Ok(Self::Done),
            "failed" => Ok(Self::Failed),
            other => Err(crate::PersistenceError::SerializationError(format!(
                "Unknown task status '{other}'"
            ))),
        }
    }
}

/// A queued task as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub task_id: i64,
    pub kind: String,
    pub payload: Task,
    pub status: TaskStatus,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Outcome of draining the task queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Tasks that completed and were marked done.
    pub completed: usize,
    /// Attempts that failed and left the task pending for retry.
    pub retried: usize,
    /// Tasks parked as failed after exhausting their attempts.
    pub parked: usize,
    pub changes: Changes,
}

/// A catalog change made through the embedded content engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CatalogMutation {
    CreateCategory { name: String },
    RenameCategory { category_id: i64, name: String },
    DeleteCategory { category_id: i64 },
    CreateCourse { fullname: String, category_id: i64 },
    RenameCourse { course_id: i64, fullname: String },
    MoveCourse { course_id: i64, category_id: i64 },
    DeleteCourse { course_id: i64 },
    CreateTag { name: String },
    RenameTag { tag_id: i64, name: String },
    DeleteTag { tag_id: i64 },
    TagCourse { course_id: i64, tag_id: i64 },
    UntagCourse { course_id: i64, tag_id: i64 },
}

/// Result of a catalog mutation: the event it raised and the tasks queued for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogChange {
    /// The item created or changed, if the mutation targets one.
    pub item: Option<ItemRef>,
    /// `None` when the mutation changed nothing.
    pub event: Option<InboundEvent>,
    pub task_ids: Vec<i64>,
}

/// Result of a preset save or delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresetChange {
    /// The stored preset; `None` after a delete.
    pub preset: Option<PresetRecord>,
    pub event: PresetEvent,
    pub task_ids: Vec<i64>,
}
