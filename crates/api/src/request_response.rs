// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.

use enrolsync::Changes;
use enrolsync_domain::{ItemRef, ItemType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Presets
// ============================================================================

/// API request to create or overwrite a preset.
///
/// Id lists may arrive unsorted or with duplicates; they are normalised
/// before storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetRequest {
    /// The preset name. Also the name of its group and profile value.
    pub name: String,
    #[serde(default)]
    pub categories: Vec<i64>,
    #[serde(default)]
    pub courses: Vec<i64>,
    #[serde(default)]
    pub tags: Vec<i64>,
}

/// A stored preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetInfo {
    pub preset_id: i64,
    pub name: String,
    pub categories: Vec<i64>,
    pub courses: Vec<i64>,
    pub tags: Vec<i64>,
    /// Id of the operator who last saved the preset.
    pub user_modified: String,
    pub time_created: String,
    pub time_modified: String,
}

/// API response for a preset create, update or delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetWriteResponse {
    /// The stored preset; absent after a delete.
    pub preset: Option<PresetInfo>,
    /// The outbound event name, e.g. `preset_updated`.
    pub event: String,
    /// Queue ids of the tasks the event dispatched to.
    pub task_ids: Vec<i64>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPresetsResponse {
    pub presets: Vec<PresetInfo>,
}

// ============================================================================
// Catalog
// ============================================================================

/// API response for an applied catalog mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEventResponse {
    /// The category, course or tag the mutation created or changed.
    pub item: Option<ItemRef>,
    /// The inbound event raised, or `None` if nothing changed.
    pub event: Option<String>,
    pub task_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub category_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseInfo {
    pub course_id: i64,
    pub fullname: String,
    pub category_id: i64,
    pub tag_ids: Vec<i64>,
    /// Ids of the groups enrolled into this course.
    pub group_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagInfo {
    pub tag_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListCategoriesResponse {
    pub categories: Vec<CategoryInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListCoursesResponse {
    pub courses: Vec<CourseInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListTagsResponse {
    pub tags: Vec<TagInfo>,
}

// ============================================================================
// Task queue
// ============================================================================

/// A queued task as reported to operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInfo {
    pub task_id: i64,
    pub kind: String,
    /// `pending`, `done` or `failed`.
    pub status: String,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListTasksResponse {
    pub tasks: Vec<TaskInfo>,
    pub pending: usize,
    pub failed: usize,
}

/// API request to drain the queue synchronously.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTasksRequest {
    /// Maximum number of tasks to finish in this call.
    pub limit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTasksResponse {
    pub completed: usize,
    pub retried: usize,
    pub parked: usize,
    pub enrolments_added: usize,
    pub enrolments_removed: usize,
}

// ============================================================================
// Users
// ============================================================================

/// A group the user currently belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupInfo {
    pub group_id: i64,
    pub name: String,
    pub item_type: ItemType,
    pub item_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGroupsResponse {
    pub user_id: i64,
    pub groups: Vec<GroupInfo>,
}

/// API request to change a user's synced profile fields.
///
/// Fields absent from `selections` are left untouched; an empty list clears
/// the field. `enrolled_until` is left untouched when absent and cleared
/// when it is an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetUserProfileRequest {
    /// Selected values keyed by field shortname (`course`, `category`, `tag`, `preset`).
    #[serde(default)]
    pub selections: BTreeMap<String, Vec<String>>,
    /// RFC 3339 timestamp or `YYYY-MM-DD`.
    #[serde(default)]
    pub enrolled_until: Option<String>,
}

// ============================================================================
// Set-up sync
// ============================================================================

/// One item the set-up sync adds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupEntryInfo {
    pub item_type: ItemType,
    pub item_id: i64,
    pub name: String,
    pub course_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupPlanResponse {
    pub entries: Vec<SetupEntryInfo>,
    pub tags: usize,
    pub categories: usize,
    pub courses: usize,
    pub presets: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSetupResponse {
    pub plan: SetupPlanResponse,
    pub enrolments_added: usize,
    pub enrolments_removed: usize,
}

impl RunSetupResponse {
    #[must_use]
    pub const fn new(plan: SetupPlanResponse, changes: Changes) -> Self {
        Self {
            plan,
            enrolments_added: changes.enrolments_added,
            enrolments_removed: changes.enrolments_removed,
        }
    }
}
