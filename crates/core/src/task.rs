// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::CoreError;
use enrolsync_domain::{IdSet, Item, ItemRef, ItemType, PresetScope};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A durable, self-contained unit of reconciliation work.
///
/// Payloads carry names as well as ids: the item may be gone by the time
/// the task runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Task {
    AddItem {
        item_id: i64,
        item_type: ItemType,
        item_name: String,
        course_ids: Vec<i64>,
    },
    RemoveItem {
        item_id: i64,
        item_type: ItemType,
        item_name: String,
    },
    RenameItem {
        item_id: i64,
        item_type: ItemType,
        new_name: String,
    },
    /// Removes the item group's method for one course, or for all of them.
    RemoveEnrolmentMethod {
        item_id: i64,
        item_type: ItemType,
        course_id: Option<i64>,
    },
    UpdatePresetData {
        item_id: i64,
        item_type: ItemType,
        item_name: String,
        categories: IdSet,
        old_categories: IdSet,
        courses: IdSet,
        old_courses: IdSet,
        tags: IdSet,
        old_tags: IdSet,
    },
    MoveCourse {
        course_id: i64,
        old_category_id: i64,
        new_category_id: i64,
    },
}

impl Task {
    #[must_use]
    pub fn add_item(item: &Item, course_ids: &BTreeSet<i64>) -> Self {
        Self::AddItem {
            item_id: item.item.item_id,
            item_type: item.item.item_type,
            item_name: item.name.clone(),
            course_ids: course_ids.iter().copied().collect(),
        }
    }

    #[must_use]
    pub fn remove_item(item: &Item) -> Self {
        Self::RemoveItem {
            item_id: item.item.item_id,
            item_type: item.item.item_type,
            item_name: item.name.clone(),
        }
    }

    #[must_use]
    pub fn rename_item(item: ItemRef, new_name: &str) -> Self {
        Self::RenameItem {
            item_id: item.item_id,
            item_type: item.item_type,
            new_name: new_name.to_string(),
        }
    }

    #[must_use]
    pub const fn remove_enrolment_method(item: ItemRef, course_id: Option<i64>) -> Self {
        Self::RemoveEnrolmentMethod {
            item_id: item.item_id,
            item_type: item.item_type,
            course_id,
        }
    }

    #[must_use]
    pub fn update_preset_data(
        preset_id: i64,
        name: &str,
        old_scope: &PresetScope,
        scope: &PresetScope,
    ) -> Self {
        Self::UpdatePresetData {
            item_id: preset_id,
            item_type: ItemType::Preset,
            item_name: name.to_string(),
            categories: scope.categories.clone(),
            old_categories: old_scope.categories.clone(),
            courses: scope.courses.clone(),
            old_courses: old_scope.courses.clone(),
            tags: scope.tags.clone(),
            old_tags: old_scope.tags.clone(),
        }
    }

    /// Stable task name stored in the queue.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AddItem { .. } => "add_item",
            Self::RemoveItem { .. } => "remove_item",
            Self::RenameItem { .. } => "rename_item",
            Self::RemoveEnrolmentMethod { .. } => "remove_enrolment_method",
            Self::UpdatePresetData { .. } => "update_preset_data",
            Self::MoveCourse { .. } => "move_course",
        }
    }

    /// Checks that every required payload field is present.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::MissingField` naming the first empty field.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::AddItem {
                item_id, item_name, ..
            }
            | Self::RemoveItem {
                item_id, item_name, ..
            } => {
                require_id("itemid", *item_id)?;
                require_name("itemname", item_name)
            }
            Self::RenameItem {
                item_id, new_name, ..
            } => {
                require_id("itemid", *item_id)?;
                require_name("newname", new_name)
            }
            Self::RemoveEnrolmentMethod {
                item_id, course_id, ..
            } => {
                require_id("itemid", *item_id)?;
                course_id.map_or(Ok(()), |id| require_id("courseid", id))
            }
            Self::UpdatePresetData {
                item_id,
                item_type,
                item_name,
                ..
            } => {
                require_id("itemid", *item_id)?;
                require_name("itemname", item_name)?;
                if *item_type != ItemType::Preset {
                    return Err(CoreError::MissingField(String::from("itemtype")));
                }
                Ok(())
            }
            Self::MoveCourse {
                course_id,
                old_category_id,
                new_category_id,
            } => {
                require_id("courseid", *course_id)?;
                require_id("oldcategoryid", *old_category_id)?;
                require_id("newcategoryid", *new_category_id)
            }
        }
    }
}

fn require_id(field: &str, value: i64) -> Result<(), CoreError> {
    if value <= 0 {
        return Err(CoreError::MissingField(field.to_string()));
    }
    Ok(())
}

fn require_name(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::MissingField(field.to_string()));
    }
    Ok(())
}
