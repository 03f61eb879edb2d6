// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]

//! Domain events exchanged with the content engine.
//!
//! Inbound events describe catalog changes made outside enrolsync. Outbound
//! preset events are emitted whenever an administrator saves or deletes a
//! preset. Every event carries the names and ids its tasks need, so the
//! work can be done after the source entity is gone.

use enrolsync_domain::{Item, ItemRef, ItemType, PresetScope};
use serde::{Deserialize, Serialize};

/// Represents the entity performing an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The type of actor (e.g., "admin", "system").
    pub actor_type: String,
}

impl Actor {
    #[must_use]
    pub const fn new(id: String, actor_type: String) -> Self {
        Self { id, actor_type }
    }

    /// The actor used for work enrolsync starts on its own.
    #[must_use]
    pub fn system() -> Self {
        Self::new(String::from("system"), String::from("system"))
    }
}

/// A catalog change raised by the content engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InboundEvent {
    /// A tag or category was created.
    ItemCreated { item: Item },
    /// A course was created inside a category.
    CourseCreated { course: Item, category: Item },
    /// A tag, course or category changed its name.
    ItemRenamed { item: ItemRef, new_name: String },
    /// A tag, course or category was deleted. `name` is the last known name.
    ItemDeleted { item: Item },
    /// A course moved to a different category.
    CourseCategoryChanged {
        course_id: i64,
        old_category_id: i64,
        new_category_id: i64,
    },
    /// A tag was attached to a course.
    CourseTagAdded { course_id: i64, tag: Item },
    /// A tag was detached from a course.
    CourseTagRemoved { course_id: i64, tag_id: i64 },
}

impl InboundEvent {
    /// Stable event name used in logs and the catalog intake API.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ItemCreated { .. } => "item_created",
            Self::CourseCreated { .. } => "course_created",
            Self::ItemRenamed { .. } => "item_renamed",
            Self::ItemDeleted { .. } => "item_deleted",
            Self::CourseCategoryChanged { .. } => "course_category_changed",
            Self::CourseTagAdded { .. } => "course_tag_added",
            Self::CourseTagRemoved { .. } => "course_tag_removed",
        }
    }

    /// Whether the event refers to an item type the content engine owns.
    ///
    /// Presets travel as [`PresetEvent`], never as inbound events.
    #[must_use]
    pub const fn is_catalog_event(&self) -> bool {
        match self {
            Self::ItemCreated { item } | Self::ItemDeleted { item } => {
                !matches!(item.item.item_type, ItemType::Preset)
            }
            Self::ItemRenamed { item, .. } => !matches!(item.item_type, ItemType::Preset),
            Self::CourseCreated { .. }
            | Self::CourseCategoryChanged { .. }
            | Self::CourseTagAdded { .. }
            | Self::CourseTagRemoved { .. } => true,
        }
    }
}

/// What happened to a preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetEventKind {
    Created,
    Updated,
    Deleted,
}

impl PresetEventKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "preset_created",
            Self::Updated => "preset_updated",
            Self::Deleted => "preset_deleted",
        }
    }
}

/// Outbound event emitted on every preset save or delete.
///
/// Carries both the new and the previous id sets so subscribers can diff.
/// For `Created` the previous sets are empty; for `Deleted` the new sets are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetEvent {
    pub kind: PresetEventKind,
    pub preset_id: i64,
    pub preset_name: String,
    /// The name before an update. Equal to `preset_name` otherwise.
    pub old_preset_name: String,
    pub scope: PresetScope,
    pub old_scope: PresetScope,
    pub actor: Actor,
}

impl PresetEvent {
    #[must_use]
    pub fn created(preset_id: i64, name: &str, scope: PresetScope, actor: Actor) -> Self {
        Self {
            kind: PresetEventKind::Created,
            preset_id,
            preset_name: name.to_string(),
            old_preset_name: name.to_string(),
            scope,
            old_scope: PresetScope::default(),
            actor,
        }
    }

    #[must_use]
    pub fn updated(
        preset_id: i64,
        old_name: &str,
        new_name: &str,
        old_scope: PresetScope,
        scope: PresetScope,
        actor: Actor,
    ) -> Self {
        Self {
            kind: PresetEventKind::Updated,
            preset_id,
            preset_name: new_name.to_string(),
            old_preset_name: old_name.to_string(),
            scope,
            old_scope,
            actor,
        }
    }

    #[must_use]
    pub fn deleted(preset_id: i64, name: &str, old_scope: PresetScope, actor: Actor) -> Self {
        Self {
            kind: PresetEventKind::Deleted,
            preset_id,
            preset_name: name.to_string(),
            old_preset_name: name.to_string(),
            scope: PresetScope::default(),
            old_scope,
            actor,
        }
    }

    #[must_use]
    pub fn is_rename(&self) -> bool {
        self.kind == PresetEventKind::Updated && self.preset_name != self.old_preset_name
    }
}
