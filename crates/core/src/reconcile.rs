// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Enrolment Reconciler.
//!
//! Each entry point brings groups, rules, profile values and enrolment
//! methods in line with one event. Every write is preceded by an existence
//! check, so running the same task twice leaves the same state.

use crate::context::ReconcileContext;
use crate::engine::ContentEngine;
use crate::error::CoreError;
use crate::task::Task;
use crate::{groups, profile_sync, registry, rule_sync};
use enrolsync_domain::{
    EnrolmentMethod, GroupBinding, Item, ItemRef, ItemType, Preset, PresetScope,
    validate_item_id, validate_item_name,
};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Enrolment methods touched by one reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Changes {
    pub enrolments_added: usize,
    pub enrolments_removed: usize,
}

impl Changes {
    pub const fn merge(&mut self, other: Self) {
        self.enrolments_added += other.enrolments_added;
        self.enrolments_removed += other.enrolments_removed;
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.enrolments_added == 0 && self.enrolments_removed == 0
    }
}

fn add_method<E: ContentEngine>(
    engine: &mut E,
    ctx: &ReconcileContext,
    group_id: i64,
    course_id: i64,
    changes: &mut Changes,
) -> Result<(), CoreError> {
    let method: EnrolmentMethod = EnrolmentMethod {
        group_id,
        course_id,
        role_id: ctx.student_role_id,
    };
    if engine.enrolment_exists(method)? {
        debug!(group_id, course_id, "Enrolment method already present");
        return Ok(());
    }
    engine.add_enrolment(method)?;
    changes.enrolments_added += 1;
    info!(group_id, course_id, role_id = method.role_id, "Added enrolment method");
    Ok(())
}

fn remove_method<E: ContentEngine>(
    engine: &mut E,
    method: EnrolmentMethod,
    changes: &mut Changes,
) -> Result<(), CoreError> {
    if !engine.enrolment_exists(method)? {
        debug!(
            group_id = method.group_id,
            course_id = method.course_id,
            "Enrolment method already absent"
        );
        return Ok(());
    }
    engine.remove_enrolment(method)?;
    changes.enrolments_removed += 1;
    info!(
        group_id = method.group_id,
        course_id = method.course_id,
        role_id = method.role_id,
        "Removed enrolment method"
    );
    Ok(())
}

fn student_courses<E: ContentEngine>(
    engine: &mut E,
    ctx: &ReconcileContext,
    group_id: i64,
) -> Result<BTreeSet<i64>, CoreError> {
    Ok(engine
        .enrolments_for_group(group_id)?
        .into_iter()
        .filter(|m| m.role_id == ctx.student_role_id)
        .map(|m| m.course_id)
        .collect())
}

const fn student_method(ctx: &ReconcileContext, group_id: i64, course_id: i64) -> EnrolmentMethod {
    EnrolmentMethod {
        group_id,
        course_id,
        role_id: ctx.student_role_id,
    }
}

/// Group, rule and profile value for an item, created where missing.
///
/// # Errors
///
/// Returns an error if the item is invalid or the engine fails.
pub fn bind_item<E: ContentEngine>(engine: &mut E, item: &Item) -> Result<GroupBinding, CoreError> {
    validate_item_id(item.item.item_id)?;
    validate_item_name(&item.name)?;

    let group: GroupBinding = groups::get_or_create(engine, item.item, &item.name)?;
    rule_sync::ensure_rule(engine, &group, &item.name)?;
    profile_sync::add_value(engine, item.item.item_type, &item.name)?;
    Ok(group)
}

/// Makes a preset's enrolment methods match its currently resolved course set.
///
/// A preset that was never bound is skipped; its own add task binds it.
fn sync_preset_enrolments<E: ContentEngine>(
    engine: &mut E,
    ctx: &ReconcileContext,
    preset: &Preset,
) -> Result<Changes, CoreError> {
    let mut changes: Changes = Changes::default();
    let Some(preset_id) = preset.preset_id else {
        return Ok(changes);
    };
    let Some(group) = groups::find_by_item(engine, ItemRef::preset(preset_id))? else {
        warn!(preset_id, "Preset has no group binding, skipping enrolment sync");
        return Ok(changes);
    };

    let resolved: BTreeSet<i64> = registry::resolve(engine, &preset.scope)?;
    let existing: BTreeSet<i64> = student_courses(engine, ctx, group.group_id)?;

    for course_id in existing.difference(&resolved) {
        remove_method(
            engine,
            student_method(ctx, group.group_id, *course_id),
            &mut changes,
        )?;
    }
    for course_id in resolved.difference(&existing) {
        add_method(engine, ctx, group.group_id, *course_id, &mut changes)?;
    }

    debug!(
        preset_id,
        added = changes.enrolments_added,
        removed = changes.enrolments_removed,
        "Synced preset enrolments"
    );
    Ok(changes)
}

/// Binds the item and enrols its group into the given courses.
///
/// Presets that reference the item receive the same courses.
///
/// # Errors
///
/// Returns an error if the item is invalid or the engine fails.
pub fn add_item<E: ContentEngine>(
    engine: &mut E,
    ctx: &ReconcileContext,
    item: &Item,
    course_ids: &BTreeSet<i64>,
) -> Result<Changes, CoreError> {
    let mut changes: Changes = Changes::default();
    let group: GroupBinding = bind_item(engine, item)?;

    for course_id in course_ids {
        add_method(engine, ctx, group.group_id, *course_id, &mut changes)?;
    }

    if item.item.item_type != ItemType::Preset && !course_ids.is_empty() {
        for preset in engine.presets_referencing(item.item)? {
            let Some(preset_id) = preset.preset_id else {
                continue;
            };
            let preset_item: Item = Item::new(ItemRef::preset(preset_id), preset.name);
            let preset_group: GroupBinding = bind_item(engine, &preset_item)?;
            for course_id in course_ids {
                add_method(engine, ctx, preset_group.group_id, *course_id, &mut changes)?;
            }
        }
    }

    info!(
        item = %item.item,
        name = %item.name,
        courses = course_ids.len(),
        added = changes.enrolments_added,
        "Added item"
    );
    Ok(changes)
}

/// Renames the item's group, rule and profile value, rewriting user data.
///
/// An unbound item or an unchanged name is a no-op.
///
/// # Errors
///
/// Returns an error if the name is empty or the engine fails.
pub fn rename_item<E: ContentEngine>(
    engine: &mut E,
    item: ItemRef,
    new_name: &str,
) -> Result<(), CoreError> {
    validate_item_name(new_name)?;

    let Some(group) = groups::find_by_item(engine, item)? else {
        debug!(%item, "No group binding, nothing to rename");
        return Ok(());
    };
    if group.name == new_name {
        debug!(%item, name = new_name, "Name unchanged");
        return Ok(());
    }

    groups::rename(engine, &group, new_name)?;
    rule_sync::rename_rule(engine, &group, new_name)?;
    if name_shared(engine, item, &group.name)? {
        // Selections of the old name may belong to the other item.
        profile_sync::add_value(engine, item.item_type, new_name)?;
        debug!(%item, old = %group.name, "Old name still in use, kept");
    } else {
        profile_sync::rename_value(engine, item.item_type, &group.name, new_name)?;
    }

    info!(%item, old = %group.name, new = new_name, "Renamed item");
    Ok(())
}

/// Removes everything bound to the item and strips it from presets.
///
/// # Errors
///
/// Returns an error if the engine fails.
pub fn remove_item<E: ContentEngine>(
    engine: &mut E,
    ctx: &ReconcileContext,
    item: &Item,
) -> Result<Changes, CoreError> {
    let mut changes: Changes = Changes::default();

    if let Some(group) = groups::find_by_item(engine, item.item)? {
        for method in engine.enrolments_for_group(group.group_id)? {
            remove_method(engine, method, &mut changes)?;
        }
        rule_sync::delete_rules(engine, &group)?;
        groups::delete(engine, &group)?;
    } else {
        warn!(item = %item.item, "No group binding to remove");
    }

    if name_shared(engine, item.item, &item.name)? {
        debug!(item = %item.item, name = %item.name, "Name still in use, profile value kept");
    } else {
        profile_sync::remove_value(engine, item.item.item_type, &item.name)?;
    }

    if item.item.item_type != ItemType::Preset {
        for preset in engine.presets_referencing(item.item)? {
            changes.merge(strip_from_preset(engine, ctx, preset, item.item)?);
        }
    }

    info!(
        item = %item.item,
        name = %item.name,
        removed = changes.enrolments_removed,
        "Removed item"
    );
    Ok(changes)
}

/// True when a live item of the same type other than `item` is named `name`.
fn name_shared<E: ContentEngine>(
    engine: &mut E,
    item: ItemRef,
    name: &str,
) -> Result<bool, CoreError> {
    Ok(registry::all_items_of(engine, item.item_type)?
        .iter()
        .any(|other| other.item != item && other.name == name))
}

fn strip_from_preset<E: ContentEngine>(
    engine: &mut E,
    ctx: &ReconcileContext,
    mut preset: Preset,
    item: ItemRef,
) -> Result<Changes, CoreError> {
    let Some(preset_id) = preset.preset_id else {
        return Ok(Changes::default());
    };
    if !preset.scope.strip(item) {
        return Ok(Changes::default());
    }
    engine.update_preset_scope(preset_id, &preset.scope)?;
    info!(preset_id, %item, "Stripped deleted item from preset");

    sync_preset_enrolments(engine, ctx, &preset)
}

/// Removes the item group's enrolment method for one course, or all of them.
///
/// Presets that reference the item are re-synced against the catalog.
///
/// # Errors
///
/// Returns an error if the engine fails.
pub fn remove_enrolment_method<E: ContentEngine>(
    engine: &mut E,
    ctx: &ReconcileContext,
    item: ItemRef,
    course_id: Option<i64>,
) -> Result<Changes, CoreError> {
    let mut changes: Changes = Changes::default();

    if let Some(group) = groups::find_by_item(engine, item)? {
        let courses: BTreeSet<i64> = match course_id {
            Some(id) => BTreeSet::from([id]),
            None => student_courses(engine, ctx, group.group_id)?,
        };
        for course in courses {
            remove_method(engine, student_method(ctx, group.group_id, course), &mut changes)?;
        }
    } else {
        debug!(%item, "No group binding, nothing to unenrol");
    }

    if item.item_type != ItemType::Preset {
        for preset in engine.presets_referencing(item)? {
            changes.merge(sync_preset_enrolments(engine, ctx, &preset)?);
        }
    }

    Ok(changes)
}

/// Moves a course's category enrolment from the old category's group to the new one.
///
/// Presets referencing either category are re-synced, so a course still
/// reachable through another member of a preset stays enrolled.
///
/// # Errors
///
/// Returns an error if the engine fails.
pub fn move_course<E: ContentEngine>(
    engine: &mut E,
    ctx: &ReconcileContext,
    course_id: i64,
    old_category_id: i64,
    new_category_id: i64,
) -> Result<Changes, CoreError> {
    let mut changes: Changes = Changes::default();
    if old_category_id == new_category_id {
        debug!(course_id, category_id = old_category_id, "Category unchanged");
        return Ok(changes);
    }

    if let Some(old_group) = groups::find_by_item(engine, ItemRef::category(old_category_id))? {
        remove_method(
            engine,
            student_method(ctx, old_group.group_id, course_id),
            &mut changes,
        )?;
    }

    match groups::find_by_item(engine, ItemRef::category(new_category_id))? {
        Some(new_group) => add_method(engine, ctx, new_group.group_id, course_id, &mut changes)?,
        None => warn!(
            course_id,
            category_id = new_category_id,
            "New category has no group binding"
        ),
    }

    let mut seen: BTreeSet<i64> = BTreeSet::new();
    for category_id in [old_category_id, new_category_id] {
        for preset in engine.presets_referencing(ItemRef::category(category_id))? {
            let Some(preset_id) = preset.preset_id else {
                continue;
            };
            if seen.insert(preset_id) {
                changes.merge(sync_preset_enrolments(engine, ctx, &preset)?);
            }
        }
    }

    info!(
        course_id,
        old_category_id,
        new_category_id,
        added = changes.enrolments_added,
        removed = changes.enrolments_removed,
        "Moved course"
    );
    Ok(changes)
}

/// Applies a preset redefinition at course granularity.
///
/// Both scopes are resolved against the current catalog. A course is removed
/// only when no remaining category, course or tag of the preset reaches it.
///
/// # Errors
///
/// Returns `CoreError::GroupNotFound` if the preset was never bound, or an
/// error if the engine fails.
pub fn update_preset<E: ContentEngine>(
    engine: &mut E,
    ctx: &ReconcileContext,
    preset_id: i64,
    old_scope: &PresetScope,
    new_scope: &PresetScope,
) -> Result<Changes, CoreError> {
    let item: ItemRef = ItemRef::preset(preset_id);
    let group: GroupBinding =
        groups::find_by_item(engine, item)?.ok_or(CoreError::GroupNotFound(item))?;

    let old_resolved: BTreeSet<i64> = registry::resolve(engine, old_scope)?;
    let new_resolved: BTreeSet<i64> = registry::resolve(engine, new_scope)?;
    let existing: BTreeSet<i64> = student_courses(engine, ctx, group.group_id)?;

    let to_remove: BTreeSet<i64> = old_resolved
        .union(&existing)
        .filter(|course| !new_resolved.contains(course))
        .copied()
        .collect();
    let to_add: BTreeSet<i64> = new_resolved.difference(&existing).copied().collect();

    let mut changes: Changes = Changes::default();
    for course_id in to_remove {
        remove_method(engine, student_method(ctx, group.group_id, course_id), &mut changes)?;
    }
    for course_id in to_add {
        add_method(engine, ctx, group.group_id, course_id, &mut changes)?;
    }

    info!(
        preset_id,
        added = changes.enrolments_added,
        removed = changes.enrolments_removed,
        "Updated preset enrolments"
    );
    Ok(changes)
}

/// Validates and runs one task against the engine.
///
/// # Errors
///
/// Returns an error if the payload is invalid or any step fails. The caller
/// is expected to roll back everything the task wrote.
pub fn execute<E: ContentEngine>(
    engine: &mut E,
    ctx: &ReconcileContext,
    task: &Task,
) -> Result<Changes, CoreError> {
    task.validate()?;
    debug!(kind = task.kind(), "Executing task");

    match task {
        Task::AddItem {
            item_id,
            item_type,
            item_name,
            course_ids,
        } => {
            let item: Item = Item::new(ItemRef::new(*item_type, *item_id), item_name.as_str());
            let courses: BTreeSet<i64> = course_ids.iter().copied().collect();
            add_item(engine, ctx, &item, &courses)
        }
        Task::RemoveItem {
            item_id,
            item_type,
            item_name,
        } => {
            let item: Item = Item::new(ItemRef::new(*item_type, *item_id), item_name.as_str());
            remove_item(engine, ctx, &item)
        }
        Task::RenameItem {
            item_id,
            item_type,
            new_name,
        } => {
            rename_item(engine, ItemRef::new(*item_type, *item_id), new_name)?;
            Ok(Changes::default())
        }
        Task::RemoveEnrolmentMethod {
            item_id,
            item_type,
            course_id,
        } => remove_enrolment_method(engine, ctx, ItemRef::new(*item_type, *item_id), *course_id),
        Task::UpdatePresetData {
            item_id,
            categories,
            old_categories,
            courses,
            old_courses,
            tags,
            old_tags,
            ..
        } => {
            let old_scope: PresetScope =
                PresetScope::new(old_categories.clone(), old_courses.clone(), old_tags.clone());
            let new_scope: PresetScope =
                PresetScope::new(categories.clone(), courses.clone(), tags.clone());
            update_preset(engine, ctx, *item_id, &old_scope, &new_scope)
        }
        Task::MoveCourse {
            course_id,
            old_category_id,
            new_category_id,
        } => move_course(engine, ctx, *course_id, *old_category_id, *new_category_id),
    }
}

/// Resolves the reconcile context and executes the task.
///
/// # Errors
///
/// Returns an error if the student role is missing or the task fails.
pub fn run_task<E: ContentEngine>(engine: &mut E, task: &Task) -> Result<Changes, CoreError> {
    let ctx: ReconcileContext = ReconcileContext::resolve(engine)?;
    execute(engine, &ctx, task)
}
