// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Event-to-Task Dispatcher.
//!
//! Runs synchronously when an event fires and only reads: it captures the
//! ids and names a task will need and leaves all writes to the task.

use crate::engine::ItemCatalog;
use crate::error::CoreError;
use crate::registry;
use crate::task::Task;
use enrolsync_domain::{Item, ItemRef, ItemType};
use enrolsync_events::{InboundEvent, PresetEvent, PresetEventKind};
use std::collections::BTreeSet;
use tracing::debug;

/// Tasks for a catalog event, in execution order.
///
/// # Errors
///
/// Returns an error if the event names a preset or the catalog cannot be read.
pub fn tasks_for_event<E: ItemCatalog>(
    engine: &mut E,
    event: &InboundEvent,
) -> Result<Vec<Task>, CoreError> {
    if !event.is_catalog_event() {
        return Err(CoreError::Engine(format!(
            "{} events for presets must be raised as preset events",
            event.name()
        )));
    }

    let tasks: Vec<Task> = match event {
        InboundEvent::ItemCreated { item } => {
            let courses: BTreeSet<i64> = catalog_courses(engine, item.item)?;
            vec![Task::add_item(item, &courses)]
        }
        InboundEvent::CourseCreated { course, category } => {
            let courses: BTreeSet<i64> = BTreeSet::from([course.item.item_id]);
            vec![
                Task::add_item(course, &courses),
                Task::add_item(category, &courses),
            ]
        }
        InboundEvent::ItemRenamed { item, new_name } => vec![Task::rename_item(*item, new_name)],
        InboundEvent::ItemDeleted { item } => vec![Task::remove_item(item)],
        InboundEvent::CourseCategoryChanged {
            course_id,
            old_category_id,
            new_category_id,
        } => vec![Task::MoveCourse {
            course_id: *course_id,
            old_category_id: *old_category_id,
            new_category_id: *new_category_id,
        }],
        InboundEvent::CourseTagAdded { course_id, tag } => {
            vec![Task::add_item(tag, &BTreeSet::from([*course_id]))]
        }
        InboundEvent::CourseTagRemoved { course_id, tag_id } => vec![
            Task::remove_enrolment_method(ItemRef::tag(*tag_id), Some(*course_id)),
        ],
    };

    debug!(event = event.name(), tasks = tasks.len(), "Dispatched catalog event");
    Ok(tasks)
}

fn catalog_courses<E: ItemCatalog>(
    engine: &mut E,
    item: ItemRef,
) -> Result<BTreeSet<i64>, CoreError> {
    match item.item_type {
        ItemType::Tag => engine.courses_with_tag(item.item_id),
        ItemType::Category => engine.courses_in_category(item.item_id),
        ItemType::Course => Ok(BTreeSet::from([item.item_id])),
        ItemType::Preset => Ok(BTreeSet::new()),
    }
}

/// Tasks for an outbound preset event, in execution order.
///
/// A rename is queued ahead of the data update so the update sees the new name.
///
/// # Errors
///
/// Returns an error if the catalog cannot be read.
pub fn tasks_for_preset_event<E: ItemCatalog>(
    engine: &mut E,
    event: &PresetEvent,
) -> Result<Vec<Task>, CoreError> {
    let preset: ItemRef = ItemRef::preset(event.preset_id);

    let tasks: Vec<Task> = match event.kind {
        PresetEventKind::Created => {
            let courses: BTreeSet<i64> = registry::resolve(engine, &event.scope)?;
            vec![Task::add_item(
                &Item::new(preset, event.preset_name.as_str()),
                &courses,
            )]
        }
        PresetEventKind::Updated => {
            let mut tasks: Vec<Task> = Vec::with_capacity(2);
            if event.is_rename() {
                tasks.push(Task::rename_item(preset, &event.preset_name));
            }
            tasks.push(Task::update_preset_data(
                event.preset_id,
                &event.preset_name,
                &event.old_scope,
                &event.scope,
            ));
            tasks
        }
        PresetEventKind::Deleted => vec![Task::remove_item(&Item::new(
            preset,
            event.preset_name.as_str(),
        ))],
    };

    debug!(
        event = event.kind.as_str(),
        preset_id = event.preset_id,
        tasks = tasks.len(),
        "Dispatched preset event"
    );
    Ok(tasks)
}
