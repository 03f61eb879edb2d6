// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{MemoryEngine, ids};
use crate::{CoreError, Task, tasks_for_event, tasks_for_preset_event};
use enrolsync_domain::{Item, ItemRef, PresetScope};
use enrolsync_events::{Actor, InboundEvent, PresetEvent};
use std::collections::BTreeSet;

#[test]
fn test_course_created_adds_course_and_category() {
    let mut engine: MemoryEngine = MemoryEngine::new();
    let event: InboundEvent = InboundEvent::CourseCreated {
        course: Item::new(ItemRef::course(10), "C1"),
        category: Item::new(ItemRef::category(1), "Cat1"),
    };

    let tasks: Vec<Task> = tasks_for_event(&mut engine, &event).unwrap();

    assert_eq!(
        tasks,
        vec![
            Task::add_item(&Item::new(ItemRef::course(10), "C1"), &BTreeSet::from([10])),
            Task::add_item(&Item::new(ItemRef::category(1), "Cat1"), &BTreeSet::from([10])),
        ]
    );
}

#[test]
fn test_tag_events_map_to_add_and_remove_method() {
    let mut engine: MemoryEngine = MemoryEngine::new();

    let added: Vec<Task> = tasks_for_event(
        &mut engine,
        &InboundEvent::CourseTagAdded {
            course_id: 10,
            tag: Item::new(ItemRef::tag(7), "Lab"),
        },
    )
    .unwrap();
    let removed: Vec<Task> = tasks_for_event(
        &mut engine,
        &InboundEvent::CourseTagRemoved {
            course_id: 10,
            tag_id: 7,
        },
    )
    .unwrap();

    assert_eq!(
        added,
        vec![Task::add_item(
            &Item::new(ItemRef::tag(7), "Lab"),
            &BTreeSet::from([10])
        )]
    );
    assert_eq!(
        removed,
        vec![Task::remove_enrolment_method(ItemRef::tag(7), Some(10))]
    );
}

#[test]
fn test_deleted_item_task_carries_name() {
    let mut engine: MemoryEngine = MemoryEngine::new();
    let tasks: Vec<Task> = tasks_for_event(
        &mut engine,
        &InboundEvent::ItemDeleted {
            item: Item::new(ItemRef::category(1), "Cat1"),
        },
    )
    .unwrap();

    assert_eq!(
        tasks,
        vec![Task::RemoveItem {
            item_id: 1,
            item_type: enrolsync_domain::ItemType::Category,
            item_name: String::from("Cat1"),
        }]
    );
}

#[test]
fn test_inbound_preset_events_are_rejected() {
    let mut engine: MemoryEngine = MemoryEngine::new();
    let result: Result<Vec<Task>, CoreError> = tasks_for_event(
        &mut engine,
        &InboundEvent::ItemRenamed {
            item: ItemRef::preset(1),
            new_name: String::from("X"),
        },
    );
    assert!(matches!(result, Err(CoreError::Engine(_))));
}

#[test]
fn test_preset_created_resolves_courses_at_dispatch() {
    let mut engine: MemoryEngine = MemoryEngine::new();
    engine.add_course(10, "K", 1);
    engine.add_course(11, "L", 1);
    let scope: PresetScope = PresetScope::new(ids(&[1]), ids(&[30]), ids(&[]));

    let tasks: Vec<Task> = tasks_for_preset_event(
        &mut engine,
        &PresetEvent::created(3, "Bundle", scope, Actor::system()),
    )
    .unwrap();

    assert_eq!(
        tasks,
        vec![Task::add_item(
            &Item::new(ItemRef::preset(3), "Bundle"),
            &BTreeSet::from([10, 11, 30])
        )]
    );
}

#[test]
fn test_preset_updated_with_rename_queues_rename_first() {
    let mut engine: MemoryEngine = MemoryEngine::new();
    let old_scope: PresetScope = PresetScope::new(ids(&[1]), ids(&[]), ids(&[]));
    let new_scope: PresetScope = PresetScope::new(ids(&[2]), ids(&[]), ids(&[]));

    let tasks: Vec<Task> = tasks_for_preset_event(
        &mut engine,
        &PresetEvent::updated(
            3,
            "Old",
            "New",
            old_scope.clone(),
            new_scope.clone(),
            Actor::system(),
        ),
    )
    .unwrap();

    assert_eq!(
        tasks,
        vec![
            Task::rename_item(ItemRef::preset(3), "New"),
            Task::update_preset_data(3, "New", &old_scope, &new_scope),
        ]
    );
}

#[test]
fn test_preset_deleted_removes_item() {
    let mut engine: MemoryEngine = MemoryEngine::new();
    let tasks: Vec<Task> = tasks_for_preset_event(
        &mut engine,
        &PresetEvent::deleted(3, "Bundle", PresetScope::default(), Actor::system()),
    )
    .unwrap();

    assert_eq!(
        tasks,
        vec![Task::remove_item(&Item::new(ItemRef::preset(3), "Bundle"))]
    );
}
