// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{MemoryEngine, run_all};
use crate::{Task, tasks_for_event};
use enrolsync_domain::{Item, ItemRef, ProfileField};
use enrolsync_events::InboundEvent;

#[test]
fn test_course_in_category_then_category_deleted() {
    let mut engine: MemoryEngine = MemoryEngine::new();

    engine.add_category(1, "Cat1");
    let tasks: Vec<Task> = tasks_for_event(
        &mut engine,
        &InboundEvent::ItemCreated {
            item: Item::new(ItemRef::category(1), "Cat1"),
        },
    )
    .unwrap();
    run_all(&mut engine, &tasks);

    engine.add_course(10, "C1", 1);
    let tasks: Vec<Task> = tasks_for_event(
        &mut engine,
        &InboundEvent::CourseCreated {
            course: Item::new(ItemRef::course(10), "C1"),
            category: Item::new(ItemRef::category(1), "Cat1"),
        },
    )
    .unwrap();
    run_all(&mut engine, &tasks);

    assert_eq!(engine.enrolments.len(), 2);
    assert!(engine.is_enrolled(ItemRef::course(10), 10));
    assert!(engine.is_enrolled(ItemRef::category(1), 10));
    assert_eq!(engine.rules.len(), 2);
    assert!(engine.rules.values().all(|r| r.enabled && r.conditions.len() == 2));
    assert_eq!(engine.allowed_of(ProfileField::Course), vec!["C1"]);
    assert_eq!(engine.allowed_of(ProfileField::Category), vec!["Cat1"]);

    let course_group_id: i64 = engine.group_of(ItemRef::course(10)).unwrap().group_id;

    engine.categories.remove(&1);
    let tasks: Vec<Task> = tasks_for_event(
        &mut engine,
        &InboundEvent::ItemDeleted {
            item: Item::new(ItemRef::category(1), "Cat1"),
        },
    )
    .unwrap();
    run_all(&mut engine, &tasks);

    assert!(engine.group_of(ItemRef::category(1)).is_none());
    assert_eq!(engine.rules.len(), 1);
    assert!(!engine.is_enrolled(ItemRef::category(1), 10));
    assert!(engine.allowed_of(ProfileField::Category).is_empty());

    assert_eq!(engine.group_of(ItemRef::course(10)).unwrap().group_id, course_group_id);
    assert!(engine.is_enrolled(ItemRef::course(10), 10));
    assert_eq!(engine.enrolments.len(), 1);
}
