// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::ids;
use crate::{CoreError, Task};
use enrolsync_domain::{IdSet, Item, ItemRef, ItemType, PresetScope};
use std::collections::BTreeSet;

#[test]
fn test_validate_reports_missing_fields() {
    let task: Task = Task::AddItem {
        item_id: 0,
        item_type: ItemType::Tag,
        item_name: String::from("Lab"),
        course_ids: vec![],
    };
    assert_eq!(
        task.validate(),
        Err(CoreError::MissingField(String::from("itemid")))
    );

    let task: Task = Task::RemoveItem {
        item_id: 4,
        item_type: ItemType::Tag,
        item_name: String::new(),
    };
    assert_eq!(
        task.validate(),
        Err(CoreError::MissingField(String::from("itemname")))
    );
}

#[test]
fn test_update_preset_data_requires_preset_type() {
    let task: Task = Task::UpdatePresetData {
        item_id: 3,
        item_type: ItemType::Tag,
        item_name: String::from("Bundle"),
        categories: IdSet::new(),
        old_categories: IdSet::new(),
        courses: IdSet::new(),
        old_courses: IdSet::new(),
        tags: IdSet::new(),
        old_tags: IdSet::new(),
    };
    assert!(task.validate().is_err());

    let scope: PresetScope = PresetScope::new(ids(&[1]), ids(&[]), ids(&[]));
    let valid: Task = Task::update_preset_data(3, "Bundle", &PresetScope::default(), &scope);
    assert!(valid.validate().is_ok());
}

#[test]
fn test_task_payload_is_self_contained_json() {
    let task: Task = Task::add_item(
        &Item::new(ItemRef::category(2), "Arts"),
        &BTreeSet::from([20, 21]),
    );
    let json: String = serde_json::to_string(&task).unwrap();

    assert_eq!(
        json,
        r#"{"kind":"add_item","item_id":2,"item_type":"category","item_name":"Arts","course_ids":[20,21]}"#
    );
    let parsed: Task = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, task);
    assert_eq!(parsed.kind(), "add_item");
}

#[test]
fn test_remove_enrolment_method_course_is_optional() {
    let all: Task = Task::remove_enrolment_method(ItemRef::tag(3), None);
    let one: Task = Task::remove_enrolment_method(ItemRef::tag(3), Some(0));

    assert!(all.validate().is_ok());
    assert_eq!(
        one.validate(),
        Err(CoreError::MissingField(String::from("courseid")))
    );
}
