// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::{
    create_category, create_course, create_tag, create_test_admin, create_test_persistence,
    drain, enrolled_items, group_of, ids, tag_course,
};
use crate::{Persistence, PersistenceError, PresetChange, PresetRecord};
use enrolsync::Task;
use enrolsync_domain::{DomainError, IdSet, ItemRef, ItemType, PresetScope, ProfileField};
use enrolsync_events::PresetEventKind;
use std::collections::BTreeSet;

fn scope(categories: &[i64], courses: &[i64], tags: &[i64]) -> PresetScope {
    PresetScope::new(ids(categories), ids(courses), ids(tags))
}

#[test]
fn test_create_preset_requires_some_entity() {
    let mut persistence: Persistence = create_test_persistence();

    let result: Result<PresetChange, PersistenceError> =
        persistence.create_preset("Empty", &PresetScope::default(), &create_test_admin());

    assert_eq!(
        result.unwrap_err(),
        PersistenceError::InvalidInput(DomainError::EmptyPreset)
    );
    assert!(persistence.list_presets().unwrap().is_empty());
    assert!(persistence.list_tasks(None).unwrap().is_empty());
}

#[test]
fn test_create_preset_requires_name() {
    let mut persistence: Persistence = create_test_persistence();

    let result: Result<PresetChange, PersistenceError> =
        persistence.create_preset(" ", &scope(&[1], &[], &[]), &create_test_admin());

    assert!(matches!(
        result,
        Err(PersistenceError::InvalidInput(DomainError::InvalidName(_)))
    ));
}

#[test]
fn test_create_preset_stores_audit_columns_and_queues_add_item() {
    let mut persistence: Persistence = create_test_persistence();
    let science: i64 = create_category(&mut persistence, "Science");
    let chem: i64 = create_course(&mut persistence, "Chemistry", science);
    let bio: i64 = create_course(&mut persistence, "Biology", science);

    let change: PresetChange = persistence
        .create_preset("Year 9", &scope(&[science], &[], &[]), &create_test_admin())
        .unwrap();

    let preset: PresetRecord = change.preset.unwrap();
    assert_eq!(preset.name, "Year 9");
    assert_eq!(preset.user_modified, "admin-1");
    assert_eq!(preset.time_created, preset.time_modified);
    assert_eq!(change.event.kind, PresetEventKind::Created);

    assert_eq!(change.task_ids.len(), 1);
    assert_eq!(
        persistence.get_task(change.task_ids[0]).unwrap().payload,
        Task::AddItem {
            item_id: preset.preset_id,
            item_type: ItemType::Preset,
            item_name: String::from("Year 9"),
            course_ids: vec![chem, bio],
        }
    );
}

#[test]
fn test_preset_ids_are_normalised() {
    let mut persistence: Persistence = create_test_persistence();
    let courses: IdSet = [12, 3, 12, 7].into_iter().collect();

    let change: PresetChange = persistence
        .create_preset(
            "Mixed",
            &PresetScope::new(IdSet::new(), courses, IdSet::new()),
            &create_test_admin(),
        )
        .unwrap();

    let stored: PresetRecord = persistence
        .get_preset(change.preset.unwrap().preset_id)
        .unwrap();
    assert_eq!(stored.scope.courses.to_stored(), Some(String::from("3,7,12")));
    assert_eq!(stored.scope.categories.to_stored(), None);
}

#[test]
fn test_update_preset_with_rename_queues_rename_then_update() {
    let mut persistence: Persistence = create_test_persistence();
    let science: i64 = create_category(&mut persistence, "Science");
    let preset_id: i64 = persistence
        .create_preset("Year 9", &scope(&[science], &[], &[]), &create_test_admin())
        .unwrap()
        .preset
        .unwrap()
        .preset_id;

    let change: PresetChange = persistence
        .update_preset(
            preset_id,
            "Year 10",
            &scope(&[science], &[], &[]),
            &create_test_admin(),
        )
        .unwrap();

    let kinds: Vec<String> = change
        .task_ids
        .iter()
        .map(|id| persistence.get_task(*id).unwrap().kind)
        .collect();
    assert_eq!(kinds, vec!["rename_item", "update_preset_data"]);
    assert!(change.event.is_rename());
}

#[test]
fn test_update_unknown_preset_is_not_found() {
    let mut persistence: Persistence = create_test_persistence();

    let result: Result<PresetChange, PersistenceError> = persistence.update_preset(
        42,
        "Ghost",
        &scope(&[1], &[], &[]),
        &create_test_admin(),
    );

    assert_eq!(result.unwrap_err(), PersistenceError::PresetNotFound(42));
}

#[test]
fn test_delete_unknown_preset_is_not_found() {
    let mut persistence: Persistence = create_test_persistence();

    let result: Result<PresetChange, PersistenceError> =
        persistence.delete_preset(42, &create_test_admin());

    assert_eq!(result.unwrap_err(), PersistenceError::PresetNotFound(42));
}

#[test]
fn test_preset_lifecycle_keeps_enrolments_in_sync() {
    let mut persistence: Persistence = create_test_persistence();
    let science: i64 = create_category(&mut persistence, "Science");
    let chem: i64 = create_course(&mut persistence, "Chemistry", science);
    let arts: i64 = create_category(&mut persistence, "Arts");
    let drama: i64 = create_course(&mut persistence, "Drama", arts);
    let lab: i64 = create_tag(&mut persistence, "Lab");
    tag_course(&mut persistence, drama, lab);
    drain(&mut persistence);

    let preset_id: i64 = persistence
        .create_preset("Year 9", &scope(&[science], &[], &[]), &create_test_admin())
        .unwrap()
        .preset
        .unwrap()
        .preset_id;
    drain(&mut persistence);

    let preset: ItemRef = ItemRef::preset(preset_id);
    assert!(enrolled_items(&mut persistence, chem).contains(&preset));
    assert!(!enrolled_items(&mut persistence, drama).contains(&preset));

    // Swap the category for the tag: Chemistry leaves, Drama joins.
    persistence
        .update_preset(
            preset_id,
            "Year 9",
            &scope(&[], &[], &[lab]),
            &create_test_admin(),
        )
        .unwrap();
    drain(&mut persistence);

    assert!(!enrolled_items(&mut persistence, chem).contains(&preset));
    assert!(enrolled_items(&mut persistence, drama).contains(&preset));

    persistence
        .delete_preset(preset_id, &create_test_admin())
        .unwrap();
    drain(&mut persistence);

    assert!(group_of(&mut persistence, preset).is_none());
    assert!(!enrolled_items(&mut persistence, drama).contains(&preset));
    assert!(
        !persistence
            .allowed_values(ProfileField::Preset)
            .unwrap()
            .contains("Year 9")
    );
}

#[test]
fn test_preset_rename_rewrites_group_and_profile_value() {
    let mut persistence: Persistence = create_test_persistence();
    let science: i64 = create_category(&mut persistence, "Science");
    let preset_id: i64 = persistence
        .create_preset("Year 9", &scope(&[science], &[], &[]), &create_test_admin())
        .unwrap()
        .preset
        .unwrap()
        .preset_id;
    drain(&mut persistence);

    persistence
        .update_preset(
            preset_id,
            "Year Nine",
            &scope(&[science], &[], &[]),
            &create_test_admin(),
        )
        .unwrap();
    drain(&mut persistence);

    let group = group_of(&mut persistence, ItemRef::preset(preset_id)).unwrap();
    assert_eq!(group.name, "Year Nine");
    let values: BTreeSet<String> = persistence
        .allowed_values(ProfileField::Preset)
        .unwrap()
        .values()
        .iter()
        .cloned()
        .collect();
    assert_eq!(values, BTreeSet::from([String::from("Year Nine")]));
}
