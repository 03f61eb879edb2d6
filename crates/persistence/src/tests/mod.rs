// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod initialization_tests;
mod preset_tests;

use enrolsync_domain::{EnrolmentMethod, GroupBinding, IdSet, ItemRef};
use enrolsync_events::Actor;
use std::collections::BTreeSet;

use crate::{CatalogChange, CatalogMutation, Persistence, RunReport};

pub const MAX_ATTEMPTS: i32 = 3;

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("in-memory database")
}

pub fn create_test_admin() -> Actor {
    Actor::new(String::from("admin-1"), String::from("admin"))
}

pub fn ids(values: &[i64]) -> IdSet {
    values.iter().copied().collect()
}

pub fn apply(persistence: &mut Persistence, mutation: CatalogMutation) -> CatalogChange {
    persistence
        .apply_catalog_mutation(&mutation)
        .expect("catalog mutation")
}

pub fn create_category(persistence: &mut Persistence, name: &str) -> i64 {
    let change: CatalogChange = apply(
        persistence,
        CatalogMutation::CreateCategory {
            name: name.to_string(),
        },
    );
    change.item.unwrap().item_id
}

pub fn create_course(persistence: &mut Persistence, fullname: &str, category_id: i64) -> i64 {
    let change: CatalogChange = apply(
        persistence,
        CatalogMutation::CreateCourse {
            fullname: fullname.to_string(),
            category_id,
        },
    );
    change.item.unwrap().item_id
}

pub fn create_tag(persistence: &mut Persistence, name: &str) -> i64 {
    let change: CatalogChange = apply(
        persistence,
        CatalogMutation::CreateTag {
            name: name.to_string(),
        },
    );
    change.item.unwrap().item_id
}

pub fn tag_course(persistence: &mut Persistence, course_id: i64, tag_id: i64) {
    apply(persistence, CatalogMutation::TagCourse { course_id, tag_id });
}

/// Runs every queued task and asserts none of them failed.
pub fn drain(persistence: &mut Persistence) -> RunReport {
    let report: RunReport = persistence.run_pending(1000, MAX_ATTEMPTS).unwrap();
    assert_eq!(report.retried, 0, "unexpected task failure: {report:?}");
    assert_eq!(report.parked, 0, "unexpected parked task: {report:?}");
    report
}

pub fn group_of(persistence: &mut Persistence, item: ItemRef) -> Option<GroupBinding> {
    persistence
        .list_groups()
        .unwrap()
        .into_iter()
        .find(|g| g.item == item)
}

/// Items whose groups hold an enrolment method on the course.
pub fn enrolled_items(persistence: &mut Persistence, course_id: i64) -> BTreeSet<ItemRef> {
    let groups: Vec<GroupBinding> = persistence.list_groups().unwrap();
    let methods: Vec<EnrolmentMethod> = persistence.enrolments_for_course(course_id).unwrap();
    methods
        .iter()
        .filter_map(|m| groups.iter().find(|g| g.group_id == m.group_id))
        .map(|g| g.item)
        .collect()
}
