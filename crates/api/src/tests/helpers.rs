// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use enrolsync_domain::ItemRef;
use enrolsync_persistence::{CatalogMutation, Persistence};

use crate::{
    AuthenticatedActor, CatalogEventResponse, PresetRequest, Role, RunTasksRequest,
    RunTasksResponse, apply_catalog_event, run_tasks,
};

pub const MAX_ATTEMPTS: i32 = 3;

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("in-memory database")
}

pub fn create_test_admin() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("admin-123"), Role::Admin)
}

pub fn create_test_viewer() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("viewer-456"), Role::Viewer)
}

pub fn catalog(persistence: &mut Persistence, mutation: CatalogMutation) -> CatalogEventResponse {
    apply_catalog_event(persistence, &mutation, &create_test_admin()).unwrap()
}

fn created_id(response: &CatalogEventResponse) -> i64 {
    let item: ItemRef = response.item.expect("mutation creates an item");
    item.item_id
}

pub fn create_category(persistence: &mut Persistence, name: &str) -> i64 {
    let response: CatalogEventResponse = catalog(
        persistence,
        CatalogMutation::CreateCategory {
            name: name.to_string(),
        },
    );
    created_id(&response)
}

pub fn create_course(persistence: &mut Persistence, fullname: &str, category_id: i64) -> i64 {
    let response: CatalogEventResponse = catalog(
        persistence,
        CatalogMutation::CreateCourse {
            fullname: fullname.to_string(),
            category_id,
        },
    );
    created_id(&response)
}

pub fn create_tag(persistence: &mut Persistence, name: &str) -> i64 {
    let response: CatalogEventResponse = catalog(
        persistence,
        CatalogMutation::CreateTag {
            name: name.to_string(),
        },
    );
    created_id(&response)
}

pub fn preset_request(name: &str, categories: &[i64], courses: &[i64], tags: &[i64]) -> PresetRequest {
    PresetRequest {
        name: name.to_string(),
        categories: categories.to_vec(),
        courses: courses.to_vec(),
        tags: tags.to_vec(),
    }
}

/// Drains the queue as an admin and asserts nothing failed.
pub fn drain(persistence: &mut Persistence) -> RunTasksResponse {
    let response: RunTasksResponse = run_tasks(
        persistence,
        RunTasksRequest { limit: 1000 },
        MAX_ATTEMPTS,
        &create_test_admin(),
    )
    .unwrap();
    assert_eq!(response.retried, 0, "unexpected task failure: {response:?}");
    assert_eq!(response.parked, 0, "unexpected parked task: {response:?}");
    response
}
