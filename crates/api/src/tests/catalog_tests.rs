// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use enrolsync_domain::ItemRef;
use enrolsync_persistence::{CatalogMutation, Persistence};

use crate::tests::helpers::{
    catalog, create_category, create_course, create_tag, create_test_admin,
    create_test_persistence, drain,
};
use crate::{
    ApiError, CatalogEventResponse, ListCategoriesResponse, ListCoursesResponse,
    ListTagsResponse, apply_catalog_event, list_categories, list_courses, list_tags,
};

#[test]
fn test_create_course_reports_event_and_tasks() {
    let mut persistence: Persistence = create_test_persistence();
    let science: i64 = create_category(&mut persistence, "Science");

    let response: CatalogEventResponse = catalog(
        &mut persistence,
        CatalogMutation::CreateCourse {
            fullname: String::from("Chemistry"),
            category_id: science,
        },
    );

    assert!(matches!(response.item, Some(ItemRef { .. })));
    assert_eq!(response.event.as_deref(), Some("course_created"));
    assert_eq!(response.task_ids.len(), 2);
}

#[test]
fn test_no_op_mutation_raises_no_event() {
    let mut persistence: Persistence = create_test_persistence();
    let lab: i64 = create_tag(&mut persistence, "Lab");

    let response: CatalogEventResponse = catalog(
        &mut persistence,
        CatalogMutation::RenameTag {
            tag_id: lab,
            name: String::from("Lab"),
        },
    );

    assert_eq!(response.event, None);
    assert!(response.task_ids.is_empty());
}

#[test]
fn test_deleting_non_empty_category_is_a_rule_violation() {
    let mut persistence: Persistence = create_test_persistence();
    let science: i64 = create_category(&mut persistence, "Science");
    create_course(&mut persistence, "Chemistry", science);

    let result: Result<CatalogEventResponse, ApiError> = apply_catalog_event(
        &mut persistence,
        &CatalogMutation::DeleteCategory {
            category_id: science,
        },
        &create_test_admin(),
    );

    assert!(matches!(
        result,
        Err(ApiError::DomainRuleViolation { ref rule, .. }) if rule == "catalog_integrity"
    ));
}

#[test]
fn test_mutating_missing_record_is_not_found() {
    let mut persistence: Persistence = create_test_persistence();

    let result: Result<CatalogEventResponse, ApiError> = apply_catalog_event(
        &mut persistence,
        &CatalogMutation::RenameCourse {
            course_id: 99,
            fullname: String::from("Ghost"),
        },
        &create_test_admin(),
    );

    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}

#[test]
fn test_listings_reflect_catalog_and_enrolments() {
    let mut persistence: Persistence = create_test_persistence();
    let science: i64 = create_category(&mut persistence, "Science");
    let chem: i64 = create_course(&mut persistence, "Chemistry", science);
    let lab: i64 = create_tag(&mut persistence, "Lab");
    catalog(
        &mut persistence,
        CatalogMutation::TagCourse {
            course_id: chem,
            tag_id: lab,
        },
    );
    drain(&mut persistence);

    let categories: ListCategoriesResponse = list_categories(&mut persistence).unwrap();
    let tags: ListTagsResponse = list_tags(&mut persistence).unwrap();
    let courses: ListCoursesResponse = list_courses(&mut persistence).unwrap();

    assert_eq!(categories.categories.len(), 1);
    assert_eq!(categories.categories[0].name, "Science");
    assert_eq!(tags.tags[0].tag_id, lab);
    assert_eq!(courses.courses.len(), 1);
    assert_eq!(courses.courses[0].tag_ids, vec![lab]);
    // Tag, category and course groups.
    assert_eq!(courses.courses[0].group_ids.len(), 3);
}
