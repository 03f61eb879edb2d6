// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Catalog mutations of the embedded content engine.
//!
//! Each mutation writes the catalog, derives the inbound event it raises
//! and queues that event's tasks. The caller supplies the transaction.

use diesel::SqliteConnection;
use enrolsync::Task;
use enrolsync_domain::{Item, ItemRef, validate_item_id, validate_item_name};
use enrolsync_events::InboundEvent;
use tracing::{debug, info};

use crate::data_models::{CatalogChange, CatalogMutation};
use crate::error::PersistenceError;
use crate::store::SqliteStore;
use crate::{enqueue_all, mutations, queries};

fn category_name(conn: &mut SqliteConnection, category_id: i64) -> Result<String, PersistenceError> {
    queries::catalog::get_category_name(conn, category_id)?
        .ok_or_else(|| PersistenceError::NotFound(format!("Category {category_id}")))
}

fn course(conn: &mut SqliteConnection, course_id: i64) -> Result<(String, i64), PersistenceError> {
    queries::catalog::get_course(conn, course_id)?
        .ok_or_else(|| PersistenceError::NotFound(format!("Course {course_id}")))
}

fn tag_name(conn: &mut SqliteConnection, tag_id: i64) -> Result<String, PersistenceError> {
    queries::catalog::get_tag_name(conn, tag_id)?
        .ok_or_else(|| PersistenceError::NotFound(format!("Tag {tag_id}")))
}

/// Writes the change and returns the item it targets plus its event.
///
/// `None` as the event means the mutation changed nothing.
fn write(
    conn: &mut SqliteConnection,
    mutation: &CatalogMutation,
) -> Result<(Option<ItemRef>, Option<InboundEvent>), PersistenceError> {
    match mutation {
        CatalogMutation::CreateCategory { name } => {
            validate_item_name(name)?;
            let category_id: i64 = mutations::catalog::insert_category(conn, name)?;
            let item: Item = Item::new(ItemRef::category(category_id), name.as_str());
            Ok((Some(item.item), Some(InboundEvent::ItemCreated { item })))
        }
        CatalogMutation::RenameCategory { category_id, name } => {
            validate_item_name(name)?;
            let item: ItemRef = ItemRef::category(*category_id);
            if category_name(conn, *category_id)? == *name {
                return Ok((Some(item), None));
            }
            mutations::catalog::rename_category(conn, *category_id, name)?;
            Ok((
                Some(item),
                Some(InboundEvent::ItemRenamed {
                    item,
                    new_name: name.clone(),
                }),
            ))
        }
        CatalogMutation::DeleteCategory { category_id } => {
            let name: String = category_name(conn, *category_id)?;
            let remaining: i64 = queries::catalog::count_courses_in_category(conn, *category_id)?;
            if remaining > 0 {
                return Err(PersistenceError::Conflict(format!(
                    "Category {category_id} still holds {remaining} course(s)"
                )));
            }
            mutations::catalog::delete_category(conn, *category_id)?;
            let item: Item = Item::new(ItemRef::category(*category_id), name);
            Ok((Some(item.item), Some(InboundEvent::ItemDeleted { item })))
        }
        CatalogMutation::CreateCourse {
            fullname,
            category_id,
        } => {
            validate_item_name(fullname)?;
            validate_item_id(*category_id)?;
            let category: String = category_name(conn, *category_id)?;
            let course_id: i64 = mutations::catalog::insert_course(conn, fullname, *category_id)?;
            let course: Item = Item::new(ItemRef::course(course_id), fullname.as_str());
            Ok((
                Some(course.item),
                Some(InboundEvent::CourseCreated {
                    course,
                    category: Item::new(ItemRef::category(*category_id), category),
                }),
            ))
        }
        CatalogMutation::RenameCourse {
            course_id,
            fullname,
        } => {
            validate_item_name(fullname)?;
            let item: ItemRef = ItemRef::course(*course_id);
            let (current, _): (String, i64) = course(conn, *course_id)?;
            if current == *fullname {
                return Ok((Some(item), None));
            }
            mutations::catalog::rename_course(conn, *course_id, fullname)?;
            Ok((
                Some(item),
                Some(InboundEvent::ItemRenamed {
                    item,
                    new_name: fullname.clone(),
                }),
            ))
        }
        CatalogMutation::MoveCourse {
            course_id,
            category_id,
        } => {
            let item: ItemRef = ItemRef::course(*course_id);
            let (_, old_category_id): (String, i64) = course(conn, *course_id)?;
            category_name(conn, *category_id)?;
            if old_category_id == *category_id {
                return Ok((Some(item), None));
            }
            mutations::catalog::move_course(conn, *course_id, *category_id)?;
            Ok((
                Some(item),
                Some(InboundEvent::CourseCategoryChanged {
                    course_id: *course_id,
                    old_category_id,
                    new_category_id: *category_id,
                }),
            ))
        }
        CatalogMutation::DeleteCourse { course_id } => {
            let (fullname, _): (String, i64) = course(conn, *course_id)?;
            mutations::catalog::delete_course(conn, *course_id)?;
            let item: Item = Item::new(ItemRef::course(*course_id), fullname);
            Ok((Some(item.item), Some(InboundEvent::ItemDeleted { item })))
        }
        CatalogMutation::CreateTag { name } => {
            validate_item_name(name)?;
            let tag_id: i64 = mutations::catalog::insert_tag(conn, name)?;
            let item: Item = Item::new(ItemRef::tag(tag_id), name.as_str());
            Ok((Some(item.item), Some(InboundEvent::ItemCreated { item })))
        }
        CatalogMutation::RenameTag { tag_id, name } => {
            validate_item_name(name)?;
            let item: ItemRef = ItemRef::tag(*tag_id);
            if tag_name(conn, *tag_id)? == *name {
                return Ok((Some(item), None));
            }
            mutations::catalog::rename_tag(conn, *tag_id, name)?;
            Ok((
                Some(item),
                Some(InboundEvent::ItemRenamed {
                    item,
                    new_name: name.clone(),
                }),
            ))
        }
        CatalogMutation::DeleteTag { tag_id } => {
            let name: String = tag_name(conn, *tag_id)?;
            mutations::catalog::delete_tag(conn, *tag_id)?;
            let item: Item = Item::new(ItemRef::tag(*tag_id), name);
            Ok((Some(item.item), Some(InboundEvent::ItemDeleted { item })))
        }
        CatalogMutation::TagCourse { course_id, tag_id } => {
            course(conn, *course_id)?;
            let name: String = tag_name(conn, *tag_id)?;
            let item: ItemRef = ItemRef::tag(*tag_id);
            if !mutations::catalog::tag_course(conn, *course_id, *tag_id)? {
                return Ok((Some(item), None));
            }
            Ok((
                Some(item),
                Some(InboundEvent::CourseTagAdded {
                    course_id: *course_id,
                    tag: Item::new(item, name),
                }),
            ))
        }
        CatalogMutation::UntagCourse { course_id, tag_id } => {
            let item: ItemRef = ItemRef::tag(*tag_id);
            if !mutations::catalog::untag_course(conn, *course_id, *tag_id)? {
                return Ok((Some(item), None));
            }
            Ok((
                Some(item),
                Some(InboundEvent::CourseTagRemoved {
                    course_id: *course_id,
                    tag_id: *tag_id,
                }),
            ))
        }
    }
}

/// Applies one catalog mutation on the caller's transaction.
pub(crate) fn apply(
    conn: &mut SqliteConnection,
    mutation: &CatalogMutation,
) -> Result<CatalogChange, PersistenceError> {
    let (item, event): (Option<ItemRef>, Option<InboundEvent>) = write(conn, mutation)?;

    let Some(event) = event else {
        debug!(?mutation, "Catalog mutation changed nothing");
        return Ok(CatalogChange {
            item,
            event: None,
            task_ids: Vec::new(),
        });
    };

    let tasks: Vec<Task> = {
        let mut store: SqliteStore<'_> = SqliteStore::new(conn);
        enrolsync::tasks_for_event(&mut store, &event)?
    };
    let task_ids: Vec<i64> = enqueue_all(conn, &tasks)?;
    info!(event = event.name(), tasks = task_ids.len(), "Catalog event queued");

    Ok(CatalogChange {
        item,
        event: Some(event),
        task_ids,
    })
}
