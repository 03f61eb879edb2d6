// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::diesel_schema::{categories, course_tags, courses, tags};
use crate::error::PersistenceError;

fn ensure_affected(affected: usize, what: &str, id: i64) -> Result<(), PersistenceError> {
    if affected == 0 {
        return Err(PersistenceError::NotFound(format!("{what} {id}")));
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_category(conn: &mut SqliteConnection, name: &str) -> Result<i64, PersistenceError> {
    diesel::insert_into(categories::table)
        .values(categories::name.eq(name))
        .execute(conn)?;
    let category_id: i64 = conn.get_last_insert_rowid()?;
    info!(category_id, name, "Created category");
    Ok(category_id)
}

/// # Errors
///
/// Returns `NotFound` if the category does not exist.
pub fn rename_category(
    conn: &mut SqliteConnection,
    category_id: i64,
    name: &str,
) -> Result<(), PersistenceError> {
    let affected: usize = diesel::update(categories::table.filter(categories::category_id.eq(category_id)))
        .set(categories::name.eq(name))
        .execute(conn)?;
    ensure_affected(affected, "Category", category_id)
}

/// # Errors
///
/// Returns `NotFound` if the category does not exist.
pub fn delete_category(conn: &mut SqliteConnection, category_id: i64) -> Result<(), PersistenceError> {
    let affected: usize = diesel::delete(categories::table.filter(categories::category_id.eq(category_id)))
        .execute(conn)?;
    ensure_affected(affected, "Category", category_id)
}

/// # Errors
///
/// Returns an error if the category does not exist or the insert fails.
pub fn insert_course(
    conn: &mut SqliteConnection,
    fullname: &str,
    category_id: i64,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(courses::table)
        .values((
            courses::fullname.eq(fullname),
            courses::category_id.eq(category_id),
        ))
        .execute(conn)?;
    let course_id: i64 = conn.get_last_insert_rowid()?;
    info!(course_id, category_id, fullname, "Created course");
    Ok(course_id)
}

/// # Errors
///
/// Returns `NotFound` if the course does not exist.
pub fn rename_course(
    conn: &mut SqliteConnection,
    course_id: i64,
    fullname: &str,
) -> Result<(), PersistenceError> {
    let affected: usize = diesel::update(courses::table.filter(courses::course_id.eq(course_id)))
        .set(courses::fullname.eq(fullname))
        .execute(conn)?;
    ensure_affected(affected, "Course", course_id)
}

/// # Errors
///
/// Returns `NotFound` if the course does not exist.
pub fn move_course(
    conn: &mut SqliteConnection,
    course_id: i64,
    category_id: i64,
) -> Result<(), PersistenceError> {
    let affected: usize = diesel::update(courses::table.filter(courses::course_id.eq(course_id)))
        .set(courses::category_id.eq(category_id))
        .execute(conn)?;
    ensure_affected(affected, "Course", course_id)?;
    debug!(course_id, category_id, "Moved course");
    Ok(())
}

/// Deletes a course. Its tag links and enrolment methods cascade.
///
/// # Errors
///
/// Returns `NotFound` if the course does not exist.
pub fn delete_course(conn: &mut SqliteConnection, course_id: i64) -> Result<(), PersistenceError> {
    let affected: usize = diesel::delete(courses::table.filter(courses::course_id.eq(course_id)))
        .execute(conn)?;
    ensure_affected(affected, "Course", course_id)
}

/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_tag(conn: &mut SqliteConnection, name: &str) -> Result<i64, PersistenceError> {
    diesel::insert_into(tags::table)
        .values(tags::name.eq(name))
        .execute(conn)?;
    let tag_id: i64 = conn.get_last_insert_rowid()?;
    info!(tag_id, name, "Created tag");
    Ok(tag_id)
}

/// # Errors
///
/// Returns `NotFound` if the tag does not exist.
pub fn rename_tag(conn: &mut SqliteConnection, tag_id: i64, name: &str) -> Result<(), PersistenceError> {
    let affected: usize = diesel::update(tags::table.filter(tags::tag_id.eq(tag_id)))
        .set(tags::name.eq(name))
        .execute(conn)?;
    ensure_affected(affected, "Tag", tag_id)
}

/// # Errors
///
/// Returns `NotFound` if the tag does not exist.
pub fn delete_tag(conn: &mut SqliteConnection, tag_id: i64) -> Result<(), PersistenceError> {
    let affected: usize =
        diesel::delete(tags::table.filter(tags::tag_id.eq(tag_id))).execute(conn)?;
    ensure_affected(affected, "Tag", tag_id)
}

/// Links a tag to a course. Returns whether a new link was made.
///
/// # Errors
///
/// Returns an error if the course or tag does not exist.
pub fn tag_course(
    conn: &mut SqliteConnection,
    course_id: i64,
    tag_id: i64,
) -> Result<bool, PersistenceError> {
    let inserted: usize = diesel::insert_or_ignore_into(course_tags::table)
        .values((
            course_tags::course_id.eq(course_id),
            course_tags::tag_id.eq(tag_id),
        ))
        .execute(conn)?;
    Ok(inserted > 0)
}

/// Unlinks a tag from a course. Returns whether a link was removed.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn untag_course(
    conn: &mut SqliteConnection,
    course_id: i64,
    tag_id: i64,
) -> Result<bool, PersistenceError> {
    let removed: usize = diesel::delete(
        course_tags::table
            .filter(course_tags::course_id.eq(course_id))
            .filter(course_tags::tag_id.eq(tag_id)),
    )
    .execute(conn)?;
    Ok(removed > 0)
}
