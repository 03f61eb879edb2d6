// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use enrolsync_domain::{Item, ItemRef, ItemType};
use std::collections::BTreeSet;
use tracing::debug;

use crate::data_models::{CategoryData, CourseData, TagData};
use crate::diesel_schema::{categories, course_tags, courses, tags};
use crate::error::PersistenceError;

/// # Errors
///
/// Returns an error if the query fails.
pub fn list_categories(conn: &mut SqliteConnection) -> Result<Vec<CategoryData>, PersistenceError> {
    let rows: Vec<(i64, String)> = categories::table
        .select((categories::category_id, categories::name))
        .order(categories::category_id.asc())
        .load(conn)?;
    Ok(rows
        .into_iter()
        .map(|(category_id, name)| CategoryData { category_id, name })
        .collect())
}

/// Courses with their tag ids.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_courses(conn: &mut SqliteConnection) -> Result<Vec<CourseData>, PersistenceError> {
    let rows: Vec<(i64, String, i64)> = courses::table
        .select((courses::course_id, courses::fullname, courses::category_id))
        .order(courses::course_id.asc())
        .load(conn)?;
    let links: Vec<(i64, i64)> = course_tags::table
        .select((course_tags::course_id, course_tags::tag_id))
        .order((course_tags::course_id.asc(), course_tags::tag_id.asc()))
        .load(conn)?;

    Ok(rows
        .into_iter()
        .map(|(course_id, fullname, category_id)| CourseData {
            course_id,
            fullname,
            category_id,
            tag_ids: links
                .iter()
                .filter(|(course, _)| *course == course_id)
                .map(|(_, tag)| *tag)
                .collect(),
        })
        .collect())
}

/// # Errors
///
/// Returns an error if the query fails.
pub fn list_tags(conn: &mut SqliteConnection) -> Result<Vec<TagData>, PersistenceError> {
    let rows: Vec<(i64, String)> = tags::table
        .select((tags::tag_id, tags::name))
        .order(tags::tag_id.asc())
        .load(conn)?;
    Ok(rows
        .into_iter()
        .map(|(tag_id, name)| TagData { tag_id, name })
        .collect())
}

/// Live catalog items of one type. Presets are not catalog items.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_items(
    conn: &mut SqliteConnection,
    item_type: ItemType,
) -> Result<Vec<Item>, PersistenceError> {
    let items: Vec<Item> = match item_type {
        ItemType::Tag => list_tags(conn)?
            .into_iter()
            .map(|t| Item::new(ItemRef::tag(t.tag_id), t.name))
            .collect(),
        ItemType::Category => list_categories(conn)?
            .into_iter()
            .map(|c| Item::new(ItemRef::category(c.category_id), c.name))
            .collect(),
        ItemType::Course => {
            let rows: Vec<(i64, String)> = courses::table
                .select((courses::course_id, courses::fullname))
                .order(courses::course_id.asc())
                .load(conn)?;
            rows.into_iter()
                .map(|(id, name)| Item::new(ItemRef::course(id), name))
                .collect()
        }
        ItemType::Preset => Vec::new(),
    };
    Ok(items)
}

/// # Errors
///
/// Returns an error if the query fails.
pub fn courses_in_category(
    conn: &mut SqliteConnection,
    category_id: i64,
) -> Result<BTreeSet<i64>, PersistenceError> {
    let ids: Vec<i64> = courses::table
        .filter(courses::category_id.eq(category_id))
        .select(courses::course_id)
        .load(conn)?;
    debug!(category_id, count = ids.len(), "Loaded courses in category");
    Ok(ids.into_iter().collect())
}

/// # Errors
///
/// Returns an error if the query fails.
pub fn courses_with_tag(
    conn: &mut SqliteConnection,
    tag_id: i64,
) -> Result<BTreeSet<i64>, PersistenceError> {
    let ids: Vec<i64> = course_tags::table
        .filter(course_tags::tag_id.eq(tag_id))
        .select(course_tags::course_id)
        .load(conn)?;
    Ok(ids.into_iter().collect())
}

/// # Errors
///
/// Returns an error if the query fails.
pub fn course_tags(
    conn: &mut SqliteConnection,
    course_id: i64,
) -> Result<BTreeSet<i64>, PersistenceError> {
    let ids: Vec<i64> = course_tags::table
        .filter(course_tags::course_id.eq(course_id))
        .select(course_tags::tag_id)
        .load(conn)?;
    Ok(ids.into_iter().collect())
}

/// # Errors
///
/// Returns an error if the query fails.
pub fn get_course(
    conn: &mut SqliteConnection,
    course_id: i64,
) -> Result<Option<(String, i64)>, PersistenceError> {
    Ok(courses::table
        .filter(courses::course_id.eq(course_id))
        .select((courses::fullname, courses::category_id))
        .first(conn)
        .optional()?)
}

/// # Errors
///
/// Returns an error if the query fails.
pub fn get_category_name(
    conn: &mut SqliteConnection,
    category_id: i64,
) -> Result<Option<String>, PersistenceError> {
    Ok(categories::table
        .filter(categories::category_id.eq(category_id))
        .select(categories::name)
        .first(conn)
        .optional()?)
}

/// # Errors
///
/// Returns an error if the query fails.
pub fn get_tag_name(
    conn: &mut SqliteConnection,
    tag_id: i64,
) -> Result<Option<String>, PersistenceError> {
    Ok(tags::table
        .filter(tags::tag_id.eq(tag_id))
        .select(tags::name)
        .first(conn)
        .optional()?)
}

/// # Errors
///
/// Returns an error if the query fails.
pub fn count_courses_in_category(
    conn: &mut SqliteConnection,
    category_id: i64,
) -> Result<i64, PersistenceError> {
    Ok(courses::table
        .filter(courses::category_id.eq(category_id))
        .count()
        .get_result(conn)?)
}

/// # Errors
///
/// Returns an error if the query fails.
pub fn is_course_tagged(
    conn: &mut SqliteConnection,
    course_id: i64,
    tag_id: i64,
) -> Result<bool, PersistenceError> {
    let count: i64 = course_tags::table
        .filter(course_tags::course_id.eq(course_id))
        .filter(course_tags::tag_id.eq(tag_id))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}
