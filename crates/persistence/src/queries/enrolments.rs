// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use enrolsync_domain::EnrolmentMethod;

use crate::diesel_schema::{enrolment_methods, roles};
use crate::error::PersistenceError;

fn to_method((group_id, course_id, role_id): (i64, i64, i64)) -> EnrolmentMethod {
    EnrolmentMethod {
        group_id,
        course_id,
        role_id,
    }
}

/// # Errors
///
/// Returns an error if the query fails.
pub fn enrolment_exists(
    conn: &mut SqliteConnection,
    method: EnrolmentMethod,
) -> Result<bool, PersistenceError> {
    let count: i64 = enrolment_methods::table
        .filter(enrolment_methods::group_id.eq(method.group_id))
        .filter(enrolment_methods::course_id.eq(method.course_id))
        .filter(enrolment_methods::role_id.eq(method.role_id))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

/// # Errors
///
/// Returns an error if the query fails.
pub fn enrolments_for_group(
    conn: &mut SqliteConnection,
    group_id: i64,
) -> Result<Vec<EnrolmentMethod>, PersistenceError> {
    let rows: Vec<(i64, i64, i64)> = enrolment_methods::table
        .filter(enrolment_methods::group_id.eq(group_id))
        .select((
            enrolment_methods::group_id,
            enrolment_methods::course_id,
            enrolment_methods::role_id,
        ))
        .order(enrolment_methods::course_id.asc())
        .load(conn)?;
    Ok(rows.into_iter().map(to_method).collect())
}

/// # Errors
///
/// Returns an error if the query fails.
pub fn enrolments_for_course(
    conn: &mut SqliteConnection,
    course_id: i64,
) -> Result<Vec<EnrolmentMethod>, PersistenceError> {
    let rows: Vec<(i64, i64, i64)> = enrolment_methods::table
        .filter(enrolment_methods::course_id.eq(course_id))
        .select((
            enrolment_methods::group_id,
            enrolment_methods::course_id,
            enrolment_methods::role_id,
        ))
        .order(enrolment_methods::group_id.asc())
        .load(conn)?;
    Ok(rows.into_iter().map(to_method).collect())
}

/// # Errors
///
/// Returns an error if the query fails.
pub fn count_enrolments(conn: &mut SqliteConnection) -> Result<i64, PersistenceError> {
    Ok(enrolment_methods::table.count().get_result(conn)?)
}

/// # Errors
///
/// Returns an error if the query fails.
pub fn find_role(
    conn: &mut SqliteConnection,
    shortname: &str,
) -> Result<Option<i64>, PersistenceError> {
    Ok(roles::table
        .filter(roles::shortname.eq(shortname))
        .select(roles::role_id)
        .first(conn)
        .optional()?)
}
