// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use enrolsync_domain::EnrolmentMethod;
use tracing::{debug, warn};

use crate::diesel_schema::{courses, enrolment_methods};
use crate::error::PersistenceError;

/// Adds an enrolment method. Returns whether a row was written.
///
/// A method for a course that no longer exists is skipped, since the
/// course's deletion already removed every method it had.
///
/// # Errors
///
/// Returns an error if the group or role does not exist or the insert fails.
pub fn add_enrolment(
    conn: &mut SqliteConnection,
    method: EnrolmentMethod,
) -> Result<bool, PersistenceError> {
    let course_count: i64 = courses::table
        .filter(courses::course_id.eq(method.course_id))
        .count()
        .get_result(conn)?;
    if course_count == 0 {
        warn!(
            course_id = method.course_id,
            group_id = method.group_id,
            "Skipping enrolment method for missing course"
        );
        return Ok(false);
    }

    let inserted: usize = diesel::insert_or_ignore_into(enrolment_methods::table)
        .values((
            enrolment_methods::group_id.eq(method.group_id),
            enrolment_methods::course_id.eq(method.course_id),
            enrolment_methods::role_id.eq(method.role_id),
        ))
        .execute(conn)?;
    debug!(
        group_id = method.group_id,
        course_id = method.course_id,
        inserted,
        "Added enrolment method"
    );
    Ok(inserted > 0)
}

/// # Errors
///
/// Returns an error if the delete fails.
pub fn remove_enrolment(
    conn: &mut SqliteConnection,
    method: EnrolmentMethod,
) -> Result<bool, PersistenceError> {
    let removed: usize = diesel::delete(
        enrolment_methods::table
            .filter(enrolment_methods::group_id.eq(method.group_id))
            .filter(enrolment_methods::course_id.eq(method.course_id))
            .filter(enrolment_methods::role_id.eq(method.role_id)),
    )
    .execute(conn)?;
    Ok(removed > 0)
}
