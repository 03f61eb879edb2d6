// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use enrolsync_domain::{GroupBinding, ItemRef};
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::diesel_schema::item_groups;
use crate::error::PersistenceError;

/// Inserts a group stamped with the item's type and id.
///
/// # Errors
///
/// Returns `Conflict` if the item already has a group.
pub fn create_group(
    conn: &mut SqliteConnection,
    item: ItemRef,
    name: &str,
    description: &str,
) -> Result<GroupBinding, PersistenceError> {
    let result: Result<usize, diesel::result::Error> = diesel::insert_into(item_groups::table)
        .values((
            item_groups::name.eq(name),
            item_groups::description.eq(description),
            item_groups::item_type.eq(item.item_type.as_str()),
            item_groups::item_id.eq(item.item_id),
        ))
        .execute(conn);

    match result {
        Ok(_) => {}
        Err(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        )) => {
            return Err(PersistenceError::Conflict(format!(
                "A group is already bound to {item}"
            )));
        }
        Err(e) => return Err(e.into()),
    }

    let group_id: i64 = conn.get_last_insert_rowid()?;
    info!(group_id, item = %item, name, "Created group");
    Ok(GroupBinding {
        group_id,
        item,
        name: name.to_string(),
    })
}

/// # Errors
///
/// Returns `NotFound` if the group does not exist.
pub fn rename_group(
    conn: &mut SqliteConnection,
    group_id: i64,
    name: &str,
) -> Result<(), PersistenceError> {
    let affected: usize =
        diesel::update(item_groups::table.filter(item_groups::group_id.eq(group_id)))
            .set(item_groups::name.eq(name))
            .execute(conn)?;
    if affected == 0 {
        return Err(PersistenceError::NotFound(format!("Group {group_id}")));
    }
    Ok(())
}

/// Deletes a group. Its rules and enrolment methods cascade.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_group(conn: &mut SqliteConnection, group_id: i64) -> Result<(), PersistenceError> {
    diesel::delete(item_groups::table.filter(item_groups::group_id.eq(group_id))).execute(conn)?;
    info!(group_id, "Deleted group");
    Ok(())
}
