// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use enrolsync_domain::{GroupBinding, ItemRef, ItemType};
use std::str::FromStr;

use crate::diesel_schema::item_groups;
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = item_groups)]
struct GroupRow {
    group_id: i64,
    name: String,
    item_type: String,
    item_id: i64,
}

impl TryFrom<GroupRow> for GroupBinding {
    type Error = PersistenceError;

    fn try_from(row: GroupRow) -> Result<Self, Self::Error> {
        let item_type: ItemType = ItemType::from_str(&row.item_type)?;
        Ok(Self {
            group_id: row.group_id,
            item: ItemRef::new(item_type, row.item_id),
            name: row.name,
        })
    }
}

/// Looks up the group bound to an item. The unique `(item_type, item_id)`
/// index guarantees at most one match.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn find_group(
    conn: &mut SqliteConnection,
    item: ItemRef,
) -> Result<Option<GroupBinding>, PersistenceError> {
    let row: Option<GroupRow> = item_groups::table
        .filter(item_groups::item_type.eq(item.item_type.as_str()))
        .filter(item_groups::item_id.eq(item.item_id))
        .select(GroupRow::as_select())
        .first(conn)
        .optional()?;
    row.map(GroupBinding::try_from).transpose()
}

/// # Errors
///
/// Returns an error if the query fails.
pub fn get_group(
    conn: &mut SqliteConnection,
    group_id: i64,
) -> Result<Option<GroupBinding>, PersistenceError> {
    let row: Option<GroupRow> = item_groups::table
        .filter(item_groups::group_id.eq(group_id))
        .select(GroupRow::as_select())
        .first(conn)
        .optional()?;
    row.map(GroupBinding::try_from).transpose()
}

/// # Errors
///
/// Returns an error if the query fails.
pub fn list_groups(conn: &mut SqliteConnection) -> Result<Vec<GroupBinding>, PersistenceError> {
    let rows: Vec<GroupRow> = item_groups::table
        .select(GroupRow::as_select())
        .order(item_groups::group_id.asc())
        .load(conn)?;
    rows.into_iter().map(GroupBinding::try_from).collect()
}
