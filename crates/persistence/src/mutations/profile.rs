// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use enrolsync_domain::{AllowedValues, ProfileField, UserSelection};
use tracing::debug;

use crate::diesel_schema::{profile_fields, user_profile_data};
use crate::error::PersistenceError;
use crate::queries::profile::field_id;

/// Stores a field's allowed values. An empty list is stored as `NULL`.
///
/// # Errors
///
/// Returns an error if the field is missing or the update fails.
pub fn set_allowed_values(
    conn: &mut SqliteConnection,
    field: ProfileField,
    values: &AllowedValues,
) -> Result<(), PersistenceError> {
    let encoded: Option<String> = if values.values().is_empty() {
        None
    } else {
        Some(values.encode())
    };
    let affected: usize = diesel::update(
        profile_fields::table.filter(profile_fields::shortname.eq(field.shortname())),
    )
    .set(profile_fields::allowed_values.eq(encoded))
    .execute(conn)?;
    if affected == 0 {
        return Err(PersistenceError::NotFound(format!("Profile field '{field}'")));
    }
    debug!(field = %field, count = values.values().len(), "Stored allowed values");
    Ok(())
}

fn upsert_data(
    conn: &mut SqliteConnection,
    user_id: i64,
    field_id: i64,
    data: &str,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(
        user_profile_data::table
            .filter(user_profile_data::user_id.eq(user_id))
            .filter(user_profile_data::field_id.eq(field_id)),
    )
    .set(user_profile_data::data.eq(data))
    .execute(conn)?;
    if updated == 0 {
        diesel::insert_into(user_profile_data::table)
            .values((
                user_profile_data::user_id.eq(user_id),
                user_profile_data::field_id.eq(field_id),
                user_profile_data::data.eq(data),
            ))
            .execute(conn)?;
    }
    Ok(())
}

fn clear_data(
    conn: &mut SqliteConnection,
    user_id: i64,
    field_id: i64,
) -> Result<(), PersistenceError> {
    diesel::delete(
        user_profile_data::table
            .filter(user_profile_data::user_id.eq(user_id))
            .filter(user_profile_data::field_id.eq(field_id)),
    )
    .execute(conn)?;
    Ok(())
}

/// Stores a user's selection. An empty selection removes the row.
///
/// # Errors
///
/// Returns an error if the field is missing or the write fails.
pub fn set_selection(
    conn: &mut SqliteConnection,
    user_id: i64,
    field: ProfileField,
    selection: &UserSelection,
) -> Result<(), PersistenceError> {
    let field_id: i64 = field_id(conn, field)?;
    if selection.values().is_empty() {
        return clear_data(conn, user_id, field_id);
    }
    upsert_data(conn, user_id, field_id, &selection.encode())
}

/// Stores a date field as a unix timestamp. `None` removes the row.
///
/// # Errors
///
/// Returns an error if the field is missing or the write fails.
pub fn set_user_date(
    conn: &mut SqliteConnection,
    user_id: i64,
    field: ProfileField,
    timestamp: Option<i64>,
) -> Result<(), PersistenceError> {
    let field_id: i64 = field_id(conn, field)?;
    match timestamp {
        Some(ts) => upsert_data(conn, user_id, field_id, &ts.to_string()),
        None => clear_data(conn, user_id, field_id),
    }
}
