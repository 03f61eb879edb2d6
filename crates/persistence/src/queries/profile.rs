// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use enrolsync_domain::{AllowedValues, ProfileField, UserProfile, UserSelection};
use std::str::FromStr;
use tracing::warn;

use crate::diesel_schema::{profile_fields, user_profile_data};
use crate::error::PersistenceError;

/// Resolves a managed field's row id.
///
/// # Errors
///
/// Returns `NotFound` if the field is not installed.
pub fn field_id(conn: &mut SqliteConnection, field: ProfileField) -> Result<i64, PersistenceError> {
    profile_fields::table
        .filter(profile_fields::shortname.eq(field.shortname()))
        .select(profile_fields::field_id)
        .first(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::NotFound(format!("Profile field '{field}'")))
}

/// # Errors
///
/// Returns an error if the field is missing or the query fails.
pub fn allowed_values(
    conn: &mut SqliteConnection,
    field: ProfileField,
) -> Result<AllowedValues, PersistenceError> {
    let raw: Option<Option<String>> = profile_fields::table
        .filter(profile_fields::shortname.eq(field.shortname()))
        .select(profile_fields::allowed_values)
        .first(conn)
        .optional()?;
    let raw: Option<String> =
        raw.ok_or_else(|| PersistenceError::NotFound(format!("Profile field '{field}'")))?;
    Ok(AllowedValues::parse(raw.as_deref()))
}

/// Users whose stored data for `field` contains `value` as a substring.
///
/// This is a coarse filter; callers must match tokens exactly.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn selections_containing(
    conn: &mut SqliteConnection,
    field: ProfileField,
    value: &str,
) -> Result<Vec<(i64, UserSelection)>, PersistenceError> {
    let field_id: i64 = field_id(conn, field)?;
    let rows: Vec<(i64, String)> = user_profile_data::table
        .filter(user_profile_data::field_id.eq(field_id))
        .filter(user_profile_data::data.like(format!("%{}%", escape_like(value))).escape('\\'))
        .select((user_profile_data::user_id, user_profile_data::data))
        .order(user_profile_data::user_id.asc())
        .load(conn)?;
    Ok(rows
        .into_iter()
        .map(|(user_id, data)| (user_id, UserSelection::parse(&data)))
        .collect())
}

fn escape_like(value: &str) -> String {
    let mut escaped: String = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Loads every managed field a user has data for.
///
/// Date fields hold unix timestamps; unparsable dates are treated as unset.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn user_profile(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<UserProfile, PersistenceError> {
    let rows: Vec<(String, String, String)> = user_profile_data::table
        .inner_join(profile_fields::table)
        .filter(user_profile_data::user_id.eq(user_id))
        .select((
            profile_fields::shortname,
            profile_fields::datatype,
            user_profile_data::data,
        ))
        .load(conn)?;

    let mut profile: UserProfile = UserProfile::new(user_id);
    for (shortname, datatype, data) in rows {
        let Ok(field) = ProfileField::from_str(&shortname) else {
            continue;
        };
        if datatype == "date" {
            match data.parse::<i64>() {
                Ok(ts) => {
                    profile.dates.insert(field, ts);
                }
                Err(_) => warn!(user_id, field = %field, data, "Ignoring unparsable date"),
            }
        } else {
            profile.selections.insert(field, UserSelection::parse(&data));
        }
    }
    Ok(profile)
}
