// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use enrolsync_domain::PresetScope;
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::diesel_schema::presets;
use crate::error::PersistenceError;

/// Inserts a preset. Audit columns start out equal.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_preset(
    conn: &mut SqliteConnection,
    name: &str,
    scope: &PresetScope,
    user_modified: &str,
    now: &str,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(presets::table)
        .values((
            presets::name.eq(name),
            presets::category.eq(scope.categories.to_stored()),
            presets::course.eq(scope.courses.to_stored()),
            presets::tag.eq(scope.tags.to_stored()),
            presets::user_modified.eq(user_modified),
            presets::time_created.eq(now),
            presets::time_modified.eq(now),
        ))
        .execute(conn)?;
    let preset_id: i64 = conn.get_last_insert_rowid()?;
    info!(preset_id, name, "Created preset");
    Ok(preset_id)
}

/// Overwrites a preset's name, id sets and modification audit columns.
///
/// # Errors
///
/// Returns `PresetNotFound` if the preset does not exist.
pub fn update_preset(
    conn: &mut SqliteConnection,
    preset_id: i64,
    name: &str,
    scope: &PresetScope,
    user_modified: &str,
    now: &str,
) -> Result<(), PersistenceError> {
    let affected: usize = diesel::update(presets::table.filter(presets::preset_id.eq(preset_id)))
        .set((
            presets::name.eq(name),
            presets::category.eq(scope.categories.to_stored()),
            presets::course.eq(scope.courses.to_stored()),
            presets::tag.eq(scope.tags.to_stored()),
            presets::user_modified.eq(user_modified),
            presets::time_modified.eq(now),
        ))
        .execute(conn)?;
    if affected == 0 {
        return Err(PersistenceError::PresetNotFound(preset_id));
    }
    info!(preset_id, name, "Updated preset");
    Ok(())
}

/// Overwrites only the id sets. Used when a referenced item disappears.
///
/// # Errors
///
/// Returns `PresetNotFound` if the preset does not exist.
pub fn update_preset_scope(
    conn: &mut SqliteConnection,
    preset_id: i64,
    scope: &PresetScope,
) -> Result<(), PersistenceError> {
    let affected: usize = diesel::update(presets::table.filter(presets::preset_id.eq(preset_id)))
        .set((
            presets::category.eq(scope.categories.to_stored()),
            presets::course.eq(scope.courses.to_stored()),
            presets::tag.eq(scope.tags.to_stored()),
        ))
        .execute(conn)?;
    if affected == 0 {
        return Err(PersistenceError::PresetNotFound(preset_id));
    }
    Ok(())
}

/// # Errors
///
/// Returns `PresetNotFound` if the preset does not exist.
pub fn delete_preset(conn: &mut SqliteConnection, preset_id: i64) -> Result<(), PersistenceError> {
    let affected: usize =
        diesel::delete(presets::table.filter(presets::preset_id.eq(preset_id))).execute(conn)?;
    if affected == 0 {
        return Err(PersistenceError::PresetNotFound(preset_id));
    }
    info!(preset_id, "Deleted preset");
    Ok(())
}
