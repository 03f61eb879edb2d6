// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use enrolsync_domain::{IdSet, ItemRef, ItemType, Preset, PresetScope};

use crate::data_models::PresetRecord;
use crate::diesel_schema::presets;
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = presets)]
struct PresetRow {
    preset_id: i64,
    name: String,
    category: Option<String>,
    course: Option<String>,
    tag: Option<String>,
    user_modified: String,
    time_created: String,
    time_modified: String,
}

impl TryFrom<PresetRow> for PresetRecord {
    type Error = PersistenceError;

    fn try_from(row: PresetRow) -> Result<Self, Self::Error> {
        let scope: PresetScope = PresetScope::new(
            IdSet::parse(row.category.as_deref())?,
            IdSet::parse(row.course.as_deref())?,
            IdSet::parse(row.tag.as_deref())?,
        );
        Ok(Self {
            preset_id: row.preset_id,
            name: row.name,
            scope,
            user_modified: row.user_modified,
            time_created: row.time_created,
            time_modified: row.time_modified,
        })
    }
}

impl From<PresetRecord> for Preset {
    fn from(record: PresetRecord) -> Self {
        Self::with_id(record.preset_id, record.name, record.scope)
    }
}

/// # Errors
///
/// Returns an error if the query fails or a stored id list is malformed.
pub fn get_preset(
    conn: &mut SqliteConnection,
    preset_id: i64,
) -> Result<Option<PresetRecord>, PersistenceError> {
    let row: Option<PresetRow> = presets::table
        .filter(presets::preset_id.eq(preset_id))
        .select(PresetRow::as_select())
        .first(conn)
        .optional()?;
    row.map(PresetRecord::try_from).transpose()
}

/// # Errors
///
/// Returns an error if the query fails or a stored id list is malformed.
pub fn list_presets(conn: &mut SqliteConnection) -> Result<Vec<PresetRecord>, PersistenceError> {
    let rows: Vec<PresetRow> = presets::table
        .select(PresetRow::as_select())
        .order(presets::preset_id.asc())
        .load(conn)?;
    rows.into_iter().map(PresetRecord::try_from).collect()
}

/// Presets whose id set for the item's type contains the item.
///
/// Membership is decided on the parsed sets, never by substring.
///
/// # Errors
///
/// Returns an error if the query fails or a stored id list is malformed.
pub fn presets_referencing(
    conn: &mut SqliteConnection,
    item: ItemRef,
) -> Result<Vec<PresetRecord>, PersistenceError> {
    if item.item_type == ItemType::Preset {
        return Ok(Vec::new());
    }
    Ok(list_presets(conn)?
        .into_iter()
        .filter(|p| p.scope.references(item))
        .collect())
}
