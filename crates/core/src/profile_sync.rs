// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Profile Attribute Synchronizer.
//!
//! Keeps each item type's multi-value profile field equal to the names of
//! the live items of that type.

use crate::engine::ProfileStore;
use crate::error::CoreError;
use enrolsync_domain::{AllowedValues, ItemType, ProfileField};
use tracing::{debug, info};

/// # Errors
///
/// Returns an error if the profile store fails.
pub fn add_value<E: ProfileStore>(
    engine: &mut E,
    item_type: ItemType,
    name: &str,
) -> Result<(), CoreError> {
    let field: ProfileField = item_type.profile_field();
    let mut allowed: AllowedValues = engine.allowed_values(field)?;
    if !allowed.add(name) {
        debug!(%field, name, "Profile value already present");
        return Ok(());
    }
    engine.set_allowed_values(field, &allowed)?;
    info!(%field, name, "Added profile value");
    Ok(())
}

/// # Errors
///
/// Returns an error if the profile store fails.
pub fn remove_value<E: ProfileStore>(
    engine: &mut E,
    item_type: ItemType,
    name: &str,
) -> Result<(), CoreError> {
    let field: ProfileField = item_type.profile_field();
    let mut allowed: AllowedValues = engine.allowed_values(field)?;
    if !allowed.remove(name) {
        debug!(%field, name, "Profile value already absent");
        return Ok(());
    }
    engine.set_allowed_values(field, &allowed)?;
    info!(%field, name, "Removed profile value");
    Ok(())
}

/// Renames a value in the allowed list and in every user's stored selection.
///
/// User selections are rewritten in place so the other values a user chose
/// keep their positions. Returns the number of users rewritten.
///
/// # Errors
///
/// Returns an error if the profile store fails.
pub fn rename_value<E: ProfileStore>(
    engine: &mut E,
    item_type: ItemType,
    old_name: &str,
    new_name: &str,
) -> Result<usize, CoreError> {
    let field: ProfileField = item_type.profile_field();

    let mut allowed: AllowedValues = engine.allowed_values(field)?;
    if allowed.rename(old_name, new_name) {
        engine.set_allowed_values(field, &allowed)?;
    }

    let mut rewritten: usize = 0;
    for (user_id, mut selection) in engine.selections_containing(field, old_name)? {
        if !selection.rename(old_name, new_name) {
            continue;
        }
        engine.set_selection(user_id, field, &selection)?;
        rewritten += 1;
    }

    info!(%field, old = old_name, new = new_name, users = rewritten, "Renamed profile value");
    Ok(rewritten)
}
