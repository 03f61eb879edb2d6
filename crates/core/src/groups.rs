// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Group-Binding Store.

use crate::engine::GroupStore;
use crate::error::CoreError;
use enrolsync_domain::{GroupBinding, ItemRef};
use tracing::{debug, info};

/// Returns the group bound to the item, creating it on first sight.
///
/// # Errors
///
/// Returns an error if the group store fails.
pub fn get_or_create<E: GroupStore>(
    engine: &mut E,
    item: ItemRef,
    name: &str,
) -> Result<GroupBinding, CoreError> {
    if let Some(group) = engine.find_group(item)? {
        debug!(%item, group_id = group.group_id, "Group binding exists");
        return Ok(group);
    }

    let group: GroupBinding =
        engine.create_group(item, name, item.item_type.group_description())?;
    info!(%item, group_id = group.group_id, name, "Created group binding");
    Ok(group)
}

/// Pure lookup. `None` means the item was never bound.
///
/// # Errors
///
/// Returns an error if the group store fails.
pub fn find_by_item<E: GroupStore>(
    engine: &mut E,
    item: ItemRef,
) -> Result<Option<GroupBinding>, CoreError> {
    engine.find_group(item)
}

/// # Errors
///
/// Returns an error if the group store fails.
pub fn rename<E: GroupStore>(
    engine: &mut E,
    group: &GroupBinding,
    new_name: &str,
) -> Result<(), CoreError> {
    engine.rename_group(group.group_id, new_name)?;
    info!(group_id = group.group_id, old = %group.name, new = new_name, "Renamed group");
    Ok(())
}

/// # Errors
///
/// Returns an error if the group store fails.
pub fn delete<E: GroupStore>(engine: &mut E, group: &GroupBinding) -> Result<(), CoreError> {
    engine.delete_group(group.group_id)?;
    info!(group_id = group.group_id, item = %group.item, "Deleted group");
    Ok(())
}
