// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Item Registry: which courses an item currently denotes.

use crate::engine::{ItemCatalog, PresetStore};
use crate::error::CoreError;
use enrolsync_domain::{Item, ItemRef, ItemType, PresetScope};
use std::collections::BTreeSet;

/// Courses currently denoted by an item.
///
/// An unknown preset denotes no courses.
///
/// # Errors
///
/// Returns an error if the catalog or preset store fails.
pub fn courses_of<E: ItemCatalog + PresetStore>(
    engine: &mut E,
    item: ItemRef,
) -> Result<BTreeSet<i64>, CoreError> {
    match item.item_type {
        ItemType::Tag => engine.courses_with_tag(item.item_id),
        ItemType::Category => engine.courses_in_category(item.item_id),
        ItemType::Course => Ok(BTreeSet::from([item.item_id])),
        ItemType::Preset => match engine.get_preset(item.item_id)? {
            Some(preset) => resolve(engine, &preset.scope),
            None => Ok(BTreeSet::new()),
        },
    }
}

/// Resolved course set of a preset scope: courses in its categories, its
/// courses, and courses carrying its tags.
///
/// # Errors
///
/// Returns an error if the catalog fails.
pub fn resolve<E: ItemCatalog>(
    engine: &mut E,
    scope: &PresetScope,
) -> Result<BTreeSet<i64>, CoreError> {
    let mut courses: BTreeSet<i64> = scope.courses.iter().collect();
    for category_id in scope.categories.iter() {
        courses.extend(engine.courses_in_category(category_id)?);
    }
    for tag_id in scope.tags.iter() {
        courses.extend(engine.courses_with_tag(tag_id)?);
    }
    Ok(courses)
}

/// Lists every live item of a type. Presets come from the preset store.
///
/// # Errors
///
/// Returns an error if the catalog or preset store fails.
pub fn all_items_of<E: ItemCatalog + PresetStore>(
    engine: &mut E,
    item_type: ItemType,
) -> Result<Vec<Item>, CoreError> {
    if item_type != ItemType::Preset {
        return engine.list_items(item_type);
    }

    Ok(engine
        .list_presets()?
        .into_iter()
        .filter_map(|preset| {
            preset
                .preset_id
                .map(|id| Item::new(ItemRef::preset(id), preset.name))
        })
        .collect())
}
