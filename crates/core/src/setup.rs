// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Initial set-up sync for content that existed before enrolsync.

use crate::context::ReconcileContext;
use crate::engine::ContentEngine;
use crate::error::CoreError;
use crate::reconcile::{self, Changes};
use crate::registry;
use enrolsync_domain::{Item, ItemType};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::info;

/// One item the set-up sync would add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetupEntry {
    pub item: Item,
    pub course_ids: BTreeSet<i64>,
}

/// Everything the set-up sync would add, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SetupPlan {
    pub entries: Vec<SetupEntry>,
}

impl SetupPlan {
    #[must_use]
    pub fn count(&self, item_type: ItemType) -> usize {
        self.entries
            .iter()
            .filter(|e| e.item.item.item_type == item_type)
            .count()
    }
}

/// Enumerates tags, categories, courses and presets with their course sets.
///
/// # Errors
///
/// Returns an error if the catalog or preset store fails.
pub fn plan<E: ContentEngine>(engine: &mut E) -> Result<SetupPlan, CoreError> {
    let mut entries: Vec<SetupEntry> = Vec::new();
    for item_type in ItemType::ALL {
        for item in registry::all_items_of(engine, item_type)? {
            let course_ids: BTreeSet<i64> = registry::courses_of(engine, item.item)?;
            entries.push(SetupEntry { item, course_ids });
        }
    }
    Ok(SetupPlan { entries })
}

/// Runs add-item for every planned entry.
///
/// # Errors
///
/// Returns an error on the first failing item.
pub fn apply<E: ContentEngine>(
    engine: &mut E,
    ctx: &ReconcileContext,
    plan: &SetupPlan,
) -> Result<Changes, CoreError> {
    let mut changes: Changes = Changes::default();
    for entry in &plan.entries {
        changes.merge(reconcile::add_item(
            engine,
            ctx,
            &entry.item,
            &entry.course_ids,
        )?);
    }
    info!(
        items = plan.entries.len(),
        added = changes.enrolments_added,
        "Set-up sync complete"
    );
    Ok(changes)
}
