// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Preset administration.
//!
//! Every save or delete emits a [`PresetEvent`] and queues the tasks it
//! dispatches to on the caller's transaction.

use diesel::SqliteConnection;
use enrolsync_domain::{Preset, PresetScope, validate_preset};
use enrolsync_events::{Actor, PresetEvent};
use time::OffsetDateTime;

use crate::data_models::{PresetChange, PresetRecord};
use crate::error::PersistenceError;
use crate::mutations::format_timestamp;
use crate::{enqueue_preset_tasks, mutations, queries};

fn existing(conn: &mut SqliteConnection, preset_id: i64) -> Result<PresetRecord, PersistenceError> {
    queries::presets::get_preset(conn, preset_id)?.ok_or(PersistenceError::PresetNotFound(preset_id))
}

pub(crate) fn create(
    conn: &mut SqliteConnection,
    name: &str,
    scope: &PresetScope,
    actor: &Actor,
) -> Result<PresetChange, PersistenceError> {
    validate_preset(&Preset::new(name, scope.clone()))?;
    let now: String = format_timestamp(OffsetDateTime::now_utc())?;

    let preset_id: i64 = mutations::presets::insert_preset(conn, name, scope, &actor.id, &now)?;
    let event: PresetEvent = PresetEvent::created(preset_id, name, scope.clone(), actor.clone());
    let task_ids: Vec<i64> = enqueue_preset_tasks(conn, &event)?;

    Ok(PresetChange {
        preset: Some(existing(conn, preset_id)?),
        event,
        task_ids,
    })
}

pub(crate) fn update(
    conn: &mut SqliteConnection,
    preset_id: i64,
    name: &str,
    scope: &PresetScope,
    actor: &Actor,
) -> Result<PresetChange, PersistenceError> {
    let before: PresetRecord = existing(conn, preset_id)?;
    validate_preset(&Preset::with_id(preset_id, name, scope.clone()))?;
    let now: String = format_timestamp(OffsetDateTime::now_utc())?;

    mutations::presets::update_preset(conn, preset_id, name, scope, &actor.id, &now)?;
    let event: PresetEvent = PresetEvent::updated(
        preset_id,
        &before.name,
        name,
        before.scope,
        scope.clone(),
        actor.clone(),
    );
    let task_ids: Vec<i64> = enqueue_preset_tasks(conn, &event)?;

    Ok(PresetChange {
        preset: Some(existing(conn, preset_id)?),
        event,
        task_ids,
    })
}

pub(crate) fn delete(
    conn: &mut SqliteConnection,
    preset_id: i64,
    actor: &Actor,
) -> Result<PresetChange, PersistenceError> {
    let before: PresetRecord = existing(conn, preset_id)?;

    mutations::presets::delete_preset(conn, preset_id)?;
    let event: PresetEvent =
        PresetEvent::deleted(preset_id, &before.name, before.scope, actor.clone());
    let task_ids: Vec<i64> = enqueue_preset_tasks(conn, &event)?;

    Ok(PresetChange {
        preset: None,
        event,
        task_ids,
    })
}
