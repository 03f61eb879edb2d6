// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use enrolsync::Task;

use crate::data_models::{TaskRecord, TaskStatus};
use crate::diesel_schema::tasks;
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = tasks)]
struct TaskRow {
    task_id: i64,
    kind: String,
    payload_json: String,
    status: String,
    attempts: i32,
    last_error: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<TaskRow> for TaskRecord {
    type Error = PersistenceError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let payload: Task = serde_json::from_str(&row.payload_json)?;
        Ok(Self {
            task_id: row.task_id,
            kind: row.kind,
            payload,
            status: TaskStatus::parse(&row.status)?,
            attempts: row.attempts,
            last_error: row.last_error,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// The oldest pending task as `(task_id, payload_json)`.
///
/// The payload is returned undecoded so the runner can park a task whose
/// payload no longer parses instead of stalling the queue.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn next_pending(
    conn: &mut SqliteConnection,
) -> Result<Option<(i64, String)>, PersistenceError> {
    Ok(tasks::table
        .filter(tasks::status.eq(TaskStatus::Pending.as_str()))
        .select((tasks::task_id, tasks::payload_json))
        .order(tasks::task_id.asc())
        .first(conn)
        .optional()?)
}

/// # Errors
///
/// Returns `TaskNotFound` if no task has the id.
pub fn get_task(conn: &mut SqliteConnection, task_id: i64) -> Result<TaskRecord, PersistenceError> {
    let row: Option<TaskRow> = tasks::table
        .filter(tasks::task_id.eq(task_id))
        .select(TaskRow::as_select())
        .first(conn)
        .optional()?;
    row.map_or(Err(PersistenceError::TaskNotFound(task_id)), TaskRecord::try_from)
}

/// Tasks in queue order, optionally filtered by status.
///
/// # Errors
///
/// Returns an error if the query fails or a payload cannot be decoded.
pub fn list_tasks(
    conn: &mut SqliteConnection,
    status: Option<TaskStatus>,
) -> Result<Vec<TaskRecord>, PersistenceError> {
    let mut query = tasks::table.select(TaskRow::as_select()).into_boxed();
    if let Some(status) = status {
        query = query.filter(tasks::status.eq(status.as_str()));
    }
    let rows: Vec<TaskRow> = query.order(tasks::task_id.asc()).load(conn)?;
    rows.into_iter().map(TaskRecord::try_from).collect()
}
