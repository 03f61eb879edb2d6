// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use enrolsync::Task;
use tracing::{debug, warn};

use crate::backend::PersistenceBackend;
use crate::data_models::TaskStatus;
use crate::diesel_schema::tasks;
use crate::error::PersistenceError;

/// Appends a task to the queue.
///
/// # Errors
///
/// Returns an error if the payload cannot be encoded or the insert fails.
pub fn enqueue_task(
    conn: &mut SqliteConnection,
    task: &Task,
    now: &str,
) -> Result<i64, PersistenceError> {
    let payload_json: String = serde_json::to_string(task)?;
    diesel::insert_into(tasks::table)
        .values((
            tasks::kind.eq(task.kind()),
            tasks::payload_json.eq(payload_json),
            tasks::status.eq(TaskStatus::Pending.as_str()),
            tasks::attempts.eq(0),
            tasks::created_at.eq(now),
            tasks::updated_at.eq(now),
        ))
        .execute(conn)?;
    let task_id: i64 = conn.get_last_insert_rowid()?;
    debug!(task_id, kind = task.kind(), "Queued task");
    Ok(task_id)
}

/// # Errors
///
/// Returns `TaskNotFound` if no task has the id.
pub fn mark_done(conn: &mut SqliteConnection, task_id: i64, now: &str) -> Result<(), PersistenceError> {
    let affected: usize = diesel::update(tasks::table.filter(tasks::task_id.eq(task_id)))
        .set((
            tasks::status.eq(TaskStatus::Done.as_str()),
            tasks::attempts.eq(tasks::attempts + 1),
            tasks::last_error.eq(None::<String>),
            tasks::updated_at.eq(now),
        ))
        .execute(conn)?;
    if affected == 0 {
        return Err(PersistenceError::TaskNotFound(task_id));
    }
    Ok(())
}

/// Records a failed attempt. The task is parked as failed once it has
/// used `max_attempts` attempts; otherwise it stays pending.
///
/// Returns the status the task was left in.
///
/// # Errors
///
/// Returns `TaskNotFound` if no task has the id.
pub fn record_failure(
    conn: &mut SqliteConnection,
    task_id: i64,
    error: &str,
    max_attempts: i32,
    now: &str,
) -> Result<TaskStatus, PersistenceError> {
    let previous: i32 = tasks::table
        .filter(tasks::task_id.eq(task_id))
        .select(tasks::attempts)
        .first::<i32>(conn)
        .optional()?
        .ok_or(PersistenceError::TaskNotFound(task_id))?;
    let attempts: i32 = previous + 1;

    let status: TaskStatus = if attempts >= max_attempts {
        TaskStatus::Failed
    } else {
        TaskStatus::Pending
    };

    diesel::update(tasks::table.filter(tasks::task_id.eq(task_id)))
        .set((
            tasks::status.eq(status.as_str()),
            tasks::attempts.eq(attempts),
            tasks::last_error.eq(error),
            tasks::updated_at.eq(now),
        ))
        .execute(conn)?;

    warn!(task_id, attempts, status = status.as_str(), error, "Task attempt failed");
    Ok(status)
}

/// Puts a failed task back in the queue with a fresh attempt count.
///
/// # Errors
///
/// Returns `TaskNotFound` if no failed task has the id.
pub fn requeue_task(conn: &mut SqliteConnection, task_id: i64, now: &str) -> Result<(), PersistenceError> {
    let affected: usize = diesel::update(
        tasks::table
            .filter(tasks::task_id.eq(task_id))
            .filter(tasks::status.eq(TaskStatus::Failed.as_str())),
    )
    .set((
        tasks::status.eq(TaskStatus::Pending.as_str()),
        tasks::attempts.eq(0),
        tasks::updated_at.eq(now),
    ))
    .execute(conn)?;
    if affected == 0 {
        return Err(PersistenceError::TaskNotFound(task_id));
    }
    debug!(task_id, "Requeued failed task");
    Ok(())
}
