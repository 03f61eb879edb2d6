// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Durable task runner.
//!
//! Tasks run strictly in queue order. Each one executes inside a single
//! transaction that also marks it done, so a failure leaves no partial
//! writes behind. The failed attempt is then recorded in its own write.

use diesel::{Connection, SqliteConnection};
use enrolsync::{Changes, Task};
use time::OffsetDateTime;
use tracing::{error, info};

use crate::data_models::{RunReport, TaskStatus};
use crate::error::PersistenceError;
use crate::mutations::{self, format_timestamp};
use crate::queries;
use crate::store::SqliteStore;

fn execute_in_transaction(
    conn: &mut SqliteConnection,
    task_id: i64,
    task: &Task,
) -> Result<Changes, PersistenceError> {
    conn.transaction(|conn| {
        let mut store: SqliteStore<'_> = SqliteStore::new(conn);
        let changes: Changes = enrolsync::run_task(&mut store, task)?;
        let now: String = format_timestamp(OffsetDateTime::now_utc())?;
        mutations::tasks::mark_done(conn, task_id, &now)?;
        Ok(changes)
    })
}

/// Runs up to `limit` pending tasks.
///
/// A task that fails but still has attempts left stays pending and stops
/// the drain, so later tasks never overtake it. A task that exhausts
/// `max_attempts` is parked as failed and the drain continues.
///
/// # Errors
///
/// Returns an error if the queue itself cannot be read or written.
pub fn run_pending(
    conn: &mut SqliteConnection,
    limit: usize,
    max_attempts: i32,
) -> Result<RunReport, PersistenceError> {
    let mut report: RunReport = RunReport::default();

    while report.completed + report.parked < limit {
        let Some((task_id, payload_json)) = queries::tasks::next_pending(conn)? else {
            break;
        };

        // Undecodable payloads are parked immediately.
        let (outcome, attempts_allowed): (Result<Changes, PersistenceError>, i32) =
            match serde_json::from_str::<Task>(&payload_json) {
                Ok(task) => (execute_in_transaction(conn, task_id, &task), max_attempts),
                Err(err) => (Err(err.into()), 0),
            };

        match outcome {
            Ok(changes) => {
                report.completed += 1;
                report.changes.merge(changes);
            }
            Err(err) => {
                error!(task_id, error = %err, "Task failed");
                let now: String = format_timestamp(OffsetDateTime::now_utc())?;
                let status: TaskStatus = mutations::tasks::record_failure(
                    conn,
                    task_id,
                    &err.to_string(),
                    attempts_allowed,
                    &now,
                )?;
                if status == TaskStatus::Failed {
                    report.parked += 1;
                } else {
                    report.retried += 1;
                    break;
                }
            }
        }
    }

    if report.completed + report.retried + report.parked > 0 {
        info!(
            completed = report.completed,
            retried = report.retried,
            parked = report.parked,
            added = report.changes.enrolments_added,
            removed = report.changes.enrolments_removed,
            "Task run finished"
        );
    }
    Ok(report)
}
