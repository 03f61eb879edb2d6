// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for enrolsync.
//!
//! This crate stores everything enrolsync reads and writes in one `SQLite`
//! database through Diesel:
//!
//! - the content engine: catalog, groups, rules, enrolment methods and
//!   profile fields
//! - presets with their audit columns
//! - the durable task queue
//!
//! ## Transactions
//!
//! Every state-changing call on [`Persistence`] runs in a single
//! transaction. Catalog mutations and preset saves enqueue their tasks in
//! the same transaction as the change itself, so an event is never lost and
//! never queued for a change that rolled back. Tasks are executed later by
//! [`Persistence::run_pending`], each in its own transaction.
//!
//! ## Testing
//!
//! [`Persistence::new_in_memory`] gives each caller a private shared-cache
//! in-memory database, so tests never see each other's data.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::{Connection, SqliteConnection};
use enrolsync::setup::SetupPlan;
use enrolsync::{Changes, ReconcileContext, Task};
use enrolsync_domain::{
    AllowedValues, DomainError, EnrolmentMethod, GroupBinding, MembershipRule, PresetScope,
    ProfileField, UserSelection,
};
use enrolsync_events::{Actor, PresetEvent};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use time::OffsetDateTime;

mod backend;
mod catalog;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod presets;
mod queries;
mod runner;
mod store;

#[cfg(test)]
mod tests;

pub use data_models::{
    CatalogChange, CatalogMutation, CategoryData, CourseData, PresetChange, PresetRecord,
    RunReport, TagData, TaskRecord, TaskStatus,
};
pub use error::PersistenceError;
pub use store::SqliteStore;

use backend::PersistenceBackend;
use mutations::format_timestamp;

/// Atomic counter for generating unique in-memory database names.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistence adapter over a single `SQLite` connection.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a persistence adapter over a fresh in-memory database.
    ///
    /// Each call receives a unique database name from an atomic counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_test_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        conn.verify_foreign_key_enforcement()?;

        Ok(Self { conn })
    }

    /// Creates a persistence adapter over a file-backed database in WAL mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        conn.verify_foreign_key_enforcement()?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        self.conn.verify_foreign_key_enforcement()
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    /// Applies a catalog change and queues the tasks its event dispatches to.
    ///
    /// # Errors
    ///
    /// Returns an error if the change is invalid, targets a missing record,
    /// or conflicts with existing data. Nothing is written in that case.
    pub fn apply_catalog_mutation(
        &mut self,
        mutation: &CatalogMutation,
    ) -> Result<CatalogChange, PersistenceError> {
        self.conn.transaction(|conn| catalog::apply(conn, mutation))
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_categories(&mut self) -> Result<Vec<CategoryData>, PersistenceError> {
        queries::catalog::list_categories(&mut self.conn)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_courses(&mut self) -> Result<Vec<CourseData>, PersistenceError> {
        queries::catalog::list_courses(&mut self.conn)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_tags(&mut self) -> Result<Vec<TagData>, PersistenceError> {
        queries::catalog::list_tags(&mut self.conn)
    }

    // ========================================================================
    // Presets
    // ========================================================================

    /// Saves a new preset and queues its add-item task.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the name is empty or no entity is selected.
    pub fn create_preset(
        &mut self,
        name: &str,
        scope: &PresetScope,
        actor: &Actor,
    ) -> Result<PresetChange, PersistenceError> {
        self.conn
            .transaction(|conn| presets::create(conn, name, scope, actor))
    }

    /// Overwrites a preset and queues the rename and data-update tasks.
    ///
    /// # Errors
    ///
    /// Returns `PresetNotFound` for an unknown id and `InvalidInput` if the
    /// new values fail validation.
    pub fn update_preset(
        &mut self,
        preset_id: i64,
        name: &str,
        scope: &PresetScope,
        actor: &Actor,
    ) -> Result<PresetChange, PersistenceError> {
        self.conn
            .transaction(|conn| presets::update(conn, preset_id, name, scope, actor))
    }

    /// Deletes a preset and queues its remove-item task.
    ///
    /// # Errors
    ///
    /// Returns `PresetNotFound` for an unknown id.
    pub fn delete_preset(
        &mut self,
        preset_id: i64,
        actor: &Actor,
    ) -> Result<PresetChange, PersistenceError> {
        self.conn
            .transaction(|conn| presets::delete(conn, preset_id, actor))
    }

    /// # Errors
    ///
    /// Returns `PresetNotFound` for an unknown id.
    pub fn get_preset(&mut self, preset_id: i64) -> Result<PresetRecord, PersistenceError> {
        queries::presets::get_preset(&mut self.conn, preset_id)?
            .ok_or(PersistenceError::PresetNotFound(preset_id))
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_presets(&mut self) -> Result<Vec<PresetRecord>, PersistenceError> {
        queries::presets::list_presets(&mut self.conn)
    }

    // ========================================================================
    // Task queue
    // ========================================================================

    /// Appends a task to the queue.
    ///
    /// # Errors
    ///
    /// Returns an error if the task cannot be stored.
    pub fn enqueue_task(&mut self, task: &Task) -> Result<i64, PersistenceError> {
        let now: String = format_timestamp(OffsetDateTime::now_utc())?;
        mutations::tasks::enqueue_task(&mut self.conn, task, &now)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_tasks(
        &mut self,
        status: Option<TaskStatus>,
    ) -> Result<Vec<TaskRecord>, PersistenceError> {
        queries::tasks::list_tasks(&mut self.conn, status)
    }

    /// # Errors
    ///
    /// Returns `TaskNotFound` for an unknown id.
    pub fn get_task(&mut self, task_id: i64) -> Result<TaskRecord, PersistenceError> {
        queries::tasks::get_task(&mut self.conn, task_id)
    }

    /// Puts a parked task back at its original queue position.
    ///
    /// # Errors
    ///
    /// Returns `TaskNotFound` unless the task exists and is failed.
    pub fn retry_task(&mut self, task_id: i64) -> Result<TaskRecord, PersistenceError> {
        let now: String = format_timestamp(OffsetDateTime::now_utc())?;
        mutations::tasks::requeue_task(&mut self.conn, task_id, &now)?;
        queries::tasks::get_task(&mut self.conn, task_id)
    }

    /// Runs up to `limit` pending tasks in queue order.
    ///
    /// # Errors
    ///
    /// Returns an error if the queue cannot be read or updated. Task
    /// failures are recorded on the task and reported, not returned.
    pub fn run_pending(
        &mut self,
        limit: usize,
        max_attempts: i32,
    ) -> Result<RunReport, PersistenceError> {
        runner::run_pending(&mut self.conn, limit, max_attempts)
    }

    // ========================================================================
    // Content engine views
    // ========================================================================

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_groups(&mut self) -> Result<Vec<GroupBinding>, PersistenceError> {
        queries::groups::list_groups(&mut self.conn)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_rules(&mut self) -> Result<Vec<MembershipRule>, PersistenceError> {
        queries::rules::list_rules(&mut self.conn)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn enrolments_for_course(
        &mut self,
        course_id: i64,
    ) -> Result<Vec<EnrolmentMethod>, PersistenceError> {
        queries::enrolments::enrolments_for_course(&mut self.conn, course_id)
    }

    /// # Errors
    ///
    /// Returns an error if the field is missing or the query fails.
    pub fn allowed_values(&mut self, field: ProfileField) -> Result<AllowedValues, PersistenceError> {
        queries::profile::allowed_values(&mut self.conn, field)
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Stores a user's choice for a multi-value field.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the field is not a multi-value field or a
    /// value is not among the field's allowed values.
    pub fn set_user_selection(
        &mut self,
        user_id: i64,
        field: ProfileField,
        values: Vec<String>,
    ) -> Result<(), PersistenceError> {
        if field == ProfileField::EnrolledUntil {
            return Err(DomainError::InvalidProfileField(field.to_string()).into());
        }
        self.conn.transaction(|conn| {
            let allowed: AllowedValues = queries::profile::allowed_values(conn, field)?;
            if let Some(value) = values.iter().find(|v| !allowed.contains(v)) {
                return Err(DomainError::ValueNotAllowed {
                    field: field.to_string(),
                    value: value.clone(),
                }
                .into());
            }
            mutations::profile::set_selection(
                conn,
                user_id,
                field,
                &UserSelection::from_values(values),
            )
        })
    }

    /// Stores or clears a user's enrolled-until date.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn set_enrolled_until(
        &mut self,
        user_id: i64,
        until: Option<OffsetDateTime>,
    ) -> Result<(), PersistenceError> {
        mutations::profile::set_user_date(
            &mut self.conn,
            user_id,
            ProfileField::EnrolledUntil,
            until.map(OffsetDateTime::unix_timestamp),
        )
    }

    /// Groups whose enabled rule matches the user's profile at `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the rules or profile cannot be read.
    pub fn groups_for_user(
        &mut self,
        user_id: i64,
        now: OffsetDateTime,
    ) -> Result<Vec<GroupBinding>, PersistenceError> {
        let mut store: SqliteStore<'_> = SqliteStore::new(&mut self.conn);
        Ok(enrolsync::groups_for_user(&mut store, user_id, now)?)
    }

    // ========================================================================
    // Set-up sync
    // ========================================================================

    /// Lists what the set-up sync would add, without writing anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog or presets cannot be read.
    pub fn setup_plan(&mut self) -> Result<SetupPlan, PersistenceError> {
        let mut store: SqliteStore<'_> = SqliteStore::new(&mut self.conn);
        Ok(enrolsync::setup::plan(&mut store)?)
    }

    /// Runs the set-up sync for all existing content in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if any item fails. Nothing is written in that case.
    pub fn run_setup(&mut self) -> Result<(SetupPlan, Changes), PersistenceError> {
        self.conn.transaction(|conn| {
            let mut store: SqliteStore<'_> = SqliteStore::new(conn);
            let ctx: ReconcileContext = ReconcileContext::resolve(&mut store)?;
            let plan: SetupPlan = enrolsync::setup::plan(&mut store)?;
            let changes: Changes = enrolsync::setup::apply(&mut store, &ctx, &plan)?;
            Ok((plan, changes))
        })
    }
}

/// Queues the tasks for a preset event on the caller's transaction.
fn enqueue_preset_tasks(
    conn: &mut SqliteConnection,
    event: &PresetEvent,
) -> Result<Vec<i64>, PersistenceError> {
    let tasks: Vec<Task> = {
        let mut store: SqliteStore<'_> = SqliteStore::new(conn);
        enrolsync::tasks_for_preset_event(&mut store, event)?
    };
    enqueue_all(conn, &tasks)
}

fn enqueue_all(
    conn: &mut SqliteConnection,
    tasks: &[Task],
) -> Result<Vec<i64>, PersistenceError> {
    let now: String = format_timestamp(OffsetDateTime::now_utc())?;
    tasks
        .iter()
        .map(|task| mutations::tasks::enqueue_task(conn, task, &now))
        .collect()
}
