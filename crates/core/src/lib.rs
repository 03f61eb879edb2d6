// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

mod context;
mod dispatch;
mod engine;
mod error;
mod membership;
mod reconcile;
mod task;

pub mod groups;
pub mod profile_sync;
pub mod registry;
pub mod rule_sync;
pub mod setup;

#[cfg(test)]
mod tests;

pub use context::{ReconcileContext, STUDENT_ROLE};
pub use dispatch::{tasks_for_event, tasks_for_preset_event};
pub use engine::{
    ContentEngine, EnrolmentStore, GroupStore, ItemCatalog, PresetStore, ProfileStore, RuleStore,
};
pub use error::CoreError;
pub use membership::groups_for_user;
pub use reconcile::{
    Changes, add_item, bind_item, execute, move_course, remove_enrolment_method, remove_item,
    rename_item, run_task, update_preset,
};
pub use task::Task;
