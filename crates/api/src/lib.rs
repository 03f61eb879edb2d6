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
#![allow(clippy::multiple_crate_versions)]

//! Administrative API boundary for enrolsync.
//!
//! Handlers take an [`AuthenticatedActor`], enforce the role check for
//! state-changing calls, and translate lower-layer errors into [`ApiError`].

mod auth;
mod error;
mod handlers;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthorizationService, Role, authenticate_stub};
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error,
    translate_persistence_error,
};
pub use handlers::{
    apply_catalog_event, create_preset, delete_preset, get_preset, groups_for_user,
    list_categories, list_courses, list_presets, list_tags, list_tasks, retry_task, run_setup,
    run_tasks, set_user_profile, setup_plan, update_preset,
};
pub use request_response::{
    CatalogEventResponse, CategoryInfo, CourseInfo, GroupInfo, ListCategoriesResponse,
    ListCoursesResponse, ListPresetsResponse, ListTagsResponse, ListTasksResponse, PresetInfo,
    PresetRequest, PresetWriteResponse, RunSetupResponse, RunTasksRequest, RunTasksResponse,
    SetUserProfileRequest, SetupEntryInfo, SetupPlanResponse, TagInfo, TaskInfo,
    UserGroupsResponse,
};
