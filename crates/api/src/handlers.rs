// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.
//!
//! Every state-changing handler checks authorization first, then hands the
//! request to the persistence facade, which writes the change and queues its
//! reconciliation tasks in one transaction.

use enrolsync::setup::SetupPlan;
use enrolsync::Changes;
use enrolsync_domain::{
    AllowedValues, DomainError, GroupBinding, IdSet, ItemType, PresetScope, ProfileField,
    parse_date,
};
use enrolsync_events::Actor;
use enrolsync_persistence::{
    CatalogChange, CatalogMutation, CategoryData, CourseData, Persistence, PresetChange,
    PresetRecord, RunReport, TagData, TaskRecord, TaskStatus,
};
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::{ApiError, translate_domain_error, translate_persistence_error};
use crate::request_response::{
    CatalogEventResponse, CategoryInfo, CourseInfo, GroupInfo, ListCategoriesResponse,
    ListCoursesResponse, ListPresetsResponse, ListTagsResponse, ListTasksResponse, PresetInfo,
    PresetRequest, PresetWriteResponse, RunSetupResponse, RunTasksRequest, RunTasksResponse,
    SetUserProfileRequest, SetupEntryInfo, SetupPlanResponse, TagInfo, TaskInfo,
    UserGroupsResponse,
};

// ============================================================================
// Presets
// ============================================================================

fn scope_from_request(request: &PresetRequest) -> PresetScope {
    PresetScope::new(
        request.categories.iter().copied().collect::<IdSet>(),
        request.courses.iter().copied().collect::<IdSet>(),
        request.tags.iter().copied().collect::<IdSet>(),
    )
}

fn preset_to_info(record: PresetRecord) -> PresetInfo {
    PresetInfo {
        preset_id: record.preset_id,
        name: record.name,
        categories: record.scope.categories.iter().collect(),
        courses: record.scope.courses.iter().collect(),
        tags: record.scope.tags.iter().collect(),
        user_modified: record.user_modified,
        time_created: record.time_created,
        time_modified: record.time_modified,
    }
}

fn preset_change_to_response(change: PresetChange, message: String) -> PresetWriteResponse {
    PresetWriteResponse {
        preset: change.preset.map(preset_to_info),
        event: change.event.kind.as_str().to_string(),
        task_ids: change.task_ids,
        message,
    }
}

/// Creates a preset and queues the add-item task for its group.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Admin
/// - The name is empty
/// - No category, course or tag is selected
pub fn create_preset(
    persistence: &mut Persistence,
    request: &PresetRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<PresetWriteResponse, ApiError> {
    AuthorizationService::authorize_admin(authenticated_actor, "create_preset")?;

    let actor: Actor = authenticated_actor.to_event_actor();
    let scope: PresetScope = scope_from_request(request);
    let change: PresetChange = persistence
        .create_preset(&request.name, &scope, &actor)
        .map_err(translate_persistence_error)?;

    let preset_id: i64 = change.event.preset_id;
    info!(
        actor_id = %authenticated_actor.id,
        preset_id,
        tasks = change.task_ids.len(),
        "Created preset"
    );
    Ok(preset_change_to_response(
        change,
        format!("Created preset '{}'", request.name),
    ))
}

/// Overwrites a preset's name and id sets.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the preset does not exist,
/// or the new values fail validation.
pub fn update_preset(
    persistence: &mut Persistence,
    preset_id: i64,
    request: &PresetRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<PresetWriteResponse, ApiError> {
    AuthorizationService::authorize_admin(authenticated_actor, "update_preset")?;

    let actor: Actor = authenticated_actor.to_event_actor();
    let scope: PresetScope = scope_from_request(request);
    let change: PresetChange = persistence
        .update_preset(preset_id, &request.name, &scope, &actor)
        .map_err(translate_persistence_error)?;

    info!(
        actor_id = %authenticated_actor.id,
        preset_id,
        renamed = change.event.is_rename(),
        tasks = change.task_ids.len(),
        "Updated preset"
    );
    Ok(preset_change_to_response(
        change,
        format!("Updated preset {preset_id}"),
    ))
}

/// Deletes a preset and queues the removal of its group.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the preset does not exist.
pub fn delete_preset(
    persistence: &mut Persistence,
    preset_id: i64,
    authenticated_actor: &AuthenticatedActor,
) -> Result<PresetWriteResponse, ApiError> {
    AuthorizationService::authorize_admin(authenticated_actor, "delete_preset")?;

    let actor: Actor = authenticated_actor.to_event_actor();
    let change: PresetChange = persistence
        .delete_preset(preset_id, &actor)
        .map_err(translate_persistence_error)?;

    info!(actor_id = %authenticated_actor.id, preset_id, "Deleted preset");
    Ok(preset_change_to_response(
        change,
        format!("Deleted preset {preset_id}"),
    ))
}

/// # Errors
///
/// Returns an error if the preset does not exist.
pub fn get_preset(persistence: &mut Persistence, preset_id: i64) -> Result<PresetInfo, ApiError> {
    persistence
        .get_preset(preset_id)
        .map(preset_to_info)
        .map_err(translate_persistence_error)
}

/// # Errors
///
/// Returns an error if the presets cannot be read.
pub fn list_presets(persistence: &mut Persistence) -> Result<ListPresetsResponse, ApiError> {
    let presets: Vec<PresetInfo> = persistence
        .list_presets()
        .map_err(translate_persistence_error)?
        .into_iter()
        .map(preset_to_info)
        .collect();
    Ok(ListPresetsResponse { presets })
}

// ============================================================================
// Catalog
// ============================================================================

/// Applies a catalog mutation and queues the tasks for the event it raises.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the mutation is rejected.
pub fn apply_catalog_event(
    persistence: &mut Persistence,
    mutation: &CatalogMutation,
    authenticated_actor: &AuthenticatedActor,
) -> Result<CatalogEventResponse, ApiError> {
    AuthorizationService::authorize_admin(authenticated_actor, "apply_catalog_event")?;

    let change: CatalogChange = persistence
        .apply_catalog_mutation(mutation)
        .map_err(translate_persistence_error)?;

    let event: Option<String> = change.event.as_ref().map(|e| e.name().to_string());
    info!(
        actor_id = %authenticated_actor.id,
        event = event.as_deref().unwrap_or("none"),
        tasks = change.task_ids.len(),
        "Applied catalog mutation"
    );
    Ok(CatalogEventResponse {
        item: change.item,
        event,
        task_ids: change.task_ids,
    })
}

/// # Errors
///
/// Returns an error if the catalog cannot be read.
pub fn list_categories(persistence: &mut Persistence) -> Result<ListCategoriesResponse, ApiError> {
    let categories: Vec<CategoryInfo> = persistence
        .list_categories()
        .map_err(translate_persistence_error)?
        .into_iter()
        .map(|c: CategoryData| CategoryInfo {
            category_id: c.category_id,
            name: c.name,
        })
        .collect();
    Ok(ListCategoriesResponse { categories })
}

/// Lists courses with their tags and the groups enrolled into each.
///
/// # Errors
///
/// Returns an error if the catalog or enrolment methods cannot be read.
pub fn list_courses(persistence: &mut Persistence) -> Result<ListCoursesResponse, ApiError> {
    let rows: Vec<CourseData> = persistence
        .list_courses()
        .map_err(translate_persistence_error)?;

    let mut courses: Vec<CourseInfo> = Vec::with_capacity(rows.len());
    for row in rows {
        let mut group_ids: Vec<i64> = persistence
            .enrolments_for_course(row.course_id)
            .map_err(translate_persistence_error)?
            .into_iter()
            .map(|m| m.group_id)
            .collect();
        group_ids.sort_unstable();
        courses.push(CourseInfo {
            course_id: row.course_id,
            fullname: row.fullname,
            category_id: row.category_id,
            tag_ids: row.tag_ids,
            group_ids,
        });
    }
    Ok(ListCoursesResponse { courses })
}

/// # Errors
///
/// Returns an error if the catalog cannot be read.
pub fn list_tags(persistence: &mut Persistence) -> Result<ListTagsResponse, ApiError> {
    let tags: Vec<TagInfo> = persistence
        .list_tags()
        .map_err(translate_persistence_error)?
        .into_iter()
        .map(|t: TagData| TagInfo {
            tag_id: t.tag_id,
            name: t.name,
        })
        .collect();
    Ok(ListTagsResponse { tags })
}

// ============================================================================
// Task queue
// ============================================================================

fn task_to_info(record: TaskRecord) -> TaskInfo {
    TaskInfo {
        task_id: record.task_id,
        kind: record.kind,
        status: record.status.as_str().to_string(),
        attempts: record.attempts,
        last_error: record.last_error,
        created_at: record.created_at,
        updated_at: record.updated_at,
    }
}

/// Lists queued tasks, optionally filtered by status.
///
/// # Errors
///
/// Returns an error if `status` is not `pending`, `done` or `failed`.
pub fn list_tasks(
    persistence: &mut Persistence,
    status: Option<&str>,
) -> Result<ListTasksResponse, ApiError> {
    let filter: Option<TaskStatus> = status
        .map(TaskStatus::parse)
        .transpose()
        .map_err(|e| ApiError::InvalidInput {
            field: String::from("status"),
            message: e.to_string(),
        })?;

    let records: Vec<TaskRecord> = persistence
        .list_tasks(filter)
        .map_err(translate_persistence_error)?;
    let pending: usize = records
        .iter()
        .filter(|t| t.status == TaskStatus::Pending)
        .count();
    let failed: usize = records
        .iter()
        .filter(|t| t.status == TaskStatus::Failed)
        .count();

    Ok(ListTasksResponse {
        tasks: records.into_iter().map(task_to_info).collect(),
        pending,
        failed,
    })
}

/// Drains up to `request.limit` tasks now.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the limit is zero, or the
/// queue cannot be read. Task failures are reported in the response.
pub fn run_tasks(
    persistence: &mut Persistence,
    request: RunTasksRequest,
    max_attempts: i32,
    authenticated_actor: &AuthenticatedActor,
) -> Result<RunTasksResponse, ApiError> {
    AuthorizationService::authorize_admin(authenticated_actor, "run_tasks")?;
    if request.limit == 0 {
        return Err(ApiError::InvalidInput {
            field: String::from("limit"),
            message: String::from("limit must be at least 1"),
        });
    }

    let report: RunReport = persistence
        .run_pending(request.limit, max_attempts)
        .map_err(translate_persistence_error)?;

    Ok(RunTasksResponse {
        completed: report.completed,
        retried: report.retried,
        parked: report.parked,
        enrolments_added: report.changes.enrolments_added,
        enrolments_removed: report.changes.enrolments_removed,
    })
}

/// Re-queues a parked task.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or no failed task has this id.
pub fn retry_task(
    persistence: &mut Persistence,
    task_id: i64,
    authenticated_actor: &AuthenticatedActor,
) -> Result<TaskInfo, ApiError> {
    AuthorizationService::authorize_admin(authenticated_actor, "retry_task")?;

    let record: TaskRecord = persistence
        .retry_task(task_id)
        .map_err(translate_persistence_error)?;
    info!(actor_id = %authenticated_actor.id, task_id, "Re-queued failed task");
    Ok(task_to_info(record))
}

// ============================================================================
// Users
// ============================================================================

/// Groups the user belongs to right now.
///
/// # Errors
///
/// Returns an error if the rules or the profile cannot be read.
pub fn groups_for_user(
    persistence: &mut Persistence,
    user_id: i64,
    now: OffsetDateTime,
) -> Result<UserGroupsResponse, ApiError> {
    let groups: Vec<GroupInfo> = persistence
        .groups_for_user(user_id, now)
        .map_err(translate_persistence_error)?
        .into_iter()
        .map(|g: GroupBinding| GroupInfo {
            group_id: g.group_id,
            name: g.name,
            item_type: g.item.item_type,
            item_id: g.item.item_id,
        })
        .collect();
    debug!(user_id, groups = groups.len(), "Resolved user groups");
    Ok(UserGroupsResponse { user_id, groups })
}

/// Updates a user's selections and enrolled-until date.
///
/// Every field name and value is checked before anything is written.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Admin
/// - A field name is unknown or is the date field
/// - A value is not one of the field's allowed values
/// - The date cannot be parsed
pub fn set_user_profile(
    persistence: &mut Persistence,
    user_id: i64,
    request: &SetUserProfileRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<(), ApiError> {
    AuthorizationService::authorize_admin(authenticated_actor, "set_user_profile")?;

    let mut selections: Vec<(ProfileField, Vec<String>)> =
        Vec::with_capacity(request.selections.len());
    for (name, values) in &request.selections {
        let field: ProfileField = name.parse().map_err(translate_domain_error)?;
        if field == ProfileField::EnrolledUntil {
            return Err(translate_domain_error(DomainError::InvalidProfileField(
                name.clone(),
            )));
        }
        let allowed: AllowedValues = persistence
            .allowed_values(field)
            .map_err(translate_persistence_error)?;
        if let Some(value) = values.iter().find(|v| !allowed.contains(v)) {
            return Err(translate_domain_error(DomainError::ValueNotAllowed {
                field: name.clone(),
                value: value.clone(),
            }));
        }
        selections.push((field, values.clone()));
    }

    let until: Option<Option<OffsetDateTime>> = match request.enrolled_until.as_deref() {
        None => None,
        Some("") => Some(None),
        Some(raw) => Some(Some(parse_date(raw).map_err(translate_domain_error)?)),
    };

    for (field, values) in selections {
        persistence
            .set_user_selection(user_id, field, values)
            .map_err(translate_persistence_error)?;
    }
    if let Some(until) = until {
        persistence
            .set_enrolled_until(user_id, until)
            .map_err(translate_persistence_error)?;
    }

    info!(actor_id = %authenticated_actor.id, user_id, "Updated user profile");
    Ok(())
}

// ============================================================================
// Set-up sync
// ============================================================================

fn plan_to_response(plan: &SetupPlan) -> SetupPlanResponse {
    SetupPlanResponse {
        entries: plan
            .entries
            .iter()
            .map(|e| SetupEntryInfo {
                item_type: e.item.item.item_type,
                item_id: e.item.item.item_id,
                name: e.item.name.clone(),
                course_count: e.course_ids.len(),
            })
            .collect(),
        tags: plan.count(ItemType::Tag),
        categories: plan.count(ItemType::Category),
        courses: plan.count(ItemType::Course),
        presets: plan.count(ItemType::Preset),
    }
}

/// Reports what the set-up sync would add, without writing.
///
/// # Errors
///
/// Returns an error if the catalog or presets cannot be read.
pub fn setup_plan(persistence: &mut Persistence) -> Result<SetupPlanResponse, ApiError> {
    let plan: SetupPlan = persistence
        .setup_plan()
        .map_err(translate_persistence_error)?;
    Ok(plan_to_response(&plan))
}

/// Runs the set-up sync for all existing content.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or any item fails, in which
/// case nothing is written.
pub fn run_setup(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
) -> Result<RunSetupResponse, ApiError> {
    AuthorizationService::authorize_admin(authenticated_actor, "run_setup")?;

    let (plan, changes): (SetupPlan, Changes) = persistence
        .run_setup()
        .map_err(translate_persistence_error)?;
    info!(
        actor_id = %authenticated_actor.id,
        items = plan.entries.len(),
        enrolments_added = changes.enrolments_added,
        "Ran set-up sync"
    );
    Ok(RunSetupResponse::new(plan_to_response(&plan), changes))
}
