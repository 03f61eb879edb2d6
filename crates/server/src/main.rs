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
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use clap::{Parser, Subcommand};
use enrolsync_api::{
    ApiError, AuthError, AuthenticatedActor, CatalogEventResponse, ListCategoriesResponse,
    ListCoursesResponse, ListPresetsResponse, ListTagsResponse, ListTasksResponse, PresetInfo,
    PresetRequest, PresetWriteResponse, Role, RunSetupResponse, RunTasksRequest,
    RunTasksResponse, SetUserProfileRequest, SetupPlanResponse, TaskInfo, UserGroupsResponse,
    apply_catalog_event, authenticate_stub, create_preset, delete_preset, get_preset,
    groups_for_user, list_categories, list_courses, list_presets, list_tags, list_tasks,
    retry_task, run_setup, run_tasks, set_user_profile, setup_plan, update_preset,
};
use enrolsync_persistence::{CatalogMutation, Persistence, PersistenceError, RunReport};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{error, info};

/// enrolsync server: keeps groups, rules, profile fields and enrolment
/// methods in sync with tags, courses, categories and presets.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// How often the background worker drains the task queue
    #[arg(long, default_value_t = 1000)]
    worker_interval_ms: u64,

    /// Most tasks the worker finishes per poll
    #[arg(long, default_value_t = 100)]
    worker_batch: usize,

    /// Failed attempts after which a task is parked as failed
    #[arg(long, default_value_t = 5)]
    max_attempts: i32,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Syncs content that existed before enrolsync was installed.
    ///
    /// Prints the plan without writing unless `--run` is given.
    Setup {
        #[arg(long)]
        run: bool,
    },
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    persistence: Arc<Mutex<Persistence>>,
    /// Attempts allowed to tasks run through `POST /tasks/run`.
    max_attempts: i32,
}

/// A state-changing request: caller identity plus the operation body.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct AdminRequest<T> {
    /// The actor ID performing this action.
    actor_id: String,
    /// The role of the actor.
    actor_role: String,
    #[serde(flatten)]
    body: T,
}

/// A state-changing request that needs nothing beyond caller identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct ActorRequest {
    actor_id: String,
    actor_role: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct TaskQuery {
    /// `pending`, `done` or `failed`.
    status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct HealthResponse {
    status: String,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::DomainRuleViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<AuthError> for HttpError {
    fn from(err: AuthError) -> Self {
        Self::from(ApiError::from(err))
    }
}

fn authenticate(actor_id: &str, actor_role: &str) -> Result<AuthenticatedActor, HttpError> {
    Ok(authenticate_stub(actor_id, actor_role)?)
}

// ============================================================================
// Handlers
// ============================================================================

#[allow(clippy::unused_async)]
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: String::from("ok"),
    })
}

async fn handle_list_presets(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<ListPresetsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(list_presets(&mut persistence)?))
}

async fn handle_get_preset(
    AxumState(app_state): AxumState<AppState>,
    Path(preset_id): Path<i64>,
) -> Result<Json<PresetInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(get_preset(&mut persistence, preset_id)?))
}

async fn handle_create_preset(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<AdminRequest<PresetRequest>>,
) -> Result<Json<PresetWriteResponse>, HttpError> {
    info!(actor_id = %req.actor_id, name = %req.body.name, "Handling create_preset request");
    let actor: AuthenticatedActor = authenticate(&req.actor_id, &req.actor_role)?;

    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(create_preset(&mut persistence, &req.body, &actor)?))
}

async fn handle_update_preset(
    AxumState(app_state): AxumState<AppState>,
    Path(preset_id): Path<i64>,
    Json(req): Json<AdminRequest<PresetRequest>>,
) -> Result<Json<PresetWriteResponse>, HttpError> {
    info!(actor_id = %req.actor_id, preset_id, "Handling update_preset request");
    let actor: AuthenticatedActor = authenticate(&req.actor_id, &req.actor_role)?;

    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(update_preset(
        &mut persistence,
        preset_id,
        &req.body,
        &actor,
    )?))
}

async fn handle_delete_preset(
    AxumState(app_state): AxumState<AppState>,
    Path(preset_id): Path<i64>,
    Json(req): Json<ActorRequest>,
) -> Result<Json<PresetWriteResponse>, HttpError> {
    info!(actor_id = %req.actor_id, preset_id, "Handling delete_preset request");
    let actor: AuthenticatedActor = authenticate(&req.actor_id, &req.actor_role)?;

    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(delete_preset(&mut persistence, preset_id, &actor)?))
}

async fn handle_list_categories(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<ListCategoriesResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(list_categories(&mut persistence)?))
}

async fn handle_list_courses(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<ListCoursesResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(list_courses(&mut persistence)?))
}

async fn handle_list_tags(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<ListTagsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(list_tags(&mut persistence)?))
}

async fn handle_catalog_event(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<AdminRequest<CatalogMutation>>,
) -> Result<Json<CatalogEventResponse>, HttpError> {
    info!(actor_id = %req.actor_id, "Handling catalog event");
    let actor: AuthenticatedActor = authenticate(&req.actor_id, &req.actor_role)?;

    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(apply_catalog_event(&mut persistence, &req.body, &actor)?))
}

async fn handle_list_tasks(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<TaskQuery>,
) -> Result<Json<ListTasksResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(list_tasks(&mut persistence, query.status.as_deref())?))
}

async fn handle_run_tasks(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<AdminRequest<RunTasksRequest>>,
) -> Result<Json<RunTasksResponse>, HttpError> {
    info!(actor_id = %req.actor_id, limit = req.body.limit, "Handling run_tasks request");
    let actor: AuthenticatedActor = authenticate(&req.actor_id, &req.actor_role)?;

    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(run_tasks(
        &mut persistence,
        req.body,
        app_state.max_attempts,
        &actor,
    )?))
}

async fn handle_retry_task(
    AxumState(app_state): AxumState<AppState>,
    Path(task_id): Path<i64>,
    Json(req): Json<ActorRequest>,
) -> Result<Json<TaskInfo>, HttpError> {
    info!(actor_id = %req.actor_id, task_id, "Handling retry_task request");
    let actor: AuthenticatedActor = authenticate(&req.actor_id, &req.actor_role)?;

    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(retry_task(&mut persistence, task_id, &actor)?))
}

async fn handle_user_groups(
    AxumState(app_state): AxumState<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserGroupsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(groups_for_user(
        &mut persistence,
        user_id,
        OffsetDateTime::now_utc(),
    )?))
}

/// Stores the profile change and answers with the user's groups afterwards.
async fn handle_set_user_profile(
    AxumState(app_state): AxumState<AppState>,
    Path(user_id): Path<i64>,
    Json(req): Json<AdminRequest<SetUserProfileRequest>>,
) -> Result<Json<UserGroupsResponse>, HttpError> {
    info!(actor_id = %req.actor_id, user_id, "Handling set_user_profile request");
    let actor: AuthenticatedActor = authenticate(&req.actor_id, &req.actor_role)?;

    let mut persistence = app_state.persistence.lock().await;
    set_user_profile(&mut persistence, user_id, &req.body, &actor)?;
    Ok(Json(groups_for_user(
        &mut persistence,
        user_id,
        OffsetDateTime::now_utc(),
    )?))
}

async fn handle_setup_plan(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<SetupPlanResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(setup_plan(&mut persistence)?))
}

async fn handle_run_setup(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ActorRequest>,
) -> Result<Json<RunSetupResponse>, HttpError> {
    info!(actor_id = %req.actor_id, "Handling run_setup request");
    let actor: AuthenticatedActor = authenticate(&req.actor_id, &req.actor_role)?;

    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(run_setup(&mut persistence, &actor)?))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/presets", get(handle_list_presets).post(handle_create_preset))
        .route(
            "/presets/{preset_id}",
            get(handle_get_preset)
                .put(handle_update_preset)
                .delete(handle_delete_preset),
        )
        .route("/catalog/categories", get(handle_list_categories))
        .route("/catalog/courses", get(handle_list_courses))
        .route("/catalog/tags", get(handle_list_tags))
        .route("/catalog/events", post(handle_catalog_event))
        .route("/tasks", get(handle_list_tasks))
        .route("/tasks/run", post(handle_run_tasks))
        .route("/tasks/{task_id}/retry", post(handle_retry_task))
        .route("/users/{user_id}/groups", get(handle_user_groups))
        .route("/users/{user_id}/profile", put(handle_set_user_profile))
        .route("/setup", get(handle_setup_plan).post(handle_run_setup))
        .with_state(app_state)
}

// ============================================================================
// Background worker
// ============================================================================

/// Drains the task queue on a fixed interval until the process exits.
async fn run_worker(app_state: AppState, interval: Duration, batch: usize) {
    let mut ticker: tokio::time::Interval = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        let result: Result<RunReport, PersistenceError> = {
            let mut persistence = app_state.persistence.lock().await;
            persistence.run_pending(batch, app_state.max_attempts)
        };
        match result {
            Ok(report) => log_report(&report),
            Err(e) => error!(error = %e, "Task worker could not read the queue"),
        }
    }
}

fn log_report(report: &RunReport) {
    if report.completed + report.retried + report.parked == 0 {
        return;
    }
    info!(
        completed = report.completed,
        retried = report.retried,
        parked = report.parked,
        enrolments_added = report.changes.enrolments_added,
        enrolments_removed = report.changes.enrolments_removed,
        "Task worker drained queue"
    );
}

/// Runs the `setup` subcommand and prints the result as JSON.
fn run_setup_command(
    persistence: &mut Persistence,
    run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let output: String = if run {
        let actor: AuthenticatedActor = AuthenticatedActor::new(String::from("cli"), Role::Admin);
        let response: RunSetupResponse = run_setup(persistence, &actor)?;
        serde_json::to_string_pretty(&response)?
    } else {
        let plan: SetupPlanResponse = setup_plan(persistence)?;
        serde_json::to_string_pretty(&plan)?
    };
    println!("{output}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing enrolsync server");

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let mut persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    if let Some(Command::Setup { run }) = args.command {
        return run_setup_command(&mut persistence, run);
    }

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        max_attempts: args.max_attempts,
    };

    tokio::spawn(run_worker(
        app_state.clone(),
        Duration::from_millis(args.worker_interval_ms.max(1)),
        args.worker_batch.max(1),
    ));

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener: tokio::net::TcpListener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests;
