//! HTTP intake: job start/stop, live progress feed and allow-list admin.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRequestParts, Multipart, Path, State};
use axum::http::request::Parts;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::Utc;
use engine_logging::{engine_info, engine_warn};
use futures_util::{Stream, StreamExt};
use relay_core::{ProgressEvent, StartForm, UserRecord};
use serde::{Deserialize, Serialize};

use crate::error::{Ack, AppError, AppResult};
use crate::state::AppState;
use crate::users::{StoreError, UserStore};

pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/start", post(start_job))
        .route("/api/stop", post(stop_job))
        .route("/api/status", get(job_status))
        .route("/api/events", get(progress_feed))
        .route("/api/admin/users", get(list_users).post(add_user))
        .route("/api/admin/users/{username}/block", post(block_user))
        .route("/api/admin/users/{username}", delete(remove_user))
        .with_state(state)
}

/// Multipart fields of a start submission.
#[derive(Debug, Default)]
struct StartIntake {
    username: Option<String>,
    form: StartForm,
}

async fn read_start_intake(mut multipart: Multipart) -> AppResult<StartIntake> {
    let mut intake = StartIntake::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::BadRequest(err.to_string()))?
    {
        let Some(name) = field.name().map(ToOwned::to_owned) else {
            continue;
        };
        let value = field
            .text()
            .await
            .map_err(|err| AppError::BadRequest(format!("field {name}: {err}")))?;
        match name.as_str() {
            "username" => intake.username = Some(value),
            "token" => intake.form.credential = Some(value),
            "postIds" => intake.form.targets = Some(value),
            "delay" => intake.form.delay = Some(value),
            "comments" => intake.form.comments_text = Some(value),
            _ => {}
        }
    }
    Ok(intake)
}

async fn start_job(State(state): State<AppState>, multipart: Multipart) -> AppResult<Json<Ack>> {
    let intake = read_start_intake(multipart).await?;

    let username = intake
        .username
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::Forbidden("username required".into()))?;
    if !state.users.is_allowed(&username, Utc::now()) {
        engine_warn!("Rejected start from non-approved user {:?}", username);
        return Err(AppError::Forbidden(format!(
            "user {username} is not approved or has expired"
        )));
    }

    let ticket = state.runner.start_form(intake.form)?;
    engine_info!("User {:?} started job {}", username, ticket.id());
    Ok(Json(Ack::ok(format!("Job {} started", ticket.id()))))
}

async fn stop_job(State(state): State<AppState>) -> Json<Ack> {
    let message = if state.runner.stop() {
        "Stop requested"
    } else {
        "No job is running"
    };
    Json(Ack::ok(message))
}

#[derive(Debug, Serialize)]
struct StatusBody {
    running: bool,
}

async fn job_status(State(state): State<AppState>) -> Json<StatusBody> {
    Json(StatusBody {
        running: state.runner.is_running(),
    })
}

async fn progress_feed(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let events = state
        .broadcaster
        .subscribe()
        .into_stream()
        .map(|event| Ok(to_sse_event(&event)));
    Sse::new(events).keep_alive(KeepAlive::default())
}

fn to_sse_event(event: &ProgressEvent) -> Event {
    Event::default().json_data(event).unwrap_or_else(|err| {
        engine_warn!("Dropping unserializable progress event: {}", err);
        Event::default().comment("unserializable event")
    })
}

/// Passes only requests carrying the configured admin key.
pub struct AdminGuard;

impl FromRequestParts<AppState> for AdminGuard {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let expected = state.admin_key.as_deref().ok_or(AppError::Unauthorized)?;
        let provided = parts
            .headers
            .get(ADMIN_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or(AppError::Unauthorized)?;
        if !constant_time_eq(provided.as_bytes(), expected.as_bytes()) {
            return Err(AppError::Unauthorized);
        }
        Ok(AdminGuard)
    }
}

/// Compares without short-circuiting on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Run a store operation on the blocking pool; saves sync to disk.
async fn with_store<T, F>(state: &AppState, op: F) -> AppResult<T>
where
    F: FnOnce(&UserStore) -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    let users = Arc::clone(&state.users);
    Ok(tokio::task::spawn_blocking(move || op(&users)).await??)
}

async fn list_users(_admin: AdminGuard, State(state): State<AppState>) -> Json<Vec<UserRecord>> {
    Json(state.users.get_all_users())
}

#[derive(Debug, Deserialize)]
struct AddUserBody {
    username: String,
    days: u32,
}

async fn add_user(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Json(body): Json<AddUserBody>,
) -> AppResult<Json<UserRecord>> {
    let username = body.username.trim().to_string();
    if username.is_empty() {
        return Err(AppError::BadRequest("username required".into()));
    }
    let days = body.days;
    let record = with_store(&state, move |users| {
        users.add_user(&username, days, Utc::now())
    })
    .await?;
    engine_info!("Approved {:?} until {}", record.username, record.expiry);
    Ok(Json(record))
}

async fn block_user(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<UserRecord>> {
    let name = username.clone();
    let record = with_store(&state, move |users| users.block_user(&name))
        .await?
        .ok_or_else(|| AppError::UserNotFound(username.clone()))?;
    engine_info!("Blocked {:?}", username);
    Ok(Json(record))
}

async fn remove_user(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<Ack>> {
    let name = username.clone();
    if !with_store(&state, move |users| users.remove_user(&name)).await? {
        return Err(AppError::UserNotFound(username));
    }
    engine_info!("Removed {:?}", username);
    Ok(Json(Ack::ok(format!("Removed {username}"))))
}
