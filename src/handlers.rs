use crate::{
    conflict,
    error::{AppError, AppResult},
    models::{AcceptanceDecision, Photographer, PhotographerId, ScheduleEvent, ShootStatus, StatusUpdate},
    state::AppState,
    store::ScheduleStore,
    view::{self, ScheduleFilter, ScheduleSummary, ScheduleView},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::NaiveDateTime;
use serde::Deserialize;

fn find_event<'a>(store: &'a ScheduleStore, id: &str) -> AppResult<&'a ScheduleEvent> {
    store
        .event(id)
        .ok_or_else(|| AppError::NotFound(format!("no shoot with id {id}")))
}

async fn filtered(app_state: &AppState, filter: &ScheduleFilter) -> Vec<ScheduleView> {
    let statuses = app_state.overlay.status_overlay().await;
    let acceptance = app_state.overlay.acceptance_overlay().await;
    view::compose(&app_state.store, &statuses, &acceptance, filter)
}

pub async fn list_schedules(
    State(app_state): State<AppState>,
    Query(filter): Query<ScheduleFilter>,
) -> Json<Vec<ScheduleView>> {
    Json(filtered(&app_state, &filter).await)
}

pub async fn schedule_summary(
    State(app_state): State<AppState>,
    Query(filter): Query<ScheduleFilter>,
) -> Json<ScheduleSummary> {
    Json(view::summarize(&filtered(&app_state, &filter).await))
}

pub async fn get_schedule(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ScheduleView>> {
    let event = find_event(&app_state.store, &id)?;
    let statuses = app_state.overlay.status_overlay().await;
    let acceptance = app_state.overlay.acceptance_overlay().await;
    Ok(Json(view::annotate(&app_state.store, event, &statuses, &acceptance)))
}

pub async fn list_photographers(State(app_state): State<AppState>) -> Json<Vec<Photographer>> {
    Json(app_state.store.photographers().into_iter().cloned().collect())
}

pub async fn photographer_schedule(
    State(app_state): State<AppState>,
    Path(photographer_id): Path<String>,
    Query(mut filter): Query<ScheduleFilter>,
) -> AppResult<Json<Vec<ScheduleView>>> {
    if app_state.store.photographer(&photographer_id).is_none() {
        return Err(AppError::NotFound(format!(
            "no photographer with id {photographer_id}"
        )));
    }
    filter.photographer_id = Some(photographer_id);
    Ok(Json(filtered(&app_state, &filter).await))
}

#[derive(Deserialize)]
pub struct StatusPayload {
    status: ShootStatus,
    updated_by: String,
}

pub async fn update_status(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<StatusPayload>,
) -> AppResult<Json<StatusUpdate>> {
    let event = find_event(&app_state.store, &id)?;

    let update = if app_state.config.strict_status_transitions {
        app_state
            .overlay
            .transition_status(event, payload.status, &payload.updated_by)
            .await?
    } else {
        app_state
            .overlay
            .set_status(&event.id, payload.status, &payload.updated_by)
            .await?
    };
    Ok(Json(update))
}

#[derive(Deserialize)]
pub struct AcceptancePayload {
    photographer_id: PhotographerId,
    accept: bool,
    reason: Option<String>,
}

pub async fn decide_acceptance(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<AcceptancePayload>,
) -> AppResult<Json<AcceptanceDecision>> {
    let event = find_event(&app_state.store, &id)?;
    if !event.is_assigned_to(&payload.photographer_id) {
        return Err(AppError::BadRequest(format!(
            "photographer {} is not assigned to shoot {id}",
            payload.photographer_id
        )));
    }

    let decision = app_state
        .overlay
        .set_acceptance(&event.id, &payload.photographer_id, payload.accept, payload.reason)
        .await?;
    Ok(Json(decision))
}

pub async fn get_conflicts(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<ScheduleEvent>>> {
    let event = find_event(&app_state.store, &id)?;
    let conflicts = conflict::find_conflicts(event, app_state.store.events());
    Ok(Json(conflicts.into_iter().cloned().collect()))
}

/// Proposed edit; omitted fields keep the shoot's current value.
#[derive(Deserialize)]
pub struct ConflictCheckPayload {
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    photographer_ids: Option<Vec<PhotographerId>>,
}

pub async fn check_conflicts(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ConflictCheckPayload>,
) -> AppResult<Json<Vec<ScheduleEvent>>> {
    let event = find_event(&app_state.store, &id)?;
    let candidate =
        conflict::with_changes(event, payload.start, payload.end, payload.photographer_ids);
    if candidate.end < candidate.start {
        return Err(AppError::BadRequest("end must not precede start".to_string()));
    }

    let conflicts = conflict::find_conflicts(&candidate, app_state.store.events());
    Ok(Json(conflicts.into_iter().cloned().collect()))
}

pub async fn clear_overlay(State(app_state): State<AppState>) -> AppResult<StatusCode> {
    app_state.overlay.clear_all().await?;
    Ok(StatusCode::NO_CONTENT)
}
