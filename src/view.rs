//! Builds the annotated shoot lists behind the admin calendar and a
//! photographer's own schedule: fixture events, with overlay status and
//! acceptance merged in, narrowed by the caller's filter.

use crate::conflict;
use crate::models::{
    AcceptanceStatus, EventId, PhotographerId, ScheduleEvent, ShootStatus, StatusUpdate,
};
use crate::overlay::{AcceptanceOverlay, StatusOverlay};
use crate::store::ScheduleStore;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Query-string filter. Blank fields do not filter; `all` is accepted as
/// "no filter" for the select-style fields.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ScheduleFilter {
    pub search: Option<String>,
    pub status: Option<String>,
    pub product_type: Option<String>,
    #[serde(default)]
    pub confirmed_only: bool,
    pub photographer_id: Option<PhotographerId>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

fn active(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

impl ScheduleFilter {
    fn matches(&self, store: &ScheduleStore, event: &ScheduleEvent, status: ShootStatus) -> bool {
        if let Some(wanted) = active(&self.status) {
            // an unrecognised status matches nothing rather than erroring
            match wanted.parse::<ShootStatus>() {
                Ok(wanted) if wanted == status => {}
                _ => return false,
            }
        }

        if let Some(product_type) = active(&self.product_type) {
            if event.product_type != product_type {
                return false;
            }
        }

        if let Some(photographer_id) = active(&self.photographer_id) {
            if !event.is_assigned_to(photographer_id) {
                return false;
            }
        }

        let day = event.start.date();
        if self.from.is_some_and(|from| day < from) || self.to.is_some_and(|to| day > to) {
            return false;
        }

        if let Some(needle) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let needle = needle.to_lowercase();
            let hit = event.photographer_ids.iter().any(|id| {
                store
                    .photographer(id)
                    .is_some_and(|p| p.name.to_lowercase().contains(&needle))
            });
            if !hit {
                return false;
            }
        }

        !self.confirmed_only || store.is_confirmed(event)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcceptanceView {
    pub photographer_id: PhotographerId,
    pub photographer_name: Option<String>,
    pub status: AcceptanceStatus,
    pub decided_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

/// A shoot as the calendar renders it. `event.status` already holds the
/// effective status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleView {
    #[serde(flatten)]
    pub event: ScheduleEvent,
    pub status_update: Option<StatusUpdate>,
    pub acceptances: Vec<AcceptanceView>,
    pub confirmed: bool,
    pub conflict_ids: Vec<EventId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScheduleSummary {
    pub total: usize,
    pub confirmed: usize,
    pub with_conflicts: usize,
    pub by_status: BTreeMap<ShootStatus, usize>,
}

/// Overlay value if present, otherwise the fixture value.
pub fn effective_status(event: &ScheduleEvent, statuses: &StatusOverlay) -> ShootStatus {
    statuses
        .get(&event.id)
        .map_or(event.status, |update| update.status)
}

fn acceptances_for(
    store: &ScheduleStore,
    event: &ScheduleEvent,
    acceptance: &AcceptanceOverlay,
) -> Vec<AcceptanceView> {
    let decisions = acceptance.get(&event.id);
    event
        .photographer_ids
        .iter()
        .map(|photographer_id| {
            let decision = decisions.and_then(|d| d.get(photographer_id));
            AcceptanceView {
                photographer_id: photographer_id.clone(),
                photographer_name: store.photographer(photographer_id).map(|p| p.name.clone()),
                status: decision.map_or(AcceptanceStatus::Pending, |d| d.status),
                decided_at: decision.map(|d| d.decided_at),
                rejection_reason: decision.and_then(|d| d.rejection_reason.clone()),
            }
        })
        .collect()
}

fn build_view(
    store: &ScheduleStore,
    event: &ScheduleEvent,
    statuses: &StatusOverlay,
    acceptance: &AcceptanceOverlay,
    conflict_ids: Vec<EventId>,
) -> ScheduleView {
    let mut merged = event.clone();
    merged.status = effective_status(event, statuses);
    ScheduleView {
        event: merged,
        status_update: statuses.get(&event.id).cloned(),
        acceptances: acceptances_for(store, event, acceptance),
        confirmed: store.is_confirmed(event),
        conflict_ids,
    }
}

/// View of a single shoot, with conflicts computed against the whole store.
pub fn annotate(
    store: &ScheduleStore,
    event: &ScheduleEvent,
    statuses: &StatusOverlay,
    acceptance: &AcceptanceOverlay,
) -> ScheduleView {
    let conflict_ids = conflict::find_conflicts(event, store.events())
        .into_iter()
        .map(|other| other.id.clone())
        .collect();
    build_view(store, event, statuses, acceptance, conflict_ids)
}

/// Filtered, annotated shoots ordered by start time. Shoots starting at the
/// same moment keep fixture order.
pub fn compose(
    store: &ScheduleStore,
    statuses: &StatusOverlay,
    acceptance: &AcceptanceOverlay,
    filter: &ScheduleFilter,
) -> Vec<ScheduleView> {
    let mut conflicts: HashMap<EventId, Vec<EventId>> = conflict::conflict_map(store.events());

    let mut views: Vec<ScheduleView> = store
        .events()
        .iter()
        .filter(|event| filter.matches(store, event, effective_status(event, statuses)))
        .map(|event| {
            let conflict_ids = conflicts.remove(&event.id).unwrap_or_default();
            build_view(store, event, statuses, acceptance, conflict_ids)
        })
        .collect();

    views.sort_by_key(|view| view.event.start);
    views
}

pub fn summarize(views: &[ScheduleView]) -> ScheduleSummary {
    let mut summary = ScheduleSummary {
        total: views.len(),
        ..ScheduleSummary::default()
    };
    for status in ShootStatus::ALL {
        summary.by_status.insert(status, 0);
    }
    for view in views {
        *summary.by_status.entry(view.event.status).or_default() += 1;
        if view.confirmed {
            summary.confirmed += 1;
        }
        if !view.conflict_ids.is_empty() {
            summary.with_conflicts += 1;
        }
    }
    summary
}
