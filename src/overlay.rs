//! Mutable per-shoot state layered over the static schedule.
//!
//! Two documents live in the key-value store: status updates keyed by event
//! id, and acceptance decisions keyed by event id then photographer id. Both
//! are written as `{"version": 1, "entries": {...}}`. Reads never fail: a
//! missing, unreadable or unsupported document is reported in the log and
//! read back as an empty overlay, so the schedule falls back to its fixture
//! values.
//!
//! Writes are stricter. A storage error while loading the current document,
//! or a document written by another version, aborts the write and leaves the
//! stored value as it was. Only an unreadable document is replaced.

use crate::db::KeyValueStore;
use crate::error::AppError;
use crate::models::{
    AcceptanceDecision, AcceptanceStatus, EventId, PhotographerId, ScheduleEvent, ShootStatus,
    StatusUpdate,
};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

pub const STATUS_KEY: &str = "schedule_status_updates";
pub const ACCEPTANCE_KEY: &str = "schedule_acceptance";
pub const OVERLAY_VERSION: u64 = 1;

pub type StatusOverlay = BTreeMap<EventId, StatusUpdate>;
pub type AcceptanceOverlay = BTreeMap<EventId, BTreeMap<PhotographerId, AcceptanceDecision>>;

#[derive(Serialize, Deserialize)]
struct Document<T> {
    version: u64,
    entries: T,
}

/// Unversioned acceptance layout: one decision per event, whoever decided last.
type LegacyAcceptance = BTreeMap<EventId, AcceptanceDecision>;

pub struct Overlay<S> {
    store: S,
    write_lock: Mutex<()>,
}

impl<S: KeyValueStore> Overlay<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn status_overlay(&self) -> StatusOverlay {
        match self.read_raw(STATUS_KEY).await {
            Some(raw) => decode(STATUS_KEY, &raw, upgrade_status).unwrap_or_default(),
            None => StatusOverlay::new(),
        }
    }

    pub async fn acceptance_overlay(&self) -> AcceptanceOverlay {
        match self.read_raw(ACCEPTANCE_KEY).await {
            Some(raw) => decode(ACCEPTANCE_KEY, &raw, upgrade_acceptance).unwrap_or_default(),
            None => AcceptanceOverlay::new(),
        }
    }

    /// Records `status` for `event_id`. Last write wins.
    pub async fn set_status(
        &self,
        event_id: &str,
        status: ShootStatus,
        updated_by: &str,
    ) -> Result<StatusUpdate, AppError> {
        self.set_status_checked(event_id, status, updated_by, |_| Ok(()))
            .await
    }

    /// Moves `event` to `to` only if that is the same stage or the next one,
    /// judged against the status stored at the time of the write.
    pub async fn transition_status(
        &self,
        event: &ScheduleEvent,
        to: ShootStatus,
        updated_by: &str,
    ) -> Result<StatusUpdate, AppError> {
        self.set_status_checked(&event.id, to, updated_by, |stored| {
            let current = stored.unwrap_or(event.status);
            if current.can_transition_to(to) {
                Ok(())
            } else {
                Err(AppError::InvalidTransition(format!(
                    "cannot move shoot {} from {current} to {to}",
                    event.id
                )))
            }
        })
        .await
    }

    /// `check` runs under the write lock and sees the overlay status for
    /// `event_id`, if there is one. An error from it aborts the write.
    async fn set_status_checked<F>(
        &self,
        event_id: &str,
        status: ShootStatus,
        updated_by: &str,
        check: F,
    ) -> Result<StatusUpdate, AppError>
    where
        F: FnOnce(Option<ShootStatus>) -> Result<(), AppError> + Send,
    {
        let _lock = self.write_lock.lock().await;

        let mut overlay = self.load_for_write(STATUS_KEY, upgrade_status).await?;
        check(overlay.get(event_id).map(|update| update.status))?;

        let update = StatusUpdate {
            status,
            updated_at: Utc::now(),
            updated_by: updated_by.to_string(),
        };
        overlay.insert(event_id.to_string(), update.clone());
        self.write(STATUS_KEY, overlay).await?;

        tracing::info!(event_id, %status, updated_by, "shoot status updated");
        Ok(update)
    }

    /// Records one photographer's decision on an event. Decisions by other
    /// photographers on the same event are left untouched.
    pub async fn set_acceptance(
        &self,
        event_id: &str,
        photographer_id: &str,
        accept: bool,
        reason: Option<String>,
    ) -> Result<AcceptanceDecision, AppError> {
        let _lock = self.write_lock.lock().await;

        let mut overlay = self
            .load_for_write(ACCEPTANCE_KEY, upgrade_acceptance)
            .await?;
        let decision = AcceptanceDecision {
            status: if accept {
                AcceptanceStatus::Accepted
            } else {
                AcceptanceStatus::Rejected
            },
            decided_at: Utc::now(),
            decided_by: photographer_id.to_string(),
            rejection_reason: if accept { None } else { reason },
        };
        overlay
            .entry(event_id.to_string())
            .or_default()
            .insert(photographer_id.to_string(), decision.clone());
        self.write(ACCEPTANCE_KEY, overlay).await?;

        tracing::info!(event_id, photographer_id, accept, "shoot acceptance recorded");
        Ok(decision)
    }

    pub async fn clear_all(&self) -> Result<(), AppError> {
        let _lock = self.write_lock.lock().await;
        self.store.remove_many(&[STATUS_KEY, ACCEPTANCE_KEY]).await?;
        tracing::info!("schedule overlay cleared");
        Ok(())
    }

    async fn read_raw(&self, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(key, error = %e, "failed to read overlay, using fixture values");
                None
            }
        }
    }

    /// Current entries for a read-modify-write. Storage errors and documents
    /// of another version abort the write; unreadable documents start empty.
    async fn load_for_write<T, L>(&self, key: &str, upgrade: fn(L) -> T) -> Result<T, AppError>
    where
        T: DeserializeOwned + Default,
        L: DeserializeOwned,
    {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(T::default());
        };
        match decode(key, &raw, upgrade) {
            Ok(entries) => Ok(entries),
            Err(Discarded::Unreadable) => Ok(T::default()),
            Err(Discarded::Unsupported(version)) => Err(AppError::UnsupportedOverlay(format!(
                "{key} is stored as version {version}, expected {OVERLAY_VERSION}"
            ))),
        }
    }

    async fn write<T: Serialize>(&self, key: &str, entries: T) -> Result<(), AppError> {
        let raw = serde_json::to_string(&Document {
            version: OVERLAY_VERSION,
            entries,
        })?;
        self.store.put(key, &raw).await
    }
}

/// Why a stored document was not decoded.
#[derive(Debug, PartialEq, Eq)]
enum Discarded {
    Unreadable,
    Unsupported(u64),
}

fn decode<T, L>(key: &str, raw: &str, upgrade: fn(L) -> T) -> Result<T, Discarded>
where
    T: DeserializeOwned,
    L: DeserializeOwned,
{
    let value: Value = serde_json::from_str(raw).map_err(|e| {
        tracing::warn!(key, error = %e, "unreadable overlay");
        Discarded::Unreadable
    })?;

    match value.get("version").and_then(Value::as_u64) {
        Some(OVERLAY_VERSION) => serde_json::from_value::<Document<T>>(value)
            .map(|document| document.entries)
            .map_err(|e| {
                tracing::warn!(key, error = %e, "malformed overlay");
                Discarded::Unreadable
            }),
        Some(version) => {
            tracing::warn!(key, version, "overlay has unsupported version");
            Err(Discarded::Unsupported(version))
        }
        None => match serde_json::from_value::<L>(value) {
            Ok(legacy) => {
                tracing::debug!(key, "upgrading unversioned overlay");
                Ok(upgrade(legacy))
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "malformed overlay");
                Err(Discarded::Unreadable)
            }
        },
    }
}

fn upgrade_status(legacy: StatusOverlay) -> StatusOverlay {
    legacy
}

fn upgrade_acceptance(legacy: LegacyAcceptance) -> AcceptanceOverlay {
    let mut overlay = AcceptanceOverlay::new();
    for (event_id, decision) in legacy {
        overlay
            .entry(event_id)
            .or_default()
            .insert(decision.decided_by.clone(), decision);
    }
    overlay
}
