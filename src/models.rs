use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type EventId = String;
pub type PhotographerId = String;

#[derive(Debug, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownValue {
    pub kind: &'static str,
    pub value: String,
}

/// Where a shoot is in its day-of lifecycle.
///
/// Variants are declared in lifecycle order, so the derived `Ord` follows
/// `upcoming -> on_the_way -> in_progress -> completed -> uploaded`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ShootStatus {
    #[default]
    Upcoming,
    OnTheWay,
    InProgress,
    Completed,
    Uploaded,
}

impl ShootStatus {
    pub const ALL: [ShootStatus; 5] = [
        ShootStatus::Upcoming,
        ShootStatus::OnTheWay,
        ShootStatus::InProgress,
        ShootStatus::Completed,
        ShootStatus::Uploaded,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ShootStatus::Upcoming => "upcoming",
            ShootStatus::OnTheWay => "on_the_way",
            ShootStatus::InProgress => "in_progress",
            ShootStatus::Completed => "completed",
            ShootStatus::Uploaded => "uploaded",
        }
    }

    /// The following lifecycle stage, `None` once uploaded.
    pub fn next(self) -> Option<ShootStatus> {
        match self {
            ShootStatus::Upcoming => Some(ShootStatus::OnTheWay),
            ShootStatus::OnTheWay => Some(ShootStatus::InProgress),
            ShootStatus::InProgress => Some(ShootStatus::Completed),
            ShootStatus::Completed => Some(ShootStatus::Uploaded),
            ShootStatus::Uploaded => None,
        }
    }

    /// Allow-list used when strict transitions are switched on: staying put or
    /// moving one stage forward.
    pub fn can_transition_to(self, to: ShootStatus) -> bool {
        self == to || self.next() == Some(to)
    }
}

impl fmt::Display for ShootStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShootStatus {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShootStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownValue {
                kind: "shoot status",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceptanceStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    Inquiry,
    Consultation,
    Proposal,
    Contracted,
    Completed,
    Cancelled,
}

impl LeadStatus {
    /// Customers at these stages have signed, so their shoots are confirmed.
    pub fn is_confirmed(self) -> bool {
        matches!(self, LeadStatus::Contracted | LeadStatus::Completed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEvent {
    pub id: EventId,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    #[serde(default)]
    pub photographer_ids: Vec<PhotographerId>,
    #[serde(default)]
    pub status: ShootStatus,
    #[serde(default)]
    pub contract_id: Option<String>,
    #[serde(default)]
    pub venue_name: String,
    #[serde(default)]
    pub product_type: String,
    #[serde(default)]
    pub option_ids: Vec<String>,
}

impl ScheduleEvent {
    pub fn is_assigned_to(&self, photographer_id: &str) -> bool {
        self.photographer_ids.iter().any(|id| id == photographer_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photographer {
    pub id: PhotographerId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub lead_status: LeadStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub id: String,
    pub customer_id: String,
}

// The camelCase aliases match the unversioned layout the browser front-end
// wrote, see `overlay::upgrade_*`.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: ShootStatus,
    #[serde(alias = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(alias = "updatedBy")]
    pub updated_by: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptanceDecision {
    pub status: AcceptanceStatus,
    #[serde(alias = "decidedAt")]
    pub decided_at: DateTime<Utc>,
    #[serde(alias = "decidedBy")]
    pub decided_by: PhotographerId,
    #[serde(
        default,
        alias = "rejectionReason",
        skip_serializing_if = "Option::is_none"
    )]
    pub rejection_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_wire_names() {
        assert_eq!("on_the_way".parse::<ShootStatus>().unwrap(), ShootStatus::OnTheWay);
        assert_eq!("uploaded".parse::<ShootStatus>().unwrap(), ShootStatus::Uploaded);
        assert!("On The Way".parse::<ShootStatus>().is_err());
        assert!("".parse::<ShootStatus>().is_err());
    }

    #[test]
    fn status_display_matches_serde() {
        for status in ShootStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
    }

    #[test]
    fn lifecycle_moves_forward_one_step() {
        assert!(ShootStatus::Upcoming.can_transition_to(ShootStatus::OnTheWay));
        assert!(ShootStatus::Completed.can_transition_to(ShootStatus::Uploaded));
        assert!(ShootStatus::InProgress.can_transition_to(ShootStatus::InProgress));
        assert!(!ShootStatus::Upcoming.can_transition_to(ShootStatus::Completed));
        assert!(!ShootStatus::Uploaded.can_transition_to(ShootStatus::Upcoming));
        assert_eq!(ShootStatus::Uploaded.next(), None);
    }

    #[test]
    fn only_signed_leads_are_confirmed() {
        assert!(LeadStatus::Contracted.is_confirmed());
        assert!(LeadStatus::Completed.is_confirmed());
        assert!(!LeadStatus::Inquiry.is_confirmed());
        assert!(!LeadStatus::Cancelled.is_confirmed());
    }

    #[test]
    fn legacy_camel_case_entries_decode() {
        let raw = r#"{"status":"rejected","decidedAt":"2026-05-01T10:00:00Z","decidedBy":"p1","rejectionReason":"sick"}"#;
        let decision: AcceptanceDecision = serde_json::from_str(raw).unwrap();
        assert_eq!(decision.status, AcceptanceStatus::Rejected);
        assert_eq!(decision.decided_by, "p1");
        assert_eq!(decision.rejection_reason.as_deref(), Some("sick"));
    }

    #[test]
    fn event_defaults_fill_missing_fields() {
        let raw = r#"{"id":"e1","start":"2026-06-13T09:00:00","end":"2026-06-13T11:00:00"}"#;
        let event: ScheduleEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.status, ShootStatus::Upcoming);
        assert!(event.photographer_ids.is_empty());
        assert!(event.contract_id.is_none());
    }
}
