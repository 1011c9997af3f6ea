//! Double-booking detection between shoots.
//!
//! Two shoots conflict when they share a photographer and their half-open
//! `[start, end)` ranges intersect. Everything here is pure and works on
//! whatever event list it is handed.

use crate::models::{EventId, PhotographerId, ScheduleEvent};
use chrono::NaiveDateTime;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn of(event: &ScheduleEvent) -> Self {
        Self::new(event.start, event.end)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Empty ranges contain no instant, so they overlap nothing. The
    /// comparison alone would report `[10:00, 10:00)` as inside `[09:00, 11:00)`.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.start < other.end
            && other.start < self.end
    }
}

pub fn shares_photographer(a: &ScheduleEvent, b: &ScheduleEvent) -> bool {
    a.photographer_ids
        .iter()
        .any(|id| b.photographer_ids.contains(id))
}

pub fn conflicts_with(a: &ScheduleEvent, b: &ScheduleEvent) -> bool {
    a.id != b.id && shares_photographer(a, b) && TimeRange::of(a).overlaps(&TimeRange::of(b))
}

/// Events in `events` that conflict with `candidate`, in input order. The
/// candidate's own id is skipped so the full schedule can be passed in.
pub fn find_conflicts<'a, I>(candidate: &ScheduleEvent, events: I) -> Vec<&'a ScheduleEvent>
where
    I: IntoIterator<Item = &'a ScheduleEvent>,
{
    events
        .into_iter()
        .filter(|other| conflicts_with(candidate, other))
        .collect()
}

/// Copy of `event` with a proposed edit applied, for checking a change before
/// it is made.
pub fn with_changes(
    event: &ScheduleEvent,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    photographer_ids: Option<Vec<PhotographerId>>,
) -> ScheduleEvent {
    let mut candidate = event.clone();
    if let Some(start) = start {
        candidate.start = start;
    }
    if let Some(end) = end {
        candidate.end = end;
    }
    if let Some(photographer_ids) = photographer_ids {
        candidate.photographer_ids = photographer_ids;
    }
    candidate
}

/// Conflict ids for every event, each list in input order.
pub fn conflict_map(events: &[ScheduleEvent]) -> HashMap<EventId, Vec<EventId>> {
    let mut map: HashMap<EventId, Vec<EventId>> = HashMap::new();
    for (i, a) in events.iter().enumerate() {
        map.entry(a.id.clone()).or_default();
        for b in &events[i + 1..] {
            if conflicts_with(a, b) {
                map.entry(a.id.clone()).or_default().push(b.id.clone());
                map.entry(b.id.clone()).or_default().push(a.id.clone());
            }
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ShootStatus;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 6, 13)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn shoot(id: &str, start: u32, end: u32, photographers: &[&str]) -> ScheduleEvent {
        ScheduleEvent {
            id: id.to_string(),
            start: at(start),
            end: at(end),
            photographer_ids: photographers.iter().map(|p| p.to_string()).collect(),
            status: ShootStatus::Upcoming,
            contract_id: None,
            venue_name: String::new(),
            product_type: "wedding".to_string(),
            option_ids: Vec::new(),
        }
    }

    fn ids(events: Vec<&ScheduleEvent>) -> Vec<&str> {
        events.into_iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn overlapping_shared_photographer_conflicts_both_ways() {
        let a = shoot("a", 9, 11, &["p1"]);
        let b = shoot("b", 10, 12, &["p1"]);
        let events = vec![a.clone(), b.clone()];

        assert_eq!(ids(find_conflicts(&a, &events)), vec!["b"]);
        assert_eq!(ids(find_conflicts(&b, &events)), vec!["a"]);
    }

    #[test]
    fn reassigning_photographer_clears_conflicts() {
        let a = shoot("a", 9, 11, &["p1"]);
        let b = shoot("b", 10, 12, &["p1"]);
        let b = with_changes(&b, None, None, Some(vec!["p2".to_string()]));
        let events = vec![a.clone(), b.clone()];

        assert!(find_conflicts(&a, &events).is_empty());
        assert!(find_conflicts(&b, &events).is_empty());
    }

    #[test]
    fn touching_ranges_do_not_conflict() {
        let a = shoot("a", 9, 11, &["p1"]);
        let b = shoot("b", 11, 13, &["p1"]);
        assert!(!conflicts_with(&a, &b));
        assert!(!conflicts_with(&b, &a));
    }

    #[test]
    fn zero_length_event_never_conflicts() {
        let point = shoot("point", 10, 10, &["p1"]);
        let around = shoot("around", 9, 11, &["p1"]);
        let same = shoot("same", 10, 10, &["p1"]);
        let events = vec![point.clone(), around.clone(), same.clone()];

        assert!(find_conflicts(&point, &events).is_empty());
        assert!(find_conflicts(&around, &events).is_empty());
        assert!(find_conflicts(&same, &events).is_empty());
    }

    #[test]
    fn unassigned_event_never_conflicts() {
        let nobody = shoot("nobody", 9, 12, &[]);
        let other = shoot("other", 9, 12, &["p1"]);
        let also_nobody = shoot("also_nobody", 9, 12, &[]);
        let events = vec![nobody.clone(), other.clone(), also_nobody.clone()];

        assert!(find_conflicts(&nobody, &events).is_empty());
        assert!(find_conflicts(&other, &events).is_empty());
    }

    #[test]
    fn candidate_skips_itself() {
        let a = shoot("a", 9, 11, &["p1"]);
        assert!(find_conflicts(&a, std::slice::from_ref(&a)).is_empty());
    }

    #[test]
    fn one_shared_photographer_is_enough() {
        let a = shoot("a", 9, 11, &["p1", "p2"]);
        let b = shoot("b", 10, 12, &["p3", "p2"]);
        assert!(conflicts_with(&a, &b));
    }

    #[test]
    fn results_follow_input_order() {
        let candidate = shoot("x", 8, 20, &["p1"]);
        let events = vec![
            shoot("c", 15, 16, &["p1"]),
            shoot("a", 9, 10, &["p1"]),
            shoot("b", 12, 13, &["p1"]),
        ];
        assert_eq!(ids(find_conflicts(&candidate, &events)), vec!["c", "a", "b"]);
    }

    #[test]
    fn tentative_move_out_of_the_way() {
        let a = shoot("a", 9, 11, &["p1"]);
        let b = shoot("b", 10, 12, &["p1"]);
        let events = vec![a.clone(), b.clone()];

        let moved = with_changes(&b, Some(at(11)), Some(at(13)), None);
        assert!(find_conflicts(&moved, &events).is_empty());
    }

    #[test]
    fn conflict_map_is_symmetric() {
        let events = vec![
            shoot("a", 9, 11, &["p1"]),
            shoot("b", 10, 12, &["p1"]),
            shoot("c", 10, 12, &["p2"]),
            shoot("d", 8, 14, &["p1", "p2"]),
        ];
        let map = conflict_map(&events);

        assert_eq!(map["a"], vec!["b", "d"]);
        assert_eq!(map["b"], vec!["a", "d"]);
        assert_eq!(map["c"], vec!["d"]);
        assert_eq!(map["d"], vec!["a", "b", "c"]);
        for (id, others) in &map {
            for other in others {
                assert!(map[other].contains(id));
            }
        }
    }
}
