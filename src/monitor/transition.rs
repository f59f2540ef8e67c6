//! Merging resolver output into stored records and diffing the result.

use chrono::{DateTime, Utc};

use crate::models::{SiteRecord, SiteStatus};
use crate::notifier::{MonitorEvent, StatusTransition};

/// Combines the stored record (if any) with a freshly resolved one.
///
/// The resolver owns status, check time and latency. The working URL only
/// moves when the new status is `WORKING`; otherwise the last known URL is
/// kept. `id` and `is_active` survive, as do pinned operator notes; unpinned
/// notes are replaced by the latest resolver diagnostic. `last_updated`
/// advances exactly when the URL changes.
pub fn merge_resolution(
    previous: Option<&SiteRecord>,
    resolved: SiteRecord,
    now: DateTime<Utc>,
) -> SiteRecord {
    let previous_url = previous.and_then(|p| p.current_working_url.clone());
    let current_working_url = if resolved.status.is_working() {
        resolved.current_working_url.clone().or_else(|| previous_url.clone())
    } else {
        previous_url.clone()
    };

    let last_updated = if current_working_url != previous_url {
        Some(now)
    } else {
        previous.and_then(|p| p.last_updated)
    };

    let pinned = previous.filter(|p| p.notes_pinned && p.notes.is_some());
    let (notes, notes_pinned) = match pinned {
        Some(p) => (p.notes.clone(), true),
        None => (resolved.notes, false),
    };

    SiteRecord {
        id: previous.and_then(|p| p.id),
        name: previous
            .map(|p| p.name.clone())
            .unwrap_or_else(|| resolved.name.clone()),
        current_working_url,
        status: resolved.status,
        last_checked: resolved.last_checked.or(Some(now)),
        last_updated,
        response_time_ms: resolved.response_time_ms,
        is_active: previous.map(|p| p.is_active).unwrap_or(true),
        notes,
        notes_pinned,
    }
}

/// The event describing the change from `previous` to `current`, if any.
///
/// A record seen for the first time produces no event.
pub fn detect_transition(
    previous: Option<&SiteRecord>,
    current: &SiteRecord,
    at: DateTime<Utc>,
) -> Option<MonitorEvent> {
    let previous = previous?;
    let transition = StatusTransition {
        site_name: current.name.clone(),
        from: previous.status,
        to: current.status,
        old_url: previous.current_working_url.clone(),
        new_url: current.current_working_url.clone(),
        at,
    };

    match (previous.status.is_working(), current.status.is_working()) {
        (true, false) => Some(MonitorEvent::SiteDown(transition)),
        (false, true) => Some(MonitorEvent::SiteRecovered(transition)),
        (true, true) if previous.current_working_url != current.current_working_url => {
            Some(MonitorEvent::DomainChanged(transition))
        }
        _ => None,
    }
}

/// Checks the invariant every persisted record must satisfy.
pub fn is_consistent(record: &SiteRecord) -> bool {
    record.status != SiteStatus::Working || record.current_working_url.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn stored(status: SiteStatus, url: Option<&str>) -> SiteRecord {
        SiteRecord {
            id: Some(3),
            current_working_url: url.map(str::to_string),
            status,
            last_checked: Some(t(0)),
            last_updated: Some(t(0)),
            response_time_ms: Some(100),
            ..SiteRecord::detached("moviezap")
        }
    }

    fn resolved(status: SiteStatus, url: Option<&str>) -> SiteRecord {
        SiteRecord {
            current_working_url: url.map(str::to_string),
            status,
            last_checked: Some(t(10)),
            response_time_ms: url.map(|_| 250),
            notes: (status != SiteStatus::Working).then(|| "diagnostic".to_string()),
            ..SiteRecord::detached("moviezap")
        }
    }

    #[test]
    fn test_new_record_without_previous() {
        let merged = merge_resolution(
            None,
            resolved(SiteStatus::Working, Some("https://moviezap.in/")),
            t(10),
        );
        assert_eq!(merged.id, None);
        assert!(merged.is_active);
        assert_eq!(merged.last_updated, Some(t(10)));

        let merged = merge_resolution(None, resolved(SiteStatus::NotFound, None), t(10));
        assert_eq!(merged.last_updated, None);
        assert_eq!(merged.notes.as_deref(), Some("diagnostic"));
    }

    #[test]
    fn test_down_keeps_last_known_url() {
        let previous = stored(SiteStatus::Working, Some("https://moviezap.in/"));
        let merged = merge_resolution(Some(&previous), resolved(SiteStatus::Down, None), t(10));

        assert_eq!(merged.id, Some(3));
        assert_eq!(merged.status, SiteStatus::Down);
        assert_eq!(merged.current_working_url.as_deref(), Some("https://moviezap.in/"));
        assert_eq!(merged.last_updated, Some(t(0)));
        assert_eq!(merged.last_checked, Some(t(10)));
        assert_eq!(merged.response_time_ms, None);
    }

    #[test]
    fn test_url_change_advances_last_updated() {
        let previous = stored(SiteStatus::Working, Some("https://moviezap.in/"));
        let same = merge_resolution(
            Some(&previous),
            resolved(SiteStatus::Working, Some("https://moviezap.in/")),
            t(10),
        );
        assert_eq!(same.last_updated, Some(t(0)));

        let moved = merge_resolution(
            Some(&previous),
            resolved(SiteStatus::Working, Some("https://moviezap.org/")),
            t(10),
        );
        assert_eq!(moved.last_updated, Some(t(10)));
    }

    #[test]
    fn test_operator_fields_survive() {
        let mut previous = stored(SiteStatus::Working, Some("https://moviezap.in/"));
        previous.is_active = false;
        previous.notes = Some("blocked in region".to_string());
        previous.notes_pinned = true;

        let merged = merge_resolution(Some(&previous), resolved(SiteStatus::Error, None), t(10));
        assert!(!merged.is_active);
        assert_eq!(merged.notes.as_deref(), Some("blocked in region"));
        assert!(merged.notes_pinned);
    }

    #[test]
    fn test_diagnostic_notes_follow_latest_resolution() {
        let mut previous = stored(SiteStatus::Error, None);
        previous.notes = Some("Search failed: HTTP 502".to_string());

        let not_found = merge_resolution(Some(&previous), resolved(SiteStatus::NotFound, None), t(10));
        assert_eq!(not_found.notes.as_deref(), Some("diagnostic"));
        assert!(!not_found.notes_pinned);

        let working = merge_resolution(
            Some(&not_found),
            resolved(SiteStatus::Working, Some("https://moviezap.in/")),
            t(20),
        );
        assert_eq!(working.notes, None);
    }

    #[test]
    fn test_transition_kinds() {
        let working = stored(SiteStatus::Working, Some("https://moviezap.in/"));
        let down = stored(SiteStatus::Down, Some("https://moviezap.in/"));
        let moved = stored(SiteStatus::Working, Some("https://moviezap.org/"));

        assert!(matches!(
            detect_transition(Some(&working), &down, t(1)),
            Some(MonitorEvent::SiteDown(_))
        ));
        match detect_transition(Some(&down), &moved, t(1)) {
            Some(MonitorEvent::SiteRecovered(tr)) => {
                assert_eq!(tr.new_url.as_deref(), Some("https://moviezap.org/"));
                assert_eq!(tr.from, SiteStatus::Down);
            }
            other => panic!("expected recovery, got {other:?}"),
        }
        match detect_transition(Some(&working), &moved, t(1)) {
            Some(MonitorEvent::DomainChanged(tr)) => {
                assert_eq!(tr.old_url.as_deref(), Some("https://moviezap.in/"));
                assert_eq!(tr.new_url.as_deref(), Some("https://moviezap.org/"));
            }
            other => panic!("expected domain change, got {other:?}"),
        }
    }

    #[test]
    fn test_no_transition_cases() {
        let working = stored(SiteStatus::Working, Some("https://moviezap.in/"));
        let error = stored(SiteStatus::Error, None);
        let not_found = stored(SiteStatus::NotFound, None);

        assert!(detect_transition(None, &working, t(1)).is_none());
        assert!(detect_transition(Some(&working), &working, t(1)).is_none());
        assert!(detect_transition(Some(&error), &error, t(1)).is_none());
        assert!(detect_transition(Some(&error), &not_found, t(1)).is_none());
    }

    #[test]
    fn test_consistency_check() {
        assert!(is_consistent(&stored(SiteStatus::Working, Some("https://moviezap.in/"))));
        assert!(!is_consistent(&stored(SiteStatus::Working, None)));
        assert!(is_consistent(&stored(SiteStatus::Down, None)));
    }
}
