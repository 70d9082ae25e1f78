//! Read-only projections over a snapshot for list and dashboard views.

use crate::model::attendance::AttendanceRecord;
use crate::model::class::StudioClass;
use crate::model::member::Member;
use crate::model::schedule::normalize_date;
use crate::model::snapshot::Snapshot;
use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Window used by the dashboard "recent check-ins" counter.
pub const RECENT_RECORD_WINDOW_DAYS: i64 = 7;
/// Upcoming classes shown on the dashboard.
pub const DASHBOARD_UPCOMING_LIMIT: usize = 3;

/// Attendance record joined with display names. Names are `None` for
/// records whose class or member no longer resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry<'a> {
    pub record: &'a AttendanceRecord,
    pub class_title: Option<&'a str>,
    pub member_name: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary<'a> {
    pub member_count: usize,
    pub recent_record_count: usize,
    pub today_classes: Vec<&'a StudioClass>,
    pub upcoming_classes: Vec<&'a StudioClass>,
    /// Sum of attendee counts over today's classes.
    pub expected_attendance: usize,
}

fn date_key(today: NaiveDate) -> String {
    today.format("%Y-%m-%d").to_string()
}

pub fn search_members<'a>(snapshot: &'a Snapshot, query: &str) -> Vec<&'a Member> {
    snapshot
        .members
        .iter()
        .filter(|member| member.matches_query(query))
        .collect()
}

/// Class list order: latest date first.
pub fn classes_by_date_desc(snapshot: &Snapshot) -> Vec<&StudioClass> {
    let mut classes: Vec<&StudioClass> = snapshot.classes.iter().collect();
    classes.sort_by(|a, b| normalize_date(&b.date).cmp(&normalize_date(&a.date)));
    classes
}

/// Classes held on `today`, earliest slot first.
pub fn today_classes(snapshot: &Snapshot, today: NaiveDate) -> Vec<&StudioClass> {
    let today = date_key(today);
    let mut classes: Vec<&StudioClass> = snapshot
        .classes
        .iter()
        .filter(|class| normalize_date(&class.date) == today)
        .collect();
    classes.sort_by(|a, b| a.time.cmp(&b.time));
    classes
}

/// Classes after `today`, soonest first, capped at `limit`.
pub fn upcoming_classes(snapshot: &Snapshot, today: NaiveDate, limit: usize) -> Vec<&StudioClass> {
    let today = date_key(today);
    let mut classes: Vec<(String, &StudioClass)> = snapshot
        .classes
        .iter()
        .map(|class| (normalize_date(&class.date), class))
        .filter(|(date, _)| *date > today)
        .collect();
    classes.sort_by(|a, b| a.0.cmp(&b.0));
    classes
        .into_iter()
        .take(limit)
        .map(|(_, class)| class)
        .collect()
}

/// Records stamped less than seven days before `now`.
pub fn recent_record_count(snapshot: &Snapshot, now: DateTime<Utc>) -> usize {
    let window = Duration::days(RECENT_RECORD_WINDOW_DAYS);
    snapshot
        .records
        .iter()
        .filter(|record| now - record.timestamp < window)
        .count()
}

pub fn history_newest_first(snapshot: &Snapshot) -> Vec<HistoryEntry<'_>> {
    let mut records: Vec<&AttendanceRecord> = snapshot.records.iter().collect();
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    records
        .into_iter()
        .map(|record| HistoryEntry {
            record,
            class_title: snapshot
                .class(&record.class_id)
                .map(|class| class.title.as_str()),
            member_name: snapshot
                .member(&record.member_id)
                .map(|member| member.name.as_str()),
        })
        .collect()
}

pub fn dashboard(snapshot: &Snapshot, today: NaiveDate, now: DateTime<Utc>) -> DashboardSummary<'_> {
    let today_classes = today_classes(snapshot, today);
    let expected_attendance = today_classes.iter().map(|class| class.headcount()).sum();
    DashboardSummary {
        member_count: snapshot.members.len(),
        recent_record_count: recent_record_count(snapshot, now),
        upcoming_classes: upcoming_classes(snapshot, today, DASHBOARD_UPCOMING_LIMIT),
        today_classes,
        expected_attendance,
    }
}

#[cfg(test)]
mod tests {
    use super::{classes_by_date_desc, dashboard, recent_record_count, upcoming_classes};
    use crate::model::attendance::AttendanceRecord;
    use crate::model::class::{ClassStatus, StudioClass};
    use crate::model::snapshot::Snapshot;
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use std::collections::BTreeSet;

    fn class(id: &str, date: &str, time: &str, attendees: &[&str]) -> StudioClass {
        StudioClass {
            id: id.to_string(),
            title: id.to_string(),
            date: date.to_string(),
            time: time.to_string(),
            location: String::new(),
            max_capacity: 10,
            attendees: attendees.iter().map(|id| id.to_string()).collect::<BTreeSet<_>>(),
            instructor: "Teacher".to_string(),
            status: ClassStatus::Upcoming,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[test]
    fn dashboard_splits_today_and_upcoming() {
        let snapshot = Snapshot {
            classes: vec![
                class("evening", "2026-10-18", "19:00", &["m1", "m2"]),
                class("morning", "2026-10-18T00:00:00", "07:00", &["m3"]),
                class("past", "2026-10-01", "07:00", &[]),
                class("d4", "2026-10-22", "07:00", &[]),
                class("d1", "2026-10-19", "07:00", &[]),
                class("d3", "2026-10-21", "07:00", &[]),
                class("d2", "2026-10-20", "07:00", &[]),
            ],
            ..Snapshot::default()
        };
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap();
        let summary = dashboard(&snapshot, today(), now);

        let today_ids: Vec<&str> = summary.today_classes.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(today_ids, vec!["morning", "evening"]);
        assert_eq!(summary.expected_attendance, 3);

        let upcoming_ids: Vec<&str> = summary
            .upcoming_classes
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(upcoming_ids, vec!["d1", "d2", "d3"]);
    }

    #[test]
    fn upcoming_respects_limit_zero() {
        let snapshot = Snapshot {
            classes: vec![class("d1", "2026-10-19", "07:00", &[])],
            ..Snapshot::default()
        };
        assert!(upcoming_classes(&snapshot, today(), 0).is_empty());
    }

    #[test]
    fn recent_count_uses_seven_day_window() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let snapshot = Snapshot {
            records: vec![
                AttendanceRecord::present("c", "m", now - Duration::days(1)),
                AttendanceRecord::present("c", "m", now - Duration::days(6)),
                AttendanceRecord::present("c", "m", now - Duration::days(7)),
                AttendanceRecord::present("c", "m", now - Duration::days(30)),
            ],
            ..Snapshot::default()
        };
        assert_eq!(recent_record_count(&snapshot, now), 2);
    }

    #[test]
    fn class_list_is_latest_first() {
        let snapshot = Snapshot {
            classes: vec![
                class("a", "2026-01-01", "07:00", &[]),
                class("c", "2026-03-01", "07:00", &[]),
                class("b", "2026-02-01", "07:00", &[]),
            ],
            ..Snapshot::default()
        };
        let ids: Vec<&str> = classes_by_date_desc(&snapshot)
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }
}
