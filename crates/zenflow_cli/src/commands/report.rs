use chrono::{Local, Utc};
use zenflow_core::{KeyValueStore, StudioStore};

pub fn records<S: KeyValueStore>(store: &StudioStore<S>, limit: usize) {
    let history = store.records_newest_first();
    if history.is_empty() {
        println!("No attendance records.");
        return;
    }
    for entry in history.into_iter().take(limit) {
        println!(
            "{}  {:<20} {:<20} {:?}",
            entry
                .record
                .timestamp
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M"),
            entry.member_name.unwrap_or("(deleted member)"),
            entry.class_title.unwrap_or("(deleted class)"),
            entry.record.status
        );
    }
}

pub fn dashboard<S: KeyValueStore>(store: &StudioStore<S>) {
    let today = Local::now().date_naive();
    let summary = store.dashboard(today, Utc::now());

    println!("Members: {}", summary.member_count);
    println!("Check-ins in the last 7 days: {}", summary.recent_record_count);
    println!(
        "Today: {} classes, {} checked in",
        summary.today_classes.len(),
        summary.expected_attendance
    );
    for class in &summary.today_classes {
        println!(
            "  {} {:<20} {}/{}",
            class.time,
            class.title,
            class.headcount(),
            class.max_capacity
        );
    }
    if !summary.upcoming_classes.is_empty() {
        println!("Upcoming:");
        for class in &summary.upcoming_classes {
            println!("  {} {} {}", class.date, class.time, class.title);
        }
    }
}
