use chrono::{Duration, NaiveDate, TimeZone, Utc};
use secrecy::{ExposeSecret, SecretString};
use std::cell::Cell;
use zenflow_core::db::open_db;
use zenflow_core::{
    ChangeOrigin, ClassDraft, KeyValueStore, MemberDraft, MemoryKvStore, RepoError, RepoResult,
    ReplaceOutcome, Snapshot, SqliteKvStore, StoreKey, StudioError, StudioStore,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 4, 20).unwrap()
}

fn member(name: &str, credit: u32) -> MemberDraft {
    MemberDraft {
        name: name.to_string(),
        remaining_classes: credit,
        ..MemberDraft::default()
    }
}

fn class_on(title: &str, date: &str, time: &str) -> ClassDraft {
    let mut draft = ClassDraft::new(today());
    draft.title = title.to_string();
    draft.date = date.to_string();
    draft.time = time.to_string();
    draft
}

#[test]
fn sqlite_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("studio.sqlite3");

    let (class_id, member_id) = {
        let conn = open_db(&path).unwrap();
        let mut store = StudioStore::open(SqliteKvStore::try_new(&conn).unwrap()).unwrap();
        let member_id = store.add_member(member("Mei", 4), today()).unwrap().id;
        let class_id = store
            .add_class(class_on("Hatha", "2026-04-20", "07:30"))
            .unwrap()
            .id;
        store.mark_attendance(&class_id, &member_id).unwrap();
        store.add_template("Slow Flow").unwrap();
        assert_eq!(store.last_save_error(), None);
        (class_id, member_id)
    };

    let conn = open_db(&path).unwrap();
    let store = StudioStore::open(SqliteKvStore::try_new(&conn).unwrap()).unwrap();
    assert_eq!(store.member(&member_id).unwrap().remaining_classes, 3);
    assert!(store.class(&class_id).unwrap().is_attending(&member_id));
    assert_eq!(store.snapshot().records.len(), 1);
    assert_eq!(store.snapshot().templates[0].name, "Slow Flow");
}

#[test]
fn persisted_values_use_wire_field_names() {
    let kv = MemoryKvStore::new();
    let mut store = StudioStore::open(&kv).unwrap();
    store.add_member(member("Ana", 10), today()).unwrap();

    let raw = kv.load_raw(StoreKey::Members).unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json[0]["packageType"], "package_10");
    assert_eq!(json[0]["remainingClasses"], 10);
    assert_eq!(json[0]["totalPurchasedClasses"], 10);
    assert_eq!(json[0]["joinDate"], "2026-04-20");
}

#[test]
fn open_detail_view_follows_its_own_class_only() {
    let mut store = StudioStore::open(MemoryKvStore::new()).unwrap();
    let member_id = store.add_member(member("Kai", 5), today()).unwrap().id;
    let open_id = store.add_class(class_on("Vinyasa", "2026-04-20", "18:00")).unwrap().id;
    let other_id = store.add_class(class_on("Yin", "2026-04-20", "20:00")).unwrap().id;

    store.open_class(&open_id).unwrap();
    store.mark_attendance(&other_id, &member_id).unwrap();
    assert!(store.detail().unwrap().attendees.is_empty());

    store.mark_attendance(&open_id, &member_id).unwrap();
    assert!(store.detail().unwrap().is_attending(&member_id));

    store.remove_attendance(&open_id, &member_id).unwrap();
    assert!(!store.detail().unwrap().is_attending(&member_id));

    store.close_class();
    assert!(store.detail().is_none());
    assert_eq!(
        store.open_class("nope").unwrap_err(),
        StudioError::ClassNotFound("nope".to_string())
    );
}

#[test]
fn roster_lists_present_members_first_in_stable_order() {
    let mut store = StudioStore::open(MemoryKvStore::new()).unwrap();
    let a = store.add_member(member("A", 3), today()).unwrap().id;
    let b = store.add_member(member("B", 3), today()).unwrap().id;
    let c = store.add_member(member("C", 3), today()).unwrap().id;
    let class_id = store.add_class(class_on("Flow", "2026-04-20", "09:00")).unwrap().id;

    store.mark_attendance(&class_id, &c).unwrap();

    let roster = store.roster(&class_id).unwrap();
    let order: Vec<(&str, bool)> = roster
        .iter()
        .map(|entry| (entry.member.id.as_str(), entry.present))
        .collect();
    assert_eq!(
        order,
        vec![(c.as_str(), true), (a.as_str(), false), (b.as_str(), false)]
    );
}

#[test]
fn templates_prefill_drafts_and_can_be_removed() {
    let mut store = StudioStore::open(MemoryKvStore::new()).unwrap();
    let template = store.add_template("  Restorative  ").unwrap();
    assert_eq!(template.name, "Restorative");
    assert!(matches!(
        store.add_template("   ").unwrap_err(),
        StudioError::Validation(_)
    ));

    let mut draft = ClassDraft::new(today());
    draft.apply_template(&template);
    assert_eq!(draft.title, "Restorative");
    assert_eq!(draft.max_capacity, 10);

    let removed = store.remove_template(&template.id).unwrap();
    assert_eq!(removed.id, template.id);
    assert!(store.snapshot().templates.is_empty());
    assert_eq!(
        store.remove_template(&template.id).unwrap_err(),
        StudioError::TemplateNotFound(template.id.clone())
    );
}

#[test]
fn search_and_class_ordering() {
    let mut store = StudioStore::open(MemoryKvStore::new()).unwrap();
    let mut draft = member("Chen Yu", 5);
    draft.phone = "0922333444".to_string();
    store.add_member(draft, today()).unwrap();
    store.add_member(member("Sara", 5), today()).unwrap();

    assert_eq!(store.search_members("chen").len(), 1);
    assert_eq!(store.search_members("3334").len(), 1);
    assert_eq!(store.search_members("").len(), 2);

    store.add_class(class_on("Old", "2026-04-01", "10:00")).unwrap();
    store.add_class(class_on("New", "2026-05-01", "10:00")).unwrap();
    let titles: Vec<&str> = store
        .classes_by_date_desc()
        .iter()
        .map(|class| class.title.as_str())
        .collect();
    assert_eq!(titles, vec!["New", "Old"]);
}

#[test]
fn dashboard_and_history_reflect_attendance() {
    let mut store = StudioStore::open(MemoryKvStore::new()).unwrap();
    let member_id = store.add_member(member("Noa", 8), today()).unwrap().id;
    let late = store.add_class(class_on("Late", "2026-04-20", "19:00")).unwrap().id;
    let early = store.add_class(class_on("Early", "2026-04-20", "06:30")).unwrap().id;
    for date in ["2026-04-21", "2026-04-22", "2026-04-23", "2026-04-24"] {
        store.add_class(class_on("Next", date, "10:00")).unwrap();
    }

    let now = Utc.with_ymd_and_hms(2026, 4, 20, 12, 0, 0).unwrap();
    store
        .mark_attendance_at(&early, &member_id, now - Duration::days(8))
        .unwrap();
    store
        .mark_attendance_at(&late, &member_id, now - Duration::hours(1))
        .unwrap();

    let summary = store.dashboard(today(), now);
    assert_eq!(summary.member_count, 1);
    assert_eq!(summary.recent_record_count, 1);
    let today_titles: Vec<&str> = summary
        .today_classes
        .iter()
        .map(|class| class.title.as_str())
        .collect();
    assert_eq!(today_titles, vec!["Early", "Late"]);
    assert_eq!(summary.upcoming_classes.len(), 3);
    assert_eq!(summary.upcoming_classes[0].date, "2026-04-21");
    assert_eq!(summary.expected_attendance, 2);

    assert_eq!(store.today_classes(today()).len(), 2);
    assert_eq!(store.upcoming_classes(today(), 10).len(), 4);
    assert_eq!(store.recent_record_count(now), 1);

    let history = store.records_newest_first();
    assert_eq!(history[0].class_title, Some("Late"));
    assert_eq!(history[1].class_title, Some("Early"));
    assert_eq!(history[0].member_name, Some("Noa"));
}

#[test]
fn replace_snapshot_is_skipped_when_local_edits_landed() {
    let mut store = StudioStore::open(MemoryKvStore::new()).unwrap();
    let started = store.revision();
    store.add_member(member("Local", 1), today()).unwrap();

    let outcome = store.replace_snapshot_if_current(started, Snapshot::default());
    assert_eq!(
        outcome,
        ReplaceOutcome::Stale {
            expected: started,
            current: started + 1
        }
    );
    assert_eq!(store.snapshot().members.len(), 1);

    let current = store.revision();
    let outcome = store.replace_snapshot_if_current(current, Snapshot::default());
    assert_eq!(outcome, ReplaceOutcome::Applied { revision: current + 1 });
    assert!(store.snapshot().members.is_empty());
}

#[test]
fn replace_snapshot_refreshes_or_closes_detail_view() {
    let mut store = StudioStore::open(MemoryKvStore::new()).unwrap();
    let class = store.add_class(class_on("Flow", "2026-04-20", "09:00")).unwrap();
    store.open_class(&class.id).unwrap();

    let mut pulled = store.snapshot().clone();
    pulled.classes[0].attendees.insert("remote-member".to_string());
    store.replace_snapshot(pulled);
    assert!(store.detail().unwrap().is_attending("remote-member"));

    store.replace_snapshot(Snapshot::default());
    assert!(store.detail().is_none());
}

#[test]
fn subscribers_see_each_change_with_its_origin() {
    let mut store = StudioStore::open(MemoryKvStore::new()).unwrap();
    let changes = store.subscribe();
    assert_eq!(changes.borrow().origin, ChangeOrigin::Initial);

    store.add_member(member("Iris", 2), today()).unwrap();
    {
        let change = changes.borrow();
        assert_eq!(change.origin, ChangeOrigin::Local);
        assert_eq!(change.revision, 1);
        assert_eq!(change.snapshot.members.len(), 1);
    }

    store.replace_snapshot(Snapshot::default());
    assert_eq!(changes.borrow().origin, ChangeOrigin::Remote);

    store.reset().unwrap();
    assert_eq!(changes.borrow().origin, ChangeOrigin::Reset);
    assert_eq!(changes.borrow().revision, 3);
}

#[test]
fn settings_round_trip_and_reset_clears_everything() {
    let kv = MemoryKvStore::new();
    let mut store = StudioStore::open(&kv).unwrap();
    store.add_member(member("Bo", 1), today()).unwrap();

    let mut settings = store.settings().unwrap();
    assert!(settings.autosave);
    assert!(!settings.is_configured());
    settings.remote_url = Some("https://script.example.com/exec".to_string());
    settings.shared_secret = Some(SecretString::new("s3cret".to_string()));
    settings.autosave = false;
    store.save_settings(&settings).unwrap();

    let loaded = store.settings().unwrap();
    let remote = loaded.remote().unwrap();
    assert_eq!(remote.url, "https://script.example.com/exec");
    assert_eq!(remote.secret.expose_secret(), "s3cret");
    assert!(!loaded.autosave);

    store.reset().unwrap();
    assert!(kv.is_empty());
    assert_eq!(store.snapshot(), &Snapshot::default());
    assert!(!store.settings().unwrap().is_configured());
}

struct FlakyStore {
    inner: MemoryKvStore,
    fail_saves: Cell<bool>,
}

impl KeyValueStore for FlakyStore {
    fn load_raw(&self, key: StoreKey) -> RepoResult<Option<String>> {
        self.inner.load_raw(key)
    }

    fn save_raw(&self, entries: &[(StoreKey, String)]) -> RepoResult<()> {
        if self.fail_saves.get() {
            return Err(RepoError::NotReady("disk full"));
        }
        self.inner.save_raw(entries)
    }

    fn remove(&self, key: StoreKey) -> RepoResult<()> {
        self.inner.remove(key)
    }

    fn clear(&self) -> RepoResult<()> {
        self.inner.clear()
    }
}

#[test]
fn failed_save_keeps_in_memory_change_and_reports_it() {
    let kv = FlakyStore {
        inner: MemoryKvStore::new(),
        fail_saves: Cell::new(true),
    };
    let mut store = StudioStore::open(&kv).unwrap();

    store.add_member(member("Ren", 3), today()).unwrap();
    assert_eq!(store.snapshot().members.len(), 1);
    assert!(store.last_save_error().unwrap().contains("disk full"));
    assert_eq!(kv.inner.load_raw(StoreKey::Members).unwrap(), None);

    kv.fail_saves.set(false);
    store.add_member(member("Sol", 3), today()).unwrap();
    assert_eq!(store.last_save_error(), None);
    let raw = kv.inner.load_raw(StoreKey::Members).unwrap().unwrap();
    assert!(raw.contains("Sol"));
}

#[test]
fn failed_save_is_retried_by_the_next_successful_commit() {
    let kv = FlakyStore {
        inner: MemoryKvStore::new(),
        fail_saves: Cell::new(false),
    };
    let mut store = StudioStore::open(&kv).unwrap();
    let member_id = store.add_member(member("Yun", 2), today()).unwrap().id;
    let class_id = store
        .add_class(class_on("Flow", "2026-04-20", "09:00"))
        .unwrap()
        .id;

    kv.fail_saves.set(true);
    store.mark_attendance(&class_id, &member_id).unwrap();
    assert!(store.last_save_error().is_some());

    kv.fail_saves.set(false);
    store.top_up(&member_id, 1).unwrap();
    assert_eq!(store.last_save_error(), None);

    let reopened = StudioStore::open(&kv.inner).unwrap();
    assert_eq!(reopened.snapshot(), store.snapshot());
    assert_eq!(reopened.snapshot().records.len(), 1);
    assert!(reopened.class(&class_id).unwrap().is_attending(&member_id));
    let member = reopened.member(&member_id).unwrap();
    assert_eq!(member.remaining_classes, 2);
    assert_eq!(member.total_purchased_classes, 3);
}

#[test]
fn error_stays_until_the_failed_collections_are_written() {
    let kv = FlakyStore {
        inner: MemoryKvStore::new(),
        fail_saves: Cell::new(true),
    };
    let mut store = StudioStore::open(&kv).unwrap();

    store.add_member(member("Ivy", 1), today()).unwrap();
    store.add_template("Yin").unwrap();
    assert!(store.last_save_error().is_some());

    kv.fail_saves.set(false);
    store.add_template("Hatha").unwrap();
    assert_eq!(store.last_save_error(), None);
    let members = kv.inner.load_raw(StoreKey::Members).unwrap().unwrap();
    assert!(members.contains("Ivy"));
}
