use super::queries::{self, DashboardSummary, HistoryEntry};
use crate::ledger::{self, CreditBalance, LedgerError, MarkOutcome, RemoveOutcome, RosterEntry};
use crate::model::class::{ClassDraft, StudioClass};
use crate::model::member::{Member, MemberDraft};
use crate::model::snapshot::Snapshot;
use crate::model::template::ClassTemplate;
use crate::model::ValidationError;
use crate::repo::kv_store::{encode_json, load_json, KeyValueStore, RepoResult, StoreKey};
use crate::repo::settings::SyncSettings;
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, error, info};
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;

const COLLECTION_KEYS: [StoreKey; 4] = [
    StoreKey::Members,
    StoreKey::Classes,
    StoreKey::Records,
    StoreKey::Templates,
];

pub type StudioResult<T> = Result<T, StudioError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StudioError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("class not found: {0}")]
    ClassNotFound(String),
    #[error("template not found: {0}")]
    TemplateNotFound(String),
}

/// Where a published change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// State loaded at open; nothing changed yet.
    Initial,
    /// Edit made in this session; worth pushing.
    Local,
    /// Snapshot pulled from the remote endpoint.
    Remote,
    /// Local data wiped.
    Reset,
}

/// Value carried on the change channel.
#[derive(Debug, Clone)]
pub struct StoreChange {
    pub revision: u64,
    pub origin: ChangeOrigin,
    pub snapshot: Arc<Snapshot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceOutcome {
    Applied { revision: u64 },
    /// Local edits landed after the pull started; the pulled data was dropped.
    Stale { expected: u64, current: u64 },
}

/// The studio store. Construct once per process and pass it by `&mut`.
pub struct StudioStore<S: KeyValueStore> {
    kv: S,
    snapshot: Snapshot,
    detail: Option<StudioClass>,
    revision: u64,
    changes: watch::Sender<StoreChange>,
    /// Collections changed in memory but not yet written.
    dirty: BTreeSet<StoreKey>,
    last_save_error: Option<String>,
}

impl<S: KeyValueStore> StudioStore<S> {
    /// Loads every collection from `kv`. Missing keys load as empty.
    pub fn open(kv: S) -> RepoResult<Self> {
        let snapshot = Snapshot {
            members: load_json(&kv, StoreKey::Members)?,
            classes: load_json(&kv, StoreKey::Classes)?,
            records: load_json(&kv, StoreKey::Records)?,
            templates: load_json(&kv, StoreKey::Templates)?,
        };
        info!(
            "event=store_open module=store status=ok members={} classes={} records={} templates={}",
            snapshot.members.len(),
            snapshot.classes.len(),
            snapshot.records.len(),
            snapshot.templates.len()
        );

        let (changes, _) = watch::channel(StoreChange {
            revision: 0,
            origin: ChangeOrigin::Initial,
            snapshot: Arc::new(snapshot.clone()),
        });

        Ok(Self {
            kv,
            snapshot,
            detail: None,
            revision: 0,
            changes,
            dirty: BTreeSet::new(),
            last_save_error: None,
        })
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Subscribes to post-change notifications.
    pub fn subscribe(&self) -> watch::Receiver<StoreChange> {
        self.changes.subscribe()
    }

    /// Message of the most recent failed save, cleared by the next good one.
    pub fn last_save_error(&self) -> Option<&str> {
        self.last_save_error.as_deref()
    }

    pub fn member(&self, id: &str) -> Option<&Member> {
        self.snapshot.member(id)
    }

    pub fn class(&self, id: &str) -> Option<&StudioClass> {
        self.snapshot.class(id)
    }

    pub fn add_member(&mut self, draft: MemberDraft, today: NaiveDate) -> StudioResult<Member> {
        let member = Member::from_draft(draft, today)?;
        self.snapshot.members.push(member.clone());
        info!(
            "event=member_add module=store status=ok member_id={} credit={}",
            member.id, member.remaining_classes
        );
        self.commit(&[StoreKey::Members], ChangeOrigin::Local);
        Ok(member)
    }

    pub fn add_class(&mut self, draft: ClassDraft) -> StudioResult<StudioClass> {
        let class = StudioClass::from_draft(draft)?;
        self.snapshot.classes.push(class.clone());
        info!(
            "event=class_add module=store status=ok class_id={} date={}",
            class.id, class.date
        );
        self.commit(&[StoreKey::Classes], ChangeOrigin::Local);
        Ok(class)
    }

    pub fn add_template(&mut self, name: &str) -> StudioResult<ClassTemplate> {
        let template = ClassTemplate::new(name)?;
        self.snapshot.templates.push(template.clone());
        self.commit(&[StoreKey::Templates], ChangeOrigin::Local);
        Ok(template)
    }

    pub fn remove_template(&mut self, id: &str) -> StudioResult<ClassTemplate> {
        let index = self
            .snapshot
            .templates
            .iter()
            .position(|template| template.id == id)
            .ok_or_else(|| StudioError::TemplateNotFound(id.to_string()))?;
        let removed = self.snapshot.templates.remove(index);
        self.commit(&[StoreKey::Templates], ChangeOrigin::Local);
        Ok(removed)
    }

    pub fn top_up(&mut self, member_id: &str, amount: u32) -> StudioResult<CreditBalance> {
        let balance = ledger::top_up(&mut self.snapshot, member_id, amount)?;
        info!(
            "event=member_top_up module=store status=ok member_id={} amount={} remaining={} total={}",
            member_id, amount, balance.remaining_classes, balance.total_purchased_classes
        );
        self.commit(&[StoreKey::Members], ChangeOrigin::Local);
        Ok(balance)
    }

    pub fn mark_attendance(&mut self, class_id: &str, member_id: &str) -> StudioResult<MarkOutcome> {
        self.mark_attendance_at(class_id, member_id, Utc::now())
    }

    /// Same as [`Self::mark_attendance`] with an explicit check-in time.
    pub fn mark_attendance_at(
        &mut self,
        class_id: &str,
        member_id: &str,
        at: DateTime<Utc>,
    ) -> StudioResult<MarkOutcome> {
        let outcome = ledger::mark_attendance(
            &mut self.snapshot,
            self.detail.as_mut(),
            class_id,
            member_id,
            at,
        )?;
        info!(
            "event=attendance_mark module=store status=ok class_id={} member_id={} charged={} remaining={}",
            class_id, member_id, outcome.credit_charged, outcome.remaining_classes
        );
        self.commit(&COLLECTION_KEYS[..3], ChangeOrigin::Local);
        Ok(outcome)
    }

    pub fn remove_attendance(
        &mut self,
        class_id: &str,
        member_id: &str,
    ) -> StudioResult<RemoveOutcome> {
        let outcome = ledger::remove_attendance(
            &mut self.snapshot,
            self.detail.as_mut(),
            class_id,
            member_id,
        )?;
        info!(
            "event=attendance_remove module=store status=ok class_id={} member_id={} removed={} was_present={} remaining={}",
            class_id,
            member_id,
            outcome.records_removed,
            outcome.was_present,
            outcome.remaining_classes
        );
        self.commit(&COLLECTION_KEYS[..3], ChangeOrigin::Local);
        Ok(outcome)
    }

    /// Opens the detail view on one class. The cached copy then follows
    /// every attendance change made through this store.
    pub fn open_class(&mut self, class_id: &str) -> StudioResult<&StudioClass> {
        let class = self
            .snapshot
            .class(class_id)
            .cloned()
            .ok_or_else(|| StudioError::ClassNotFound(class_id.to_string()))?;
        let view = self.detail.insert(class);
        Ok(&*view)
    }

    pub fn close_class(&mut self) {
        self.detail = None;
    }

    pub fn detail(&self) -> Option<&StudioClass> {
        self.detail.as_ref()
    }

    /// Check-in list for one class, present members first.
    pub fn roster(&self, class_id: &str) -> StudioResult<Vec<RosterEntry<'_>>> {
        let class = self
            .snapshot
            .class(class_id)
            .ok_or_else(|| StudioError::ClassNotFound(class_id.to_string()))?;
        Ok(ledger::roster(&self.snapshot, class))
    }

    pub fn search_members(&self, query: &str) -> Vec<&Member> {
        queries::search_members(&self.snapshot, query)
    }

    pub fn classes_by_date_desc(&self) -> Vec<&StudioClass> {
        queries::classes_by_date_desc(&self.snapshot)
    }

    pub fn today_classes(&self, today: NaiveDate) -> Vec<&StudioClass> {
        queries::today_classes(&self.snapshot, today)
    }

    pub fn upcoming_classes(&self, today: NaiveDate, limit: usize) -> Vec<&StudioClass> {
        queries::upcoming_classes(&self.snapshot, today, limit)
    }

    pub fn recent_record_count(&self, now: DateTime<Utc>) -> usize {
        queries::recent_record_count(&self.snapshot, now)
    }

    /// Attendance history with class title and member name resolved.
    pub fn records_newest_first(&self) -> Vec<HistoryEntry<'_>> {
        queries::history_newest_first(&self.snapshot)
    }

    pub fn dashboard(&self, today: NaiveDate, now: DateTime<Utc>) -> DashboardSummary<'_> {
        queries::dashboard(&self.snapshot, today, now)
    }

    /// Replaces every collection with `snapshot` (last pull wins).
    pub fn replace_snapshot(&mut self, snapshot: Snapshot) -> u64 {
        self.snapshot = snapshot;
        self.detail = self
            .detail
            .take()
            .and_then(|open| self.snapshot.class(&open.id).cloned());
        info!(
            "event=store_replace module=store status=ok members={} classes={} records={} templates={}",
            self.snapshot.members.len(),
            self.snapshot.classes.len(),
            self.snapshot.records.len(),
            self.snapshot.templates.len()
        );
        self.commit(&COLLECTION_KEYS, ChangeOrigin::Remote);
        self.revision
    }

    /// Replaces the snapshot only if no change landed since `expected_revision`.
    pub fn replace_snapshot_if_current(
        &mut self,
        expected_revision: u64,
        snapshot: Snapshot,
    ) -> ReplaceOutcome {
        if self.revision != expected_revision {
            info!(
                "event=store_replace module=store status=skipped reason=stale expected_revision={} current_revision={}",
                expected_revision, self.revision
            );
            return ReplaceOutcome::Stale {
                expected: expected_revision,
                current: self.revision,
            };
        }
        let revision = self.replace_snapshot(snapshot);
        ReplaceOutcome::Applied { revision }
    }

    pub fn settings(&self) -> RepoResult<SyncSettings> {
        SyncSettings::load(&self.kv)
    }

    pub fn save_settings(&self, settings: &SyncSettings) -> RepoResult<()> {
        settings.save(&self.kv)?;
        info!(
            "event=settings_save module=store status=ok configured={} autosave={}",
            settings.is_configured(),
            settings.autosave
        );
        Ok(())
    }

    /// Wipes stored data and settings, then empties the in-memory state.
    pub fn reset(&mut self) -> RepoResult<()> {
        self.kv.clear()?;
        self.snapshot = Snapshot::default();
        self.detail = None;
        self.revision += 1;
        self.dirty.clear();
        self.last_save_error = None;
        self.publish(ChangeOrigin::Reset);
        info!("event=store_reset module=store status=ok revision={}", self.revision);
        Ok(())
    }

    /// Writes every collection still dirty, including ones left over from
    /// an earlier failed save, so linked collections land on disk together.
    fn commit(&mut self, keys: &[StoreKey], origin: ChangeOrigin) {
        self.revision += 1;
        self.dirty.extend(keys.iter().copied());
        match self.persist_dirty() {
            Ok(()) => {
                debug!(
                    "event=store_save module=store status=ok revision={} keys={}",
                    self.revision,
                    self.dirty.len()
                );
                self.dirty.clear();
                self.last_save_error = None;
            }
            Err(err) => {
                error!(
                    "event=store_save module=store status=error revision={} pending_keys={} error={}",
                    self.revision,
                    self.dirty.len(),
                    err
                );
                self.last_save_error = Some(err.to_string());
            }
        }
        self.publish(origin);
    }

    fn persist_dirty(&self) -> RepoResult<()> {
        let mut entries = Vec::with_capacity(self.dirty.len());
        for key in &self.dirty {
            let entry = match key {
                StoreKey::Members => encode_json(*key, &self.snapshot.members)?,
                StoreKey::Classes => encode_json(*key, &self.snapshot.classes)?,
                StoreKey::Records => encode_json(*key, &self.snapshot.records)?,
                StoreKey::Templates => encode_json(*key, &self.snapshot.templates)?,
                StoreKey::RemoteUrl | StoreKey::SharedSecret | StoreKey::Autosave => continue,
            };
            entries.push(entry);
        }
        self.kv.save_raw(&entries)
    }

    fn publish(&self, origin: ChangeOrigin) {
        self.changes.send_replace(StoreChange {
            revision: self.revision,
            origin,
            snapshot: Arc::new(self.snapshot.clone()),
        });
    }
}
