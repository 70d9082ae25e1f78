//! Debounced background push of local edits.
//!
//! # Responsibility
//! - Coalesce bursts of local changes into one push after a quiet period.
//! - Flush whatever is still pending when shut down.
//!
//! # Invariants
//! - Remote and reset changes are never pushed and drop any pending push,
//!   since the snapshot they superseded is no longer current.
//! - At most one push is in flight; pushes run in revision order.

use super::status::{SyncStatus, SyncStatusBoard};
use super::transport::SyncTransport;
use crate::store::{ChangeOrigin, StoreChange};
use log::{debug, error, info};
use secrecy::SecretString;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1500);

/// Placeholder deadline used while nothing is pending; the branch is disabled then.
const IDLE_WAKE: Duration = Duration::from_secs(3600);

pub struct SyncWorker<T: SyncTransport> {
    transport: Arc<T>,
    secret: SecretString,
    changes: watch::Receiver<StoreChange>,
    board: SyncStatusBoard,
    shutdown: CancellationToken,
    debounce: Duration,
    baseline: u64,
}

impl<T: SyncTransport + 'static> SyncWorker<T> {
    pub fn new(
        transport: Arc<T>,
        secret: SecretString,
        changes: watch::Receiver<StoreChange>,
        board: SyncStatusBoard,
        shutdown: CancellationToken,
    ) -> Self {
        // Revision the caller already has; anything newer is a candidate push.
        let baseline = changes.borrow().revision;
        Self {
            transport,
            secret,
            changes,
            board,
            shutdown,
            debounce: DEFAULT_DEBOUNCE,
            baseline,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(mut self) {
        let mut last_seen = self.baseline;
        let mut pending: Option<StoreChange> = None;
        let mut deadline: Option<Instant> = None;

        info!(
            "event=sync_worker module=sync status=start debounce_ms={} revision={}",
            self.debounce.as_millis(),
            last_seen
        );

        loop {
            let wake_at = deadline.unwrap_or_else(|| Instant::now() + IDLE_WAKE);

            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    self.absorb_unseen(&mut last_seen, &mut pending);
                    if let Some(change) = pending.take() {
                        self.push(change).await;
                    }
                    break;
                }
                _ = tokio::time::sleep_until(wake_at), if deadline.is_some() => {
                    deadline = None;
                    if let Some(change) = pending.take() {
                        self.push(change).await;
                    }
                }
                changed = self.changes.changed() => {
                    if changed.is_err() {
                        // Store dropped; flush what it left behind.
                        self.absorb_unseen(&mut last_seen, &mut pending);
                        if let Some(change) = pending.take() {
                            self.push(change).await;
                        }
                        break;
                    }
                    let change = self.changes.borrow_and_update().clone();
                    last_seen = change.revision;
                    if Self::accept(change, &mut pending) {
                        deadline = Some(Instant::now() + self.debounce);
                    } else {
                        deadline = None;
                    }
                }
            }
        }

        info!("event=sync_worker module=sync status=stop revision={last_seen}");
    }

    /// Picks up a change published after the last `changed()` wake-up.
    fn absorb_unseen(&mut self, last_seen: &mut u64, pending: &mut Option<StoreChange>) {
        let latest = self.changes.borrow_and_update().clone();
        if latest.revision > *last_seen {
            *last_seen = latest.revision;
            Self::accept(latest, pending);
        }
    }

    /// Returns `true` when the change is queued for push.
    fn accept(change: StoreChange, pending: &mut Option<StoreChange>) -> bool {
        if change.origin == ChangeOrigin::Local {
            *pending = Some(change);
            return true;
        }
        debug!(
            "event=sync_worker module=sync status=skipped origin={:?} revision={} dropped_pending={}",
            change.origin,
            change.revision,
            pending.is_some()
        );
        *pending = None;
        false
    }

    async fn push(&self, change: StoreChange) {
        let revision = change.revision;
        self.board.publish(revision, SyncStatus::Syncing, None);
        match self.transport.push(&self.secret, &change.snapshot).await {
            Ok(()) => {
                info!("event=sync_push module=sync status=ok revision={revision}");
                self.board.publish(revision, SyncStatus::Success, None);
            }
            Err(err) => {
                error!("event=sync_push module=sync status=error revision={revision} error={err}");
                self.board
                    .publish(revision, SyncStatus::Error, Some(err.to_string()));
            }
        }
    }
}
