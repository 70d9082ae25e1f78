use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Idle,
    Syncing,
    Success,
    Error,
}

impl Display for SyncStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Syncing => "syncing",
            Self::Success => "success",
            Self::Error => "error",
        })
    }
}

/// Latest sync outcome and the store revision it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub status: SyncStatus,
    pub revision: u64,
    pub message: Option<String>,
}

/// Shared status indicator fed by the worker and foreground pulls.
#[derive(Debug, Clone)]
pub struct SyncStatusBoard {
    tx: Arc<watch::Sender<SyncReport>>,
}

impl Default for SyncStatusBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncStatusBoard {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(SyncReport {
            status: SyncStatus::Idle,
            revision: 0,
            message: None,
        });
        Self { tx: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncReport> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> SyncReport {
        self.tx.borrow().clone()
    }

    /// Records a status for `revision`.
    ///
    /// Returns `false` and keeps the current report when it already refers
    /// to a newer revision.
    pub fn publish(&self, revision: u64, status: SyncStatus, message: Option<String>) -> bool {
        self.tx.send_if_modified(|current| {
            if revision < current.revision {
                return false;
            }
            *current = SyncReport {
                status,
                revision,
                message,
            };
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{SyncStatus, SyncStatusBoard};

    #[test]
    fn older_revision_cannot_overwrite_newer_report() {
        let board = SyncStatusBoard::new();
        assert!(board.publish(5, SyncStatus::Success, None));
        assert!(!board.publish(4, SyncStatus::Error, Some("late failure".to_string())));

        let current = board.current();
        assert_eq!(current.status, SyncStatus::Success);
        assert_eq!(current.revision, 5);
    }

    #[test]
    fn same_revision_moves_from_syncing_to_result() {
        let board = SyncStatusBoard::new();
        board.publish(2, SyncStatus::Syncing, None);
        assert!(board.publish(2, SyncStatus::Error, Some("timeout".to_string())));
        assert_eq!(board.current().message.as_deref(), Some("timeout"));
    }
}
