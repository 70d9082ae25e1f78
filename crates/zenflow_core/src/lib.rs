//! Core domain logic for ZenFlow, a small yoga-studio manager.
//! Members, classes, attendance and templates live here, along with the
//! SQLite-backed store and the spreadsheet backup sync.

pub mod db;
pub mod ledger;
pub mod logging;
pub mod model;
pub mod repo;
pub mod store;
pub mod sync;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use ledger::{CreditBalance, LedgerError, MarkOutcome, RemoveOutcome, RosterEntry};
pub use logging::{
    default_log_level, init_logging, init_stderr_logging, logging_status, LogTarget, LoggingError,
};
pub use model::attendance::{AttendanceRecord, AttendanceStatus};
pub use model::class::{ClassDraft, ClassStatus, StudioClass};
pub use model::member::{Member, MemberDraft, PackageType};
pub use model::snapshot::Snapshot;
pub use model::template::ClassTemplate;
pub use model::ValidationError;
pub use repo::kv_store::{KeyValueStore, MemoryKvStore, RepoError, RepoResult, SqliteKvStore, StoreKey};
pub use repo::settings::SyncSettings;
pub use store::queries::{DashboardSummary, HistoryEntry};
pub use store::{ChangeOrigin, ReplaceOutcome, StoreChange, StudioError, StudioResult, StudioStore};
pub use sync::{
    HttpSyncTransport, SyncError, SyncReport, SyncStatus, SyncStatusBoard, SyncTransport,
    SyncWorker, TransportError,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
