//! Remote backup: transport, status reporting and the debounced push worker.
//!
//! ```text
//! StudioStore ──watch(StoreChange)──▶ SyncWorker ──push──▶ SyncTransport
//!      ▲                                   │
//!      └──── pull_into_store ◀── pull ─────┘ (foreground)
//!                      SyncStatusBoard ◀── both report here
//! ```
//!
//! # Invariants
//! - Only locally originated changes are pushed.
//! - A report for an older revision never replaces a newer one.
//! - Transport failures surface as `SyncStatus::Error`; they never touch the
//!   local state that triggered them.

mod http;
mod service;
mod status;
mod transport;
mod worker;

pub use http::{HttpSyncTransport, DEFAULT_HTTP_TIMEOUT};
pub use service::{connect, pull_into_store, push_now, transport_from_settings};
pub use status::{SyncReport, SyncStatus, SyncStatusBoard};
pub use transport::{RemoteEnvelope, SyncTransport, TransportError, TransportResult};
pub use worker::{SyncWorker, DEFAULT_DEBOUNCE};

use crate::repo::kv_store::RepoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("remote url is not configured")]
    MissingRemoteUrl,
    #[error("shared secret is not configured")]
    MissingSecret,
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Store(#[from] RepoError),
}
