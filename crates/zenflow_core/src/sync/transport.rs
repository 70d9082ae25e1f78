//! Transport contract and wire envelope for the spreadsheet endpoint.
//!
//! Push body: `{"action":"save","secret":"…","data":{members,classes,records,templates}}`.
//! Pull: `GET ?action=load&secret=…` answering
//! `{"status":"success","data":{…}}` or `{"status":"error","message":"…"}`.

use crate::model::snapshot::Snapshot;
use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type TransportResult<T> = Result<T, TransportError>;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid remote url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("remote returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("remote rejected request: {0}")]
    Remote(String),
    #[error("malformed response body: {0}")]
    MalformedBody(String),
}

/// Full-snapshot exchange with the remote store.
#[async_trait]
pub trait SyncTransport: Send + Sync {
    /// Uploads the whole snapshot.
    async fn push(&self, secret: &SecretString, snapshot: &Snapshot) -> TransportResult<()>;
    /// Downloads the authoritative snapshot.
    async fn pull(&self, secret: &SecretString) -> TransportResult<Snapshot>;
}

#[derive(Debug, Serialize)]
pub(crate) struct PushRequest<'a> {
    pub action: &'static str,
    pub secret: &'a str,
    pub data: &'a Snapshot,
}

/// Response envelope returned by the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RemoteEnvelope {
    Success {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<Snapshot>,
    },
    Error {
        #[serde(default)]
        message: String,
    },
}
